//! generate the `countries` fixture client into `OUT_DIR`

use gqlclientgen::service::{generate_service, read_schema};
use gqlclientgen::{CancelFlag, ProjectConfig};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let fixtures = manifest_dir.join("../tests/fixtures/countries");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let client_dir = out_dir.join("countries");
    println!("cargo:rerun-if-changed={}", fixtures.display());

    // json strings are valid yaml double-quoted scalars
    let config = format!(
        "version: 1
services:
  - name: countries
    package: countries
    schema: schema.json
    operations:
      root: operations
    client:
      root: {}
",
        serde_json::to_string(&client_dir.display().to_string())?
    );
    let project = ProjectConfig::from_yaml(&config, &fixtures)?;
    let service = &project.services[0];
    let schema_path = service
        .schema
        .as_deref()
        .ok_or("countries fixture has no schema file")?;
    let (schema, raw) = read_schema(schema_path)?;
    generate_service(&project, service, &schema, &raw, &CancelFlag::new())?;

    std::fs::write(
        out_dir.join("countries.rs"),
        format!(
            "#[path = {:?}]\npub mod countries;\n",
            client_dir.join("mod.rs").display().to_string()
        ),
    )?;
    Ok(())
}
