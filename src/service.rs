//! service pipeline
//!
//! one service at a time: load the schema, render and check its sdl, parse
//! the operation files, generate, then write the client directory. every
//! file is generated in memory before the first write.

use crate::client::Client;
use crate::codegen::{render_client, render_module, ClientMethod, Model, TypeGenerator};
use crate::config::ClientConfig;
use crate::document::{parse_operations, OperationDoc};
use crate::error::{Error, Result};
use crate::project::{ProjectConfig, SchemaSource, ServiceConfig};
use crate::schema::Schema;
use crate::sdl;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::WalkDir;

/// original introspection result
pub const INTROSPECTION_FILE: &str = "schema.introspect.json";
pub const SDL_FILE: &str = "schema.graphql";
pub const MODEL_FILE: &str = "model.rs";
pub const CLIENT_FILE: &str = "client.rs";
pub const MODULE_FILE: &str = "mod.rs";

/// extension of operation documents
const OPERATION_EXTENSION: &str = "graphql";

/// cooperative cancellation, checked before each pipeline step
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Error::Cancelled)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// what one service run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOutput {
    pub service: String,
    pub operations: usize,
    pub declarations: usize,
    /// written files, in write order
    pub files: Vec<PathBuf>,
}

/// outcome of a multi-service run
#[derive(Debug, Default)]
pub struct RunReport {
    pub succeeded: Vec<ServiceOutput>,
    pub failed: Vec<(String, Error)>,
}

impl RunReport {
    /// true when every selected service was generated
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// run the selected services in order.
///
/// a failing service is logged and the run moves on to the next one;
/// cancellation stops the run.
pub async fn run_services(
    project: &ProjectConfig,
    services: &[&ServiceConfig],
    cancel: &CancelFlag,
) -> RunReport {
    let mut report = RunReport::default();
    for service in services {
        match run_service(project, service, cancel).await {
            Ok(output) => {
                tracing::info!(
                    service = %output.service,
                    operations = output.operations,
                    declarations = output.declarations,
                    "service generated"
                );
                report.succeeded.push(output);
            }
            Err(Error::Cancelled) => {
                tracing::warn!(service = %service.name, "run cancelled");
                report.failed.push((service.name.clone(), Error::Cancelled));
                break;
            }
            Err(err) => {
                tracing::error!(service = %service.name, error = %err, "service failed");
                report.failed.push((service.name.clone(), err));
            }
        }
    }
    report
}

/// load the schema of one service, then generate it
pub async fn run_service(
    project: &ProjectConfig,
    service: &ServiceConfig,
    cancel: &CancelFlag,
) -> Result<ServiceOutput> {
    cancel.check()?;
    let (schema, raw) = load_schema(service).await?;
    generate_service(project, service, &schema, &raw, cancel)
}

/// fetch the schema from the service url, or read it from the schema file
pub async fn load_schema(service: &ServiceConfig) -> Result<(Schema, serde_json::Value)> {
    match service.schema_source()? {
        SchemaSource::Url(url) => {
            tracing::info!(service = %service.name, %url, "fetching schema");
            let config = ClientConfig::new(url).with_raw_headers(&service.headers)?;
            let fetched = Client::new(config)?.introspect().await;
            if let Err(err) = &fetched {
                if err.is_auth_error() {
                    tracing::warn!(
                        service = %service.name,
                        "schema endpoint rejected the request, check the service headers"
                    );
                }
            }
            fetched
        }
        SchemaSource::File(path) => {
            tracing::info!(service = %service.name, path = %path.display(), "reading schema");
            read_schema(path)
        }
    }
}

/// decode an introspection result file, with or without the `data` envelope
pub fn read_schema(path: &Path) -> Result<(Schema, serde_json::Value)> {
    let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let raw: serde_json::Value = serde_json::from_str(&text)?;
    let schema = Schema::from_introspection(&raw)?;
    Ok((schema, raw))
}

/// validate, parse, generate, and write one service from a loaded schema
pub fn generate_service(
    project: &ProjectConfig,
    service: &ServiceConfig,
    schema: &Schema,
    raw: &serde_json::Value,
    cancel: &CancelFlag,
) -> Result<ServiceOutput> {
    cancel.check()?;
    schema.validate()?;
    let sdl = sdl::render(schema)?;
    sdl::check(&sdl)?;
    tracing::info!(service = %service.name, types = schema.user_types().len(), "schema loaded");

    cancel.check()?;
    let operations = load_operations(schema, &service.operations.root)?;
    tracing::info!(
        service = %service.name,
        operations = operations.len(),
        "operations parsed"
    );

    cancel.check()?;
    let mut generator = TypeGenerator::new(&service.package, schema, project.naming);
    let mut model = Model::new(service.package.clone());
    model.declarations = generator.schema_types()?;
    let mut methods = Vec::with_capacity(operations.len());
    for op in &operations {
        let types = generator.operation_types(op)?;
        model.declarations.extend(types.declarations().cloned());
        methods.push(ClientMethod::new(op, &types));
    }

    let mut introspection = serde_json::to_string_pretty(raw)?;
    introspection.push('\n');
    let outputs = [
        (INTROSPECTION_FILE, introspection),
        (SDL_FILE, sdl),
        (MODEL_FILE, model.render()),
        (
            CLIENT_FILE,
            render_client(
                &service.package,
                &project.runtime_crate,
                &project.naming,
                &methods,
            ),
        ),
        (MODULE_FILE, render_module(&service.package)),
    ];

    cancel.check()?;
    let root = &service.client.root;
    std::fs::create_dir_all(root).map_err(|err| Error::io(root, err))?;
    let mut files = Vec::with_capacity(outputs.len());
    for (name, contents) in outputs {
        let path = root.join(name);
        std::fs::write(&path, contents).map_err(|err| Error::io(&path, err))?;
        tracing::debug!(path = %path.display(), "wrote file");
        files.push(path);
    }

    Ok(ServiceOutput {
        service: service.name.clone(),
        operations: operations.len(),
        declarations: model.declarations.len(),
        files,
    })
}

/// every operation under `root`, files sorted by path, then document order
pub fn load_operations(schema: &Schema, root: &Path) -> Result<Vec<OperationDoc>> {
    let mut operations = Vec::new();
    for path in discover_operation_files(root)? {
        let source = std::fs::read_to_string(&path).map_err(|err| Error::io(&path, err))?;
        operations.extend(parse_operations(schema, &path, &source)?);
    }
    Ok(operations)
}

/// `.graphql` files below `root`, sorted by path
pub fn discover_operation_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|err| Error::io(root, err.into()))?;
        let is_operation = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == OPERATION_EXTENSION);
        if is_operation {
            files.push(entry.into_path());
        }
    }
    // whole-path string order: `a.graphql` before `a/z.graphql`
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    tracing::debug!(root = %root.display(), files = files.len(), "discovered operation files");
    Ok(files)
}
