//! project configuration
//!
//! `gqlclientgen.yml` names the runtime crate, the naming options, and the
//! services to generate. relative paths resolve against the directory of
//! the file. header values may reference `${env.NAME}`.

use crate::error::{Error, Result};
use crate::naming::NamingOptions;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "gqlclientgen.yml";

const SUPPORTED_VERSION: u32 = 1;

/// whole configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub version: u32,
    /// crate path generated code uses for the runtime client
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,
    #[serde(default)]
    pub naming: NamingOptions,
    pub services: Vec<ServiceConfig>,
}

/// one service: where the schema comes from, where operations live, and
/// where the client goes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub name: String,
    /// rust name stem of the generated client
    pub package: String,
    #[serde(default)]
    pub url: Option<String>,
    /// introspection json file, instead of `url`
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// headers sent with the introspection request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub operations: DirConfig,
    pub client: DirConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirConfig {
    pub root: PathBuf,
}

/// where a service schema is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource<'a> {
    Url(&'a str),
    File(&'a Path),
}

fn default_runtime_crate() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

impl ProjectConfig {
    /// read, resolve, and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(config = %path.display(), "loading project configuration");
        Self::from_yaml(&text, base_dir)
    }

    /// parse configuration text; relative paths resolve against `base_dir`
    pub fn from_yaml(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: ProjectConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        for service in &mut config.services {
            service.resolve(base_dir)?;
        }
        Ok(config)
    }

    /// check version, service names, packages, and schema sources
    pub fn validate(&self) -> Result<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version {} (expected {SUPPORTED_VERSION})",
                self.version
            )));
        }
        if self.runtime_crate.trim().is_empty() {
            return Err(Error::Config("runtime_crate must not be empty".to_string()));
        }
        if self.services.is_empty() {
            return Err(Error::Config("no services configured".to_string()));
        }

        let mut names = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(Error::Config("service name must not be empty".to_string()));
            }
            if !names.insert(service.name.as_str()) {
                return Err(Error::Config(format!(
                    "service {} is configured twice",
                    service.name
                )));
            }
            if !is_identifier(&service.package) {
                return Err(Error::Config(format!(
                    "service {}: package {:?} is not a valid identifier",
                    service.name, service.package
                )));
            }
            service.schema_source()?;
        }
        Ok(())
    }

    /// services named in `names`, in configuration order; all when empty
    pub fn select(&self, names: &[String]) -> Result<Vec<&ServiceConfig>> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.services.iter().any(|service| &service.name == *name))
        {
            return Err(Error::Config(format!("unknown service {unknown}")));
        }
        Ok(self
            .services
            .iter()
            .filter(|service| names.is_empty() || names.contains(&service.name))
            .collect())
    }
}

impl ServiceConfig {
    /// exactly one of `url` and `schema`
    pub fn schema_source(&self) -> Result<SchemaSource<'_>> {
        match (&self.url, &self.schema) {
            (Some(url), None) => Ok(SchemaSource::Url(url)),
            (None, Some(path)) => Ok(SchemaSource::File(path)),
            (Some(_), Some(_)) => Err(Error::Config(format!(
                "service {}: set either url or schema, not both",
                self.name
            ))),
            (None, None) => Err(Error::Config(format!(
                "service {}: one of url or schema is required",
                self.name
            ))),
        }
    }

    fn resolve(&mut self, base_dir: &Path) -> Result<()> {
        if let Some(schema) = &mut self.schema {
            *schema = base_dir.join(&*schema);
        }
        self.operations.root = base_dir.join(&self.operations.root);
        self.client.root = base_dir.join(&self.client.root);
        for value in self.headers.values_mut() {
            *value = expand_env(value)
                .map_err(|err| Error::Config(format!("service {}: {err}", self.name)))?;
        }
        Ok(())
    }
}

/// expand `${env.NAME}` references
fn expand_env(value: &str) -> std::result::Result<String, String> {
    shellexpand::env_with_context(value, |key: &str| {
        let Some(name) = key.strip_prefix("env.") else {
            return Ok(None);
        };
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(format!("environment variable {name} is not set")),
        }
    })
    .map(|expanded| expanded.into_owned())
    .map_err(|err| err.cause)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name != "_" && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
