//! graphql client generator
//!
//! reads a graphql schema (introspection json, fetched or from a file) and
//! a directory of `.graphql` operation documents, and writes a typed rust
//! client per service: serde model types, one async method per operation,
//! the schema as sdl, and the raw introspection result. generated code
//! depends on this crate at runtime through [`Client`] and [`Operation`].
//!
//! ## generating
//!
//! describe services in `gqlclientgen.yml` and run the `gqlclientgen`
//! binary, or drive the pipeline from code:
//!
//! ```no_run
//! use gqlclientgen::{run_services, CancelFlag, ProjectConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let project = ProjectConfig::load("gqlclientgen.yml")?;
//! let services = project.select(&[])?;
//! let report = run_services(&project, &services, &CancelFlag::new()).await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## runtime
//!
//! ```no_run
//! use gqlclientgen::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("https://countries.trevorblades.com/graphql"))?;
//! let response = client
//!     .execute::<_, serde_json::Value>("query Q { countries { code } }", Some("Q"), &serde_json::json!({}))
//!     .await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod codegen;
mod config;
pub mod document;
mod error;
mod graphql;
pub mod naming;
mod operation;
pub mod project;
pub mod schema;
pub mod sdl;
pub mod service;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlRequest, GraphQlResponse};
pub use naming::NamingOptions;
pub use operation::{Operation, OperationKind};
pub use project::{ProjectConfig, ServiceConfig};
pub use schema::Schema;
pub use service::{run_services, CancelFlag, RunReport, ServiceOutput};
