//! client renderer
//!
//! emits `client.rs` (one `Operation` impl per operation and the typed
//! `<Package>Client`) and the `mod.rs` glue of a service.

use super::generator::{client_name, OperationTypes};
use crate::document::OperationDoc;
use crate::naming::NamingOptions;
use crate::operation::OperationKind;

/// one generated client method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMethod {
    /// snake_case method name
    pub name: String,
    /// graphql operation name
    pub operation_name: String,
    pub kind: OperationKind,
    /// `<Name>Operation`
    pub operation: String,
    pub request: String,
    pub response: String,
    /// literal document text
    pub query: String,
}

impl ClientMethod {
    pub fn new(op: &OperationDoc, types: &OperationTypes) -> Self {
        Self {
            name: types.method.clone(),
            operation_name: op.name.clone(),
            kind: op.kind,
            operation: types.operation.clone(),
            request: types.request.name.clone(),
            response: types.response.name.clone(),
            query: op.source.clone(),
        }
    }
}

/// text of `client.rs`
pub fn render_client(
    package: &str,
    runtime_crate: &str,
    naming: &NamingOptions,
    methods: &[ClientMethod],
) -> String {
    let rt = runtime_crate;
    let client = client_name(package, naming);

    let mut out = String::new();
    out.push_str(&format!(
        "//! generated client for the `{package}` service. do not edit.\n\n"
    ));
    out.push_str("#![allow(clippy::all)]\n\n");
    out.push_str("#[allow(unused_imports)]\n");
    out.push_str("use super::model::*;\n");

    for method in methods {
        out.push('\n');
        out.push_str(&format!(
            "/// `{} {}`\n",
            method.kind, method.operation_name
        ));
        out.push_str(&format!("pub struct {};\n\n", method.operation));
        out.push_str(&format!("impl {rt}::Operation for {} {{\n", method.operation));
        out.push_str(&format!(
            "    const NAME: &'static str = {:?};\n",
            method.operation_name
        ));
        out.push_str(&format!(
            "    const KIND: {rt}::OperationKind = {rt}::OperationKind::{:?};\n",
            method.kind
        ));
        out.push_str(&format!(
            "    const QUERY: &'static str = {};\n",
            raw_string(&method.query)
        ));
        out.push_str(&format!("    type Variables = {};\n", method.request));
        out.push_str(&format!("    type Response = {};\n", method.response));
        out.push_str("}\n");
    }

    out.push('\n');
    out.push_str(&format!("/// typed client for the `{package}` service\n"));
    out.push_str("#[derive(Debug, Clone)]\n");
    out.push_str(&format!("pub struct {client} {{\n"));
    out.push_str(&format!("    client: {rt}::Client,\n"));
    out.push_str("}\n\n");

    out.push_str(&format!("impl {client} {{\n"));
    out.push_str("    /// create a client for the configured endpoint\n");
    out.push_str(&format!(
        "    pub fn new(config: {rt}::ClientConfig) -> {rt}::Result<Self> {{\n"
    ));
    out.push_str(&format!(
        "        Ok(Self {{ client: {rt}::Client::new(config)? }})\n"
    ));
    out.push_str("    }\n\n");
    out.push_str("    /// wrap an existing runtime client\n");
    out.push_str(&format!(
        "    pub fn from_client(client: {rt}::Client) -> Self {{\n"
    ));
    out.push_str("        Self { client }\n");
    out.push_str("    }\n\n");
    out.push_str("    /// the runtime client, for raw queries\n");
    out.push_str(&format!("    pub fn inner(&self) -> &{rt}::Client {{\n"));
    out.push_str("        &self.client\n");
    out.push_str("    }\n");

    for method in methods {
        out.push('\n');
        out.push_str(&format!(
            "    /// run `{} {}`\n",
            method.kind, method.operation_name
        ));
        out.push_str(&format!(
            "    pub async fn {}(&self, request: &{}) -> {rt}::Result<{}> {{\n",
            method.name, method.request, method.response
        ));
        out.push_str(&format!(
            "        self.client.execute_operation::<{}>(request).await\n",
            method.operation
        ));
        out.push_str("    }\n");
    }
    out.push_str("}\n");

    out
}

/// text of `mod.rs`
pub fn render_module(package: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "//! generated `{package}` client. do not edit.\n\n"
    ));
    out.push_str("mod client;\n");
    out.push_str("mod model;\n\n");
    out.push_str("pub use client::*;\n");
    out.push_str("pub use model::*;\n");
    out
}

/// raw string literal with enough `#`s to hold `text`
fn raw_string(text: &str) -> String {
    let mut hashes = 1;
    let mut run = None;
    for ch in text.chars() {
        run = match (ch, run) {
            ('"', _) => Some(0),
            ('#', Some(count)) => Some(count + 1),
            _ => None,
        };
        if let Some(count) = run {
            hashes = hashes.max(count + 1);
        }
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}
