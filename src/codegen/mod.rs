//! rust code generation
//!
//! [`TypeGenerator`] turns the schema and resolved operations into
//! declarations; [`Model::render`], [`render_client`] and [`render_module`]
//! turn those into the text of `model.rs`, `client.rs`, and `mod.rs`.

mod client;
mod generator;
mod types;

pub use client::{render_client, render_module, ClientMethod};
pub use generator::{
    client_name, generate_operation_types, generate_schema_types, OperationTypes, TypeGenerator,
};
pub use types::{Declaration, DeclarationKind, FieldDecl, Model, RustType, Variant};
