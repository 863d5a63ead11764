//! declaration model for generated rust code
//!
//! the type generator builds these; [`Model::render`] turns them into the
//! text of `model.rs`.

use std::fmt;

/// rust type expression of a generated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// primitive or generated type name
    Named(String),
    Option(Box<RustType>),
    Vec(Box<RustType>),
    Boxed(Box<RustType>),
}

impl RustType {
    pub fn named(name: impl Into<String>) -> Self {
        RustType::Named(name.into())
    }

    /// nullable position: rendered with `serde(default, skip_serializing_if)`
    pub fn is_option(&self) -> bool {
        matches!(self, RustType::Option(_))
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::Named(name) => f.write_str(name),
            RustType::Option(inner) => write!(f, "Option<{inner}>"),
            RustType::Vec(inner) => write!(f, "Vec<{inner}>"),
            RustType::Boxed(inner) => write!(f, "Box<{inner}>"),
        }
    }
}

/// struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// rust identifier
    pub ident: String,
    /// serialization key
    pub key: String,
    pub ty: RustType,
    pub doc: Option<String>,
}

/// enum variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub ident: String,
    /// literal graphql value
    pub value: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `pub type Name = T;`
    Alias(RustType),
    Enum(Vec<Variant>),
    Struct(Vec<FieldDecl>),
}

/// one top-level item of `model.rs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub doc: Option<String>,
    pub kind: DeclarationKind,
}

impl Declaration {
    /// fields of a struct declaration; empty for other kinds
    pub fn fields(&self) -> &[FieldDecl] {
        match &self.kind {
            DeclarationKind::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// field by rust identifier
    pub fn field(&self, ident: &str) -> Option<&FieldDecl> {
        self.fields().iter().find(|field| field.ident == ident)
    }

    fn render(&self, out: &mut String) {
        doc_comment(out, self.doc.as_deref(), "");
        match &self.kind {
            DeclarationKind::Alias(ty) => {
                out.push_str(&format!("pub type {} = {ty};\n", self.name));
            }
            DeclarationKind::Enum(variants) => {
                out.push_str(
                    "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n",
                );
                out.push_str(&format!("pub enum {} {{\n", self.name));
                for variant in variants {
                    doc_comment(out, variant.doc.as_deref(), "    ");
                    out.push_str(&format!("    #[serde(rename = {:?})]\n", variant.value));
                    out.push_str(&format!("    {},\n", variant.ident));
                }
                out.push_str("}\n\n");

                out.push_str(&format!("impl {} {{\n", self.name));
                out.push_str("    /// graphql name of the value\n");
                out.push_str("    pub fn as_str(&self) -> &'static str {\n");
                out.push_str("        match *self {\n");
                for variant in variants {
                    out.push_str(&format!(
                        "            {}::{} => {:?},\n",
                        self.name, variant.ident, variant.value
                    ));
                }
                out.push_str("        }\n");
                out.push_str("    }\n");
                out.push_str("}\n");
            }
            DeclarationKind::Struct(fields) => {
                out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
                if fields.is_empty() {
                    out.push_str(&format!("pub struct {} {{}}\n", self.name));
                    return;
                }
                out.push_str(&format!("pub struct {} {{\n", self.name));
                for field in fields {
                    doc_comment(out, field.doc.as_deref(), "    ");
                    if field.ident.strip_prefix("r#").unwrap_or(&field.ident) != field.key {
                        out.push_str(&format!("    #[serde(rename = {:?})]\n", field.key));
                    }
                    if field.ty.is_option() {
                        out.push_str(
                            "    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n",
                        );
                    }
                    out.push_str(&format!("    pub {}: {},\n", field.ident, field.ty));
                }
                out.push_str("}\n");
            }
        }
    }
}

/// every declaration generated for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub package: String,
    pub declarations: Vec<Declaration>,
}

impl Model {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            declarations: Vec::new(),
        }
    }

    /// declaration by rust name
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.name == name)
    }

    /// text of `model.rs`
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "//! generated types for the `{}` service. do not edit.\n\n",
            self.package
        ));
        out.push_str("#![allow(clippy::all)]\n\n");
        out.push_str("use serde::{Deserialize, Serialize};\n");
        for decl in &self.declarations {
            out.push('\n');
            decl.render(&mut out);
        }
        out
    }
}

/// render a description as `///` lines
pub(crate) fn doc_comment(out: &mut String, doc: Option<&str>, indent: &str) {
    let Some(doc) = doc else {
        return;
    };
    for line in doc.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{indent}///\n"));
        } else {
            out.push_str(&format!("{indent}/// {line}\n"));
        }
    }
}
