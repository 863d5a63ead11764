//! type generator
//!
//! maps schema types and resolved operations to rust declarations. one
//! generator covers one service: generated names live in a single scope,
//! so nested response structs get suffixes on collision while operation
//! request/response names must be unique.

use super::types::{Declaration, DeclarationKind, FieldDecl, Model, RustType, Variant};
use crate::document::{FieldSelection, OperationDoc, Selection, SelectionSet};
use crate::error::{Error, Result};
use crate::naming::{NameSet, NamingOptions};
use crate::operation::OperationKind;
use crate::schema::{EnumValue, FieldDef, InputValue, Schema, TypeDef, TypeKind, TypeRef};
use std::collections::HashMap;

/// fallback for types without a generated declaration
const OPAQUE_TYPE: &str = "serde_json::Value";

/// inherent methods of the generated client
const CLIENT_METHODS: [&str; 3] = ["new", "from_client", "inner"];

/// declarations generated for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTypes {
    /// graphql operation name
    pub name: String,
    pub kind: OperationKind,
    /// `<Name>Operation`, the `Operation` impl in `client.rs`
    pub operation: String,
    /// snake_case client method
    pub method: String,
    /// `<Name>Request`
    pub request: Declaration,
    /// `<Name>Response`
    pub response: Declaration,
    /// scoped structs for sub-selections, parents before children
    pub nested: Vec<Declaration>,
}

impl OperationTypes {
    /// request, response, then nested structs
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        [&self.request, &self.response]
            .into_iter()
            .chain(self.nested.iter())
    }

    /// nested struct by name
    pub fn nested(&self, name: &str) -> Option<&Declaration> {
        self.nested.iter().find(|decl| decl.name == name)
    }
}

/// generated name scope of one service
#[derive(Debug)]
pub struct TypeGenerator<'a> {
    schema: &'a Schema,
    naming: NamingOptions,
    names: NameSet,
    methods: NameSet,
    /// schema type name -> rust name
    idents: HashMap<String, String>,
}

impl<'a> TypeGenerator<'a> {
    /// claim rust names for every user type, sorted by graphql name, and
    /// for the `<Package>Client` struct
    pub fn new(package: &str, schema: &'a Schema, naming: NamingOptions) -> Self {
        let mut names = NameSet::new();
        names.claim(&client_name(package, &naming));

        let mut idents = HashMap::new();
        for ty in schema.user_types() {
            let ident = names.unique(&naming.type_ident(&ty.name));
            idents.insert(ty.name.clone(), ident);
        }

        let mut methods = NameSet::new();
        for method in CLIENT_METHODS {
            methods.claim(method);
        }

        Self {
            schema,
            naming,
            names,
            methods,
            idents,
        }
    }

    /// rust name of a user type
    pub fn type_name(&self, graphql_name: &str) -> Option<&str> {
        self.idents.get(graphql_name).map(String::as_str)
    }

    /// one declaration per user type, sorted by graphql name
    pub fn schema_types(&self) -> Result<Vec<Declaration>> {
        self.schema
            .user_types()
            .into_iter()
            .map(|ty| self.schema_type(ty))
            .collect()
    }

    fn schema_type(&self, ty: &TypeDef) -> Result<Declaration> {
        let name = self
            .type_name(&ty.name)
            .map(str::to_string)
            .unwrap_or_else(|| self.naming.type_ident(&ty.name));

        let kind = match &ty.kind {
            TypeKind::Scalar => DeclarationKind::Alias(RustType::named("String")),
            TypeKind::Enum => DeclarationKind::Enum(self.variants(&ty.enum_values)),
            TypeKind::Object | TypeKind::Interface => {
                DeclarationKind::Struct(self.schema_fields(&ty.fields))
            }
            TypeKind::InputObject => DeclarationKind::Struct(self.input_fields(&ty.input_fields)),
            // members are not modelled
            TypeKind::Union => DeclarationKind::Struct(Vec::new()),
            TypeKind::List | TypeKind::NonNull | TypeKind::Unknown(_) => {
                return Err(Error::UnknownTypeKind {
                    name: ty.name.clone(),
                    kind: ty.kind.as_str().to_string(),
                });
            }
        };

        Ok(Declaration {
            name,
            doc: ty.description.clone(),
            kind,
        })
    }

    fn variants(&self, values: &[EnumValue]) -> Vec<Variant> {
        let mut scope = NameSet::new();
        values
            .iter()
            .map(|value| Variant {
                ident: scope.unique(&self.naming.type_ident(&value.name)),
                value: value.name.clone(),
                doc: with_deprecation(
                    value.description.as_deref(),
                    value.is_deprecated,
                    value.deprecation_reason.as_deref(),
                ),
            })
            .collect()
    }

    fn schema_fields(&self, fields: &[FieldDef]) -> Vec<FieldDecl> {
        let mut scope = NameSet::new();
        fields
            .iter()
            .map(|field| FieldDecl {
                ident: scope.unique(&self.naming.field_ident(&field.name)),
                key: field.name.clone(),
                ty: self.schema_field_type(&field.ty),
                doc: with_deprecation(
                    field.description.as_deref(),
                    field.is_deprecated,
                    field.deprecation_reason.as_deref(),
                ),
            })
            .collect()
    }

    fn input_fields(&self, fields: &[InputValue]) -> Vec<FieldDecl> {
        let mut scope = NameSet::new();
        fields
            .iter()
            .map(|field| FieldDecl {
                ident: scope.unique(&self.naming.field_ident(&field.name)),
                key: field.name.clone(),
                ty: self.schema_field_type(&field.ty),
                doc: field.description.clone(),
            })
            .collect()
    }

    /// composite types outside a list are boxed so recursive schemas stay finite
    fn schema_field_type(&self, ty: &TypeRef) -> RustType {
        let base = ty.base_name();
        let boxed = self.schema.get(base).is_some_and(|def| {
            def.kind.is_composite() || def.kind == TypeKind::InputObject
        }) && self.idents.contains_key(base);
        shape(ty, self.named_type(base), boxed)
    }

    /// rust type of a named graphql type
    fn named_type(&self, name: &str) -> RustType {
        match name {
            "String" | "ID" => RustType::named("String"),
            "Int" => RustType::named("i64"),
            "Float" => RustType::named("f64"),
            "Boolean" => RustType::named("bool"),
            _ => match self.idents.get(name) {
                Some(ident) => RustType::named(ident.clone()),
                None => RustType::named(OPAQUE_TYPE),
            },
        }
    }

    /// request, response, and nested declarations for one operation.
    ///
    /// fails without claiming any name when the operation selects through
    /// a fragment or reuses a response key for two fields at any depth.
    pub fn operation_types(&mut self, op: &OperationDoc) -> Result<OperationTypes> {
        reject_fragments(&op.name, &op.selection_set)?;
        check_response_keys(&op.name, &op.selection_set)?;

        let base = self.naming.type_ident(&op.name);
        let operation = format!("{base}Operation");
        let request = format!("{base}Request");
        let response = format!("{base}Response");
        for name in [&operation, &request, &response] {
            if self.names.contains(name) {
                return Err(Error::NameCollision(name.clone()));
            }
        }
        let method = self.naming.field_ident(&op.name);
        if self.methods.contains(&method) {
            return Err(Error::NameCollision(method));
        }
        for name in [&operation, &request, &response] {
            self.names.claim(name);
        }
        self.methods.claim(&method);

        let request = self.request(request, op);
        let mut nested = Vec::new();
        let response = self.selection_struct(&op.name, response, &op.selection_set, &mut nested)?;

        tracing::debug!(
            operation = %op.name,
            nested = nested.len(),
            "generated operation types"
        );
        Ok(OperationTypes {
            name: op.name.clone(),
            kind: op.kind,
            operation,
            method,
            request,
            response,
            nested,
        })
    }

    fn request(&self, name: String, op: &OperationDoc) -> Declaration {
        let mut scope = NameSet::new();
        let fields = op
            .variables
            .iter()
            .map(|var| FieldDecl {
                ident: scope.unique(&self.naming.field_ident(&var.name)),
                key: var.name.clone(),
                ty: shape(&var.ty, self.named_type(var.ty.base_name()), false),
                doc: None,
            })
            .collect();
        Declaration {
            name,
            doc: Some(format!("variables of `{} {}`", op.kind, op.name)),
            kind: DeclarationKind::Struct(fields),
        }
    }

    fn selection_struct(
        &mut self,
        operation: &str,
        name: String,
        set: &SelectionSet,
        nested: &mut Vec<Declaration>,
    ) -> Result<Declaration> {
        let mut scope = NameSet::new();
        let mut fields = Vec::new();
        for selection in merge_fields(operation, set)? {
            let key = selection.response_key().to_string();
            let ty = &selection.definition.ty;
            let rust_type = if selection.selection_set.is_empty() {
                shape(ty, self.named_type(ty.base_name()), false)
            } else {
                let child = self
                    .names
                    .unique(&format!("{name}{}", self.naming.type_ident(&key)));
                // reserve the child's slot so parents precede children
                let slot = nested.len();
                nested.push(Declaration {
                    name: child.clone(),
                    doc: None,
                    kind: DeclarationKind::Struct(Vec::new()),
                });
                let decl =
                    self.selection_struct(operation, child.clone(), &selection.selection_set, nested)?;
                nested[slot] = decl;
                shape(ty, RustType::named(child), false)
            };

            fields.push(FieldDecl {
                ident: scope.unique(&self.naming.field_ident(&key)),
                key,
                ty: rust_type,
                doc: selection.definition.description.clone(),
            });
        }

        Ok(Declaration {
            name,
            doc: None,
            kind: DeclarationKind::Struct(fields),
        })
    }
}

/// `<Package>Client`
pub fn client_name(package: &str, naming: &NamingOptions) -> String {
    format!("{}Client", naming.type_ident(package))
}

/// schema-derived declarations of one service
pub fn generate_schema_types(
    package: &str,
    schema: &Schema,
    naming: NamingOptions,
) -> Result<Model> {
    let generator = TypeGenerator::new(package, schema, naming);
    Ok(Model {
        package: package.to_string(),
        declarations: generator.schema_types()?,
    })
}

/// operation-derived declarations of a single operation
pub fn generate_operation_types(
    package: &str,
    schema: &Schema,
    op: &OperationDoc,
    naming: NamingOptions,
) -> Result<OperationTypes> {
    TypeGenerator::new(package, schema, naming).operation_types(op)
}

/// wrap `base` in the list and nullability shape of `ty`
fn shape(ty: &TypeRef, base: RustType, boxed: bool) -> RustType {
    match ty {
        TypeRef::NonNull(inner) => required_shape(inner, base, boxed),
        other => RustType::Option(Box::new(required_shape(other, base, boxed))),
    }
}

fn required_shape(ty: &TypeRef, base: RustType, boxed: bool) -> RustType {
    match ty {
        TypeRef::Named(_) if boxed => RustType::Boxed(Box::new(base)),
        TypeRef::Named(_) => base,
        TypeRef::List(inner) => RustType::Vec(Box::new(shape(inner, base, false))),
        TypeRef::NonNull(inner) => required_shape(inner, base, boxed),
    }
}

fn with_deprecation(
    description: Option<&str>,
    is_deprecated: bool,
    reason: Option<&str>,
) -> Option<String> {
    if !is_deprecated {
        return description.map(str::to_string);
    }
    let note = match reason {
        Some(reason) if !reason.is_empty() => format!("deprecated: {reason}"),
        _ => "deprecated".to_string(),
    };
    Some(match description {
        Some(description) => format!("{description}\n\n{note}"),
        None => note,
    })
}

fn reject_fragments(operation: &str, set: &SelectionSet) -> Result<()> {
    for selection in &set.items {
        match selection {
            Selection::Field(field) => reject_fragments(operation, &field.selection_set)?,
            Selection::InlineFragment(fragment) => {
                let construct = match &fragment.type_condition {
                    Some(condition) => format!("inline fragment on {condition}"),
                    None => "inline fragment".to_string(),
                };
                return Err(Error::UnsupportedSelection {
                    operation: operation.to_string(),
                    construct,
                });
            }
            Selection::FragmentSpread(spread) => {
                return Err(Error::UnsupportedSelection {
                    operation: operation.to_string(),
                    construct: format!("fragment spread ...{}", spread.fragment_name),
                });
            }
        }
    }
    Ok(())
}

fn check_response_keys(operation: &str, set: &SelectionSet) -> Result<()> {
    for field in merge_fields(operation, set)? {
        check_response_keys(operation, &field.selection_set)?;
    }
    Ok(())
}

/// fields of one level keyed by response key, repeats merged in first-seen order
fn merge_fields(operation: &str, set: &SelectionSet) -> Result<Vec<FieldSelection>> {
    let mut merged: Vec<FieldSelection> = Vec::new();
    for selection in &set.items {
        let Selection::Field(field) = selection else {
            continue;
        };
        let key = field.response_key();
        match merged.iter_mut().find(|seen| seen.response_key() == key) {
            Some(seen) if seen.name != field.name => {
                return Err(Error::UnsupportedSelection {
                    operation: operation.to_string(),
                    construct: format!(
                        "response key {key} selects both {} and {}",
                        seen.name, field.name
                    ),
                });
            }
            Some(seen) => seen
                .selection_set
                .items
                .extend(field.selection_set.items.iter().cloned()),
            None => merged.push(field.clone()),
        }
    }
    Ok(merged)
}
