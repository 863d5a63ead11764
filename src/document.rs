//! operation documents
//!
//! parses `.graphql` operation files with `graphql-parser` and resolves every
//! selected field against the schema model. the result is the read-only
//! input of the type generator. validation goes as far as type resolution
//! needs and no further.

use crate::error::{Error, Result};
use crate::operation::OperationKind;
use crate::schema::{is_builtin_scalar, FieldDef, Schema, TypeDef, TypeKind, TypeRef};
use graphql_parser::query::{self, Definition, OperationDefinition, TypeCondition};
use graphql_parser::Pos;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// one named operation, resolved against the schema
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDoc {
    pub name: String,
    pub kind: OperationKind,
    pub variables: Vec<VariableDef>,
    pub selection_set: SelectionSet,
    /// full text of the document the operation was read from
    pub source: String,
    /// file the document was read from
    pub path: PathBuf,
}

/// `$name: Type = default`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
}

/// selections at one level of an operation, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    InlineFragment(InlineFragment),
    FragmentSpread(FragmentSpread),
}

/// selected field with its schema definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub alias: Option<String>,
    pub name: String,
    pub definition: FieldDef,
    pub selection_set: SelectionSet,
}

impl FieldSelection {
    /// key of the field in the response: alias, else name
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// `... on Type { .. }`; contents are not resolved
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
}

/// `...FragmentName`
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSpread {
    pub fragment_name: String,
}

/// parse every operation of one document and resolve it against `schema`.
///
/// fragment definitions are skipped; anonymous operations are rejected
/// because generated type names derive from the operation name.
pub fn parse_operations(schema: &Schema, path: &Path, source: &str) -> Result<Vec<OperationDoc>> {
    let document = query::parse_query::<String>(source)
        .map_err(|err| Error::parse(path, err.to_string().trim_end().to_string()))?;
    let resolver = Resolver { schema, path };

    let mut names = HashSet::new();
    let mut operations = Vec::new();
    for definition in &document.definitions {
        let operation = match definition {
            Definition::Fragment(_) => continue,
            Definition::Operation(operation) => operation,
        };
        let (name, kind, variables, selection_set, position) = match operation {
            OperationDefinition::SelectionSet(set) => {
                return Err(Error::parse(
                    path,
                    format!("{}: anonymous operations are not supported", set.span.0),
                ));
            }
            OperationDefinition::Query(op) => (
                &op.name,
                OperationKind::Query,
                &op.variable_definitions,
                &op.selection_set,
                op.position,
            ),
            OperationDefinition::Mutation(op) => (
                &op.name,
                OperationKind::Mutation,
                &op.variable_definitions,
                &op.selection_set,
                op.position,
            ),
            OperationDefinition::Subscription(op) => (
                &op.name,
                OperationKind::Subscription,
                &op.variable_definitions,
                &op.selection_set,
                op.position,
            ),
        };

        let name = name.clone().ok_or_else(|| {
            Error::parse(path, format!("{position}: {kind} has no name"))
        })?;
        if !names.insert(name.clone()) {
            return Err(Error::parse(
                path,
                format!("{position}: operation {name} is defined twice"),
            ));
        }

        let root = resolver.root(kind, position)?;
        let variables = variables
            .iter()
            .map(|var| resolver.variable(var))
            .collect::<Result<Vec<_>>>()?;
        let selection_set = resolver.selection_set(root, selection_set)?;

        tracing::debug!(operation = %name, %kind, path = %path.display(), "resolved operation");
        operations.push(OperationDoc {
            name,
            kind,
            variables,
            selection_set,
            source: source.to_string(),
            path: path.to_path_buf(),
        });
    }

    if operations.is_empty() {
        return Err(Error::parse(path, "document defines no operations"));
    }

    Ok(operations)
}

struct Resolver<'a> {
    schema: &'a Schema,
    path: &'a Path,
}

impl<'a> Resolver<'a> {
    fn error(&self, position: Pos, message: impl std::fmt::Display) -> Error {
        Error::parse(self.path, format!("{position}: {message}"))
    }

    fn root(&self, kind: OperationKind, position: Pos) -> Result<&'a TypeDef> {
        self.schema
            .root_type(kind)
            .and_then(|name| self.schema.get(name))
            .ok_or_else(|| self.error(position, format!("schema does not support {kind} operations")))
    }

    fn variable(&self, var: &query::VariableDefinition<'_, String>) -> Result<VariableDef> {
        let ty = type_ref(&var.var_type);
        let base = ty.base_name();
        let is_input = is_builtin_scalar(base)
            || self.schema.get(base).is_some_and(|def| {
                matches!(
                    def.kind,
                    TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject
                )
            });
        if !is_input {
            return Err(self.error(
                var.position,
                format!("variable ${} has unknown or non-input type {base}", var.name),
            ));
        }

        Ok(VariableDef {
            name: var.name.clone(),
            ty,
            default_value: var.default_value.as_ref().map(literal),
        })
    }

    fn selection_set(
        &self,
        parent: &TypeDef,
        set: &query::SelectionSet<'_, String>,
    ) -> Result<SelectionSet> {
        let mut items = Vec::with_capacity(set.items.len());
        for item in &set.items {
            let selection = match item {
                query::Selection::Field(field) => Selection::Field(self.field(parent, field)?),
                query::Selection::InlineFragment(fragment) => {
                    Selection::InlineFragment(InlineFragment {
                        type_condition: fragment.type_condition.as_ref().map(|condition| {
                            match condition {
                                TypeCondition::On(name) => name.clone(),
                            }
                        }),
                    })
                }
                query::Selection::FragmentSpread(spread) => {
                    Selection::FragmentSpread(FragmentSpread {
                        fragment_name: spread.fragment_name.clone(),
                    })
                }
            };
            items.push(selection);
        }
        Ok(SelectionSet { items })
    }

    fn field(&self, parent: &TypeDef, field: &query::Field<'_, String>) -> Result<FieldSelection> {
        let definition = parent.field(&field.name).ok_or_else(|| {
            self.error(
                field.position,
                format!("unknown field `{}` on type `{}`", field.name, parent.name),
            )
        })?;

        let target_name = definition.ty.base_name();
        let target = self
            .schema
            .get(target_name)
            .filter(|target| target.kind.is_composite());

        let selection_set = match (target, field.selection_set.items.is_empty()) {
            (Some(target), false) => self.selection_set(target, &field.selection_set)?,
            (None, true) => SelectionSet::default(),
            (Some(_), true) => {
                return Err(self.error(
                    field.position,
                    format!(
                        "field `{}` of type `{target_name}` needs a selection set",
                        field.name
                    ),
                ));
            }
            (None, false) => {
                return Err(self.error(
                    field.position,
                    format!(
                        "field `{}` of type `{target_name}` has no fields to select",
                        field.name
                    ),
                ));
            }
        };

        Ok(FieldSelection {
            alias: field.alias.clone(),
            name: field.name.clone(),
            definition,
            selection_set,
        })
    }
}

/// graphql literal text of a default value
fn literal(value: &query::Value<'_, String>) -> String {
    match value {
        query::Value::Variable(name) => format!("${name}"),
        query::Value::Int(number) => number
            .as_i64()
            .map(|number| number.to_string())
            .unwrap_or_default(),
        query::Value::Float(number) => number.to_string(),
        // a json string is a valid graphql string
        query::Value::String(text) => serde_json::to_string(text).unwrap_or_default(),
        query::Value::Boolean(flag) => flag.to_string(),
        query::Value::Null => "null".to_string(),
        query::Value::Enum(name) => name.clone(),
        query::Value::List(items) => {
            let items: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        query::Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}: {}", literal(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn type_ref(ty: &query::Type<'_, String>) -> TypeRef {
    match ty {
        query::Type::NamedType(name) => TypeRef::named(name.clone()),
        query::Type::ListType(inner) => TypeRef::list(type_ref(inner)),
        query::Type::NonNullType(inner) => TypeRef::non_null(type_ref(inner)),
    }
}
