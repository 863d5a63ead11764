//! schema model
//!
//! in-memory graphql schema decoded from an introspection result
//! (`__schema` json shape). immutable once built; a by-name index is
//! filled in at decode time.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// standard introspection query, asking for everything the generator and
/// the sdl renderer use
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
    directives {
      name
      description
      locations
      args { ...InputValue }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// names of the scalars every graphql schema has
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// conventional root type names
pub const ROOT_TYPE_NAMES: [&str; 3] = ["Query", "Mutation", "Subscription"];

/// true for `String`, `Int`, `Float`, `Boolean`, and `ID`
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// kind of a named type (or wrapper, inside type references)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    Unknown(String),
}

impl From<String> for TypeKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "SCALAR" => TypeKind::Scalar,
            "OBJECT" => TypeKind::Object,
            "INTERFACE" => TypeKind::Interface,
            "UNION" => TypeKind::Union,
            "ENUM" => TypeKind::Enum,
            "INPUT_OBJECT" => TypeKind::InputObject,
            "LIST" => TypeKind::List,
            "NON_NULL" => TypeKind::NonNull,
            _ => TypeKind::Unknown(kind),
        }
    }
}

impl TypeKind {
    /// introspection spelling of the kind
    pub fn as_str(&self) -> &str {
        match self {
            TypeKind::Scalar => "SCALAR",
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::InputObject => "INPUT_OBJECT",
            TypeKind::List => "LIST",
            TypeKind::NonNull => "NON_NULL",
            TypeKind::Unknown(kind) => kind,
        }
    }

    /// object, interface, or union: types that need a selection set
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeKind::Object | TypeKind::Interface | TypeKind::Union
        )
    }
}

/// reference to a type: a named type, or a list / non-null wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawTypeRef")]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// named type reference
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// wrap in a list
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// wrap in non-null
    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    /// true if the outermost wrapper is non-null
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::List(inner) => write!(f, "[{inner}]"),
            TypeRef::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

/// wire shape of a type reference: `{ kind, name, ofType }`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeRef {
    kind: TypeKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    of_type: Option<Box<RawTypeRef>>,
}

impl TryFrom<RawTypeRef> for TypeRef {
    type Error = String;

    fn try_from(raw: RawTypeRef) -> std::result::Result<Self, Self::Error> {
        match raw.kind {
            TypeKind::List | TypeKind::NonNull => {
                let inner = raw
                    .of_type
                    .ok_or_else(|| format!("{} type reference without ofType", raw.kind.as_str()))?;
                let inner = TypeRef::try_from(*inner)?;
                if raw.kind == TypeKind::List {
                    Ok(TypeRef::list(inner))
                } else {
                    Ok(TypeRef::non_null(inner))
                }
            }
            kind => raw
                .name
                .map(TypeRef::Named)
                .ok_or_else(|| format!("{} type reference without name", kind.as_str())),
        }
    }
}

/// input value: a field argument or an input object field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// default as a graphql literal
    #[serde(default)]
    pub default_value: Option<String>,
}

/// field of an object or interface
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

impl FieldDef {
    /// the implicit `__typename: String!` meta field
    pub fn typename() -> Self {
        Self {
            name: "__typename".to_string(),
            description: None,
            args: Vec::new(),
            ty: TypeRef::non_null(TypeRef::named("String")),
            is_deprecated: false,
            deprecation_reason: None,
        }
    }
}

/// value of an enum type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

/// named type definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub fields: Vec<FieldDef>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub input_fields: Vec<InputValue>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub enum_values: Vec<EnumValue>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub possible_types: Vec<TypeRef>,
}

impl TypeDef {
    /// field by name, including `__typename`
    pub fn field(&self, name: &str) -> Option<FieldDef> {
        if name == "__typename" {
            return Some(FieldDef::typename());
        }
        self.fields.iter().find(|field| field.name == name).cloned()
    }
}

/// directive definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub args: Vec<InputValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RootRef {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(default)]
    query_type: Option<RootRef>,
    #[serde(default)]
    mutation_type: Option<RootRef>,
    #[serde(default)]
    subscription_type: Option<RootRef>,
    types: Vec<TypeDef>,
    #[serde(default, deserialize_with = "nullable_vec")]
    directives: Vec<Directive>,
}

/// decoded graphql schema
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSchema")]
pub struct Schema {
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub types: Vec<TypeDef>,
    pub directives: Vec<Directive>,
    index: HashMap<String, usize>,
}

impl From<RawSchema> for Schema {
    fn from(raw: RawSchema) -> Self {
        let index = raw
            .types
            .iter()
            .enumerate()
            .map(|(idx, ty)| (ty.name.clone(), idx))
            .collect();
        Self {
            query_type: raw.query_type.map(|root| root.name),
            mutation_type: raw.mutation_type.map(|root| root.name),
            subscription_type: raw.subscription_type.map(|root| root.name),
            types: raw.types,
            directives: raw.directives,
            index,
        }
    }
}

/// `{"__schema": ...}` envelope
#[derive(Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__schema")]
    schema: Schema,
}

impl Schema {
    /// decode an introspection payload.
    ///
    /// accepts the full response (`{"data": {"__schema": ..}}`) or just its
    /// data (`{"__schema": ..}`).
    pub fn from_introspection(value: &serde_json::Value) -> Result<Self> {
        let data = value.get("data").unwrap_or(value);
        if data.get("__schema").is_none() {
            return Err(Error::SchemaLoad(
                "introspection payload has no __schema".to_string(),
            ));
        }
        let parsed = IntrospectionData::deserialize(data)?;
        Ok(parsed.schema)
    }

    /// look up a named type
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index
            .get(name)
            .and_then(|idx| self.types.get(*idx))
            .filter(|ty| ty.name == name)
            // `types` is public; fall back if it was edited after decoding
            .or_else(|| self.types.iter().find(|ty| ty.name == name))
    }

    /// name of the root type for an operation keyword
    pub fn root_type(&self, kind: crate::OperationKind) -> Option<&str> {
        match kind {
            crate::OperationKind::Query => self.query_type.as_deref(),
            crate::OperationKind::Mutation => self.mutation_type.as_deref(),
            crate::OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    /// true for root operation types, by convention or by declaration
    pub fn is_root_type(&self, name: &str) -> bool {
        ROOT_TYPE_NAMES.contains(&name)
            || self.query_type.as_deref() == Some(name)
            || self.mutation_type.as_deref() == Some(name)
            || self.subscription_type.as_deref() == Some(name)
    }

    /// true for types that get their own sdl line and generated declaration:
    /// not a built-in scalar, not a root type, not reserved (`_` prefix)
    pub fn is_user_type(&self, ty: &TypeDef) -> bool {
        !(ty.name.is_empty()
            || ty.name.starts_with('_')
            || is_builtin_scalar(&ty.name) && ty.kind == TypeKind::Scalar
            || self.is_root_type(&ty.name))
    }

    /// user types sorted by name
    pub fn user_types(&self) -> Vec<&TypeDef> {
        let mut types: Vec<&TypeDef> = self
            .types
            .iter()
            .filter(|ty| self.is_user_type(ty))
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    /// check the invariants the renderer and generator rely on
    pub fn validate(&self) -> Result<()> {
        if self.index.len() != self.types.len() {
            let mut seen = std::collections::HashSet::new();
            for ty in &self.types {
                if !seen.insert(ty.name.as_str()) {
                    return Err(Error::SchemaLoad(format!("duplicate type {}", ty.name)));
                }
            }
        }

        for ty in &self.types {
            if matches!(
                ty.kind,
                TypeKind::Unknown(_) | TypeKind::List | TypeKind::NonNull
            ) {
                return Err(Error::UnknownTypeKind {
                    name: ty.name.clone(),
                    kind: ty.kind.as_str().to_string(),
                });
            }

            let refs = ty
                .fields
                .iter()
                .flat_map(|field| {
                    std::iter::once(&field.ty).chain(field.args.iter().map(|arg| &arg.ty))
                })
                .chain(ty.input_fields.iter().map(|field| &field.ty))
                .chain(ty.interfaces.iter())
                .chain(ty.possible_types.iter());
            for type_ref in refs {
                self.check_resolves(type_ref, &ty.name)?;
            }
        }

        for root in [&self.query_type, &self.mutation_type, &self.subscription_type]
            .into_iter()
            .flatten()
        {
            if self.get(root).is_none() {
                return Err(Error::SchemaLoad(format!("unknown root type {root}")));
            }
        }

        Ok(())
    }

    fn check_resolves(&self, type_ref: &TypeRef, owner: &str) -> Result<()> {
        let name = type_ref.base_name();
        if is_builtin_scalar(name) || self.get(name).is_some() {
            return Ok(());
        }
        Err(Error::SchemaLoad(format!(
            "type {owner} references unknown type {name}"
        )))
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn named(kind: &str, name: &str) -> serde_json::Value {
        json!({ "kind": kind, "name": name, "ofType": null })
    }

    pub(crate) fn non_null(inner: serde_json::Value) -> serde_json::Value {
        json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
    }

    pub(crate) fn list(inner: serde_json::Value) -> serde_json::Value {
        json!({ "kind": "LIST", "name": null, "ofType": inner })
    }

    pub(crate) fn field(name: &str, ty: serde_json::Value) -> serde_json::Value {
        json!({
            "name": name,
            "description": null,
            "args": [],
            "type": ty,
            "isDeprecated": false,
            "deprecationReason": null
        })
    }

    /// small countries-style schema shared by the module tests
    pub(crate) fn sample_schema_json() -> serde_json::Value {
        json!({
            "data": {
                "__schema": {
                    "queryType": { "name": "Query" },
                    "mutationType": null,
                    "subscriptionType": null,
                    "types": [
                        {
                            "kind": "OBJECT",
                            "name": "Query",
                            "fields": [
                                {
                                    "name": "country",
                                    "description": null,
                                    "args": [{
                                        "name": "code",
                                        "description": null,
                                        "type": non_null(named("SCALAR", "ID")),
                                        "defaultValue": null
                                    }],
                                    "type": named("OBJECT", "Country"),
                                    "isDeprecated": false,
                                    "deprecationReason": null
                                },
                                field("countries", non_null(list(non_null(named("OBJECT", "Country"))))),
                                field("search", list(named("UNION", "SearchResult")))
                            ],
                            "inputFields": null,
                            "interfaces": [],
                            "enumValues": null,
                            "possibleTypes": null
                        },
                        {
                            "kind": "OBJECT",
                            "name": "Country",
                            "description": "A country\nwith borders",
                            "fields": [
                                field("code", non_null(named("SCALAR", "ID"))),
                                field("name", non_null(named("SCALAR", "String"))),
                                field("capital", named("SCALAR", "String")),
                                field("continent", non_null(named("OBJECT", "Continent"))),
                                field("languages", non_null(list(non_null(named("OBJECT", "Language"))))),
                                field("area", named("SCALAR", "Float")),
                                field("population", list(non_null(named("SCALAR", "Int")))),
                                field("founded", named("SCALAR", "Date")),
                                field("region", named("ENUM", "Region")),
                                {
                                    "name": "emojiU",
                                    "description": "unicode code points",
                                    "args": [],
                                    "type": non_null(named("SCALAR", "String")),
                                    "isDeprecated": true,
                                    "deprecationReason": "use \"emoji\""
                                }
                            ],
                            "inputFields": null,
                            "interfaces": [named("INTERFACE", "Node")],
                            "enumValues": null,
                            "possibleTypes": null
                        },
                        {
                            "kind": "OBJECT",
                            "name": "Continent",
                            "fields": [
                                field("code", non_null(named("SCALAR", "ID"))),
                                field("name", non_null(named("SCALAR", "String"))),
                                field("countries", non_null(list(non_null(named("OBJECT", "Country")))))
                            ],
                            "interfaces": []
                        },
                        {
                            "kind": "OBJECT",
                            "name": "Language",
                            "fields": [
                                field("code", non_null(named("SCALAR", "ID"))),
                                field("name", named("SCALAR", "String")),
                                field("rtl", non_null(named("SCALAR", "Boolean")))
                            ],
                            "interfaces": []
                        },
                        {
                            "kind": "INTERFACE",
                            "name": "Node",
                            "fields": [field("code", non_null(named("SCALAR", "ID")))],
                            "possibleTypes": [named("OBJECT", "Country")]
                        },
                        {
                            "kind": "UNION",
                            "name": "SearchResult",
                            "fields": null,
                            "possibleTypes": [named("OBJECT", "Country"), named("OBJECT", "Continent")]
                        },
                        {
                            "kind": "ENUM",
                            "name": "Region",
                            "enumValues": [
                                { "name": "EUROPE", "description": "old world", "isDeprecated": false, "deprecationReason": null },
                                { "name": "NORTH_AMERICA", "description": null, "isDeprecated": false, "deprecationReason": null },
                                { "name": "ATLANTIS", "description": null, "isDeprecated": true, "deprecationReason": "sunk" }
                            ]
                        },
                        {
                            "kind": "INPUT_OBJECT",
                            "name": "CountryFilterInput",
                            "inputFields": [
                                {
                                    "name": "code",
                                    "description": null,
                                    "type": named("INPUT_OBJECT", "StringQueryOperatorInput"),
                                    "defaultValue": null
                                },
                                {
                                    "name": "limit",
                                    "description": null,
                                    "type": named("SCALAR", "Int"),
                                    "defaultValue": "10"
                                }
                            ]
                        },
                        {
                            "kind": "INPUT_OBJECT",
                            "name": "StringQueryOperatorInput",
                            "inputFields": [
                                { "name": "eq", "type": named("SCALAR", "String"), "defaultValue": null },
                                { "name": "in", "type": list(non_null(named("SCALAR", "String"))), "defaultValue": null }
                            ]
                        },
                        { "kind": "SCALAR", "name": "Date", "description": "ISO-8601 date" },
                        { "kind": "SCALAR", "name": "String" },
                        { "kind": "SCALAR", "name": "ID" },
                        { "kind": "SCALAR", "name": "Int" },
                        { "kind": "SCALAR", "name": "Float" },
                        { "kind": "SCALAR", "name": "Boolean" },
                        {
                            "kind": "OBJECT",
                            "name": "__Type",
                            "fields": [field("name", named("SCALAR", "String"))]
                        },
                        {
                            "kind": "OBJECT",
                            "name": "_Service",
                            "fields": [field("sdl", named("SCALAR", "String"))]
                        }
                    ],
                    "directives": [
                        { "name": "skip", "description": null, "locations": ["FIELD"], "args": [] }
                    ]
                }
            }
        })
    }

    pub(crate) fn sample_schema() -> Schema {
        Schema::from_introspection(&sample_schema_json()).unwrap()
    }

    #[test]
    fn test_decode_type_refs() {
        let schema = sample_schema();
        let country = schema.get("Country").unwrap();
        let languages = country.field("languages").unwrap();
        assert_eq!(
            languages.ty,
            TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("Language"))))
        );
        assert_eq!(languages.ty.to_string(), "[Language!]!");
        assert_eq!(languages.ty.base_name(), "Language");
        assert_eq!(schema.query_type.as_deref(), Some("Query"));
        assert_eq!(schema.directives[0].name, "skip");
    }

    #[test]
    fn test_null_lists_decode_empty() {
        let schema = sample_schema();
        let union = schema.get("SearchResult").unwrap();
        assert!(union.fields.is_empty());
        assert_eq!(union.possible_types.len(), 2);
    }

    #[test]
    fn test_accepts_bare_data() {
        let value = sample_schema_json();
        let schema = Schema::from_introspection(&value["data"]).unwrap();
        assert!(schema.get("Country").is_some());

        let err = Schema::from_introspection(&json!({ "data": {} })).unwrap_err();
        assert!(matches!(err, Error::SchemaLoad(_)));
    }

    #[test]
    fn test_list_without_of_type_is_rejected() {
        let value = json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "types": [{
                    "kind": "OBJECT",
                    "name": "Query",
                    "fields": [field("broken", json!({ "kind": "LIST", "name": null, "ofType": null }))]
                }]
            }
        });
        assert!(matches!(
            Schema::from_introspection(&value),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_user_types_exclusions() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.user_types().iter().map(|ty| ty.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Continent",
                "Country",
                "CountryFilterInput",
                "Date",
                "Language",
                "Node",
                "Region",
                "SearchResult",
                "StringQueryOperatorInput"
            ]
        );
    }

    #[test]
    fn test_validate_accepts_sample() {
        sample_schema().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_kind() {
        let value = json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "types": [
                    { "kind": "OBJECT", "name": "Query", "fields": [field("ok", named("SCALAR", "Boolean"))] },
                    { "kind": "MYSTERY", "name": "Odd" }
                ]
            }
        });
        let schema = Schema::from_introspection(&value).unwrap();
        let err = schema.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownTypeKind { ref name, ref kind } if name == "Odd" && kind == "MYSTERY"
        ));
    }

    #[test]
    fn test_validate_rejects_dangling_reference() {
        let value = json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "types": [
                    { "kind": "OBJECT", "name": "Query", "fields": [field("ghost", named("OBJECT", "Ghost"))] }
                ]
            }
        });
        let schema = Schema::from_introspection(&value).unwrap();
        assert!(matches!(schema.validate(), Err(Error::SchemaLoad(_))));
    }
}
