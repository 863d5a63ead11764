//! schema renderer
//!
//! renders the schema model as graphql sdl, for the persisted
//! `schema.graphql` and for the schema-load check.

use crate::error::{Error, Result};
use crate::schema::{FieldDef, InputValue, Schema, TypeDef, TypeKind, TypeRef};

/// render every user type, sorted by name, as sdl text
pub fn render(schema: &Schema) -> Result<String> {
    let mut blocks = Vec::new();
    for ty in schema.user_types() {
        blocks.push(render_type(ty)?);
    }
    Ok(blocks.join("\n"))
}

/// parse rendered sdl back with `graphql-parser`, so a mismatch between the
/// introspection payload and the renderer surfaces before generation
pub fn check(sdl: &str) -> Result<()> {
    if sdl.trim().is_empty() {
        return Ok(());
    }
    graphql_parser::schema::parse_schema::<String>(sdl)
        .map(|_| ())
        .map_err(|err| Error::SchemaLoad(err.to_string()))
}

fn render_type(ty: &TypeDef) -> Result<String> {
    let mut out = String::new();
    description(&mut out, ty.description.as_deref(), "");

    match &ty.kind {
        TypeKind::Scalar => {
            out.push_str(&format!("scalar {}\n", ty.name));
        }
        TypeKind::Object | TypeKind::Interface => {
            let keyword = if ty.kind == TypeKind::Object {
                "type"
            } else {
                "interface"
            };
            out.push_str(&format!("{keyword} {}", ty.name));
            implements(&mut out, &ty.interfaces);
            if ty.fields.is_empty() {
                out.push('\n');
            } else {
                out.push_str(" {\n");
                for field in &ty.fields {
                    render_field(&mut out, field);
                }
                out.push_str("}\n");
            }
        }
        TypeKind::InputObject => {
            out.push_str(&format!("input {}", ty.name));
            if ty.input_fields.is_empty() {
                out.push('\n');
            } else {
                out.push_str(" {\n");
                for field in &ty.input_fields {
                    description(&mut out, field.description.as_deref(), "  ");
                    out.push_str(&format!("  {}: {}", field.name, field.ty));
                    default_value(&mut out, field);
                    out.push('\n');
                }
                out.push_str("}\n");
            }
        }
        TypeKind::Enum => {
            out.push_str(&format!("enum {}", ty.name));
            if ty.enum_values.is_empty() {
                out.push('\n');
            } else {
                out.push_str(" {\n");
                for value in &ty.enum_values {
                    description(&mut out, value.description.as_deref(), "  ");
                    if value.is_deprecated {
                        let reason = value.deprecation_reason.as_deref().unwrap_or("");
                        let line = format!("deprecated: {reason}");
                        comment(&mut out, line.trim_end(), "  ");
                    }
                    out.push_str(&format!("  {}\n", value.name));
                }
                out.push_str("}\n");
            }
        }
        TypeKind::Union => {
            out.push_str(&format!("union {}", ty.name));
            let members: Vec<&str> = ty.possible_types.iter().map(TypeRef::base_name).collect();
            if !members.is_empty() {
                out.push_str(&format!(" = {}", members.join(" | ")));
            }
            out.push('\n');
        }
        TypeKind::List | TypeKind::NonNull | TypeKind::Unknown(_) => {
            return Err(Error::UnknownTypeKind {
                name: ty.name.clone(),
                kind: ty.kind.as_str().to_string(),
            });
        }
    }

    Ok(out)
}

fn render_field(out: &mut String, field: &FieldDef) {
    description(out, field.description.as_deref(), "  ");
    out.push_str("  ");
    out.push_str(&field.name);
    if !field.args.is_empty() {
        let args: Vec<String> = field
            .args
            .iter()
            .map(|arg| {
                let mut rendered = format!("{}: {}", arg.name, arg.ty);
                default_value(&mut rendered, arg);
                rendered
            })
            .collect();
        out.push_str(&format!("({})", args.join(", ")));
    }
    out.push_str(&format!(": {}", field.ty));
    if field.is_deprecated {
        match field.deprecation_reason.as_deref() {
            Some(reason) if !reason.is_empty() => {
                out.push_str(&format!(" @deprecated(reason: \"{}\")", escape(reason)));
            }
            _ => out.push_str(" @deprecated"),
        }
    }
    out.push('\n');
}

fn implements(out: &mut String, interfaces: &[TypeRef]) {
    if interfaces.is_empty() {
        return;
    }
    let names: Vec<&str> = interfaces.iter().map(TypeRef::base_name).collect();
    out.push_str(&format!(" implements {}", names.join(" & ")));
}

fn default_value(out: &mut String, value: &InputValue) {
    if let Some(default) = value.default_value.as_deref() {
        out.push_str(&format!(" = {default}"));
    }
}

fn description(out: &mut String, description: Option<&str>, indent: &str) {
    let Some(description) = description else {
        return;
    };
    for line in description.lines() {
        comment(out, line.trim_end(), indent);
    }
}

fn comment(out: &mut String, line: &str, indent: &str) {
    if line.is_empty() {
        out.push_str(&format!("{indent}#\n"));
    } else {
        out.push_str(&format!("{indent}# {line}\n"));
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::sample_schema;

    #[test]
    fn test_render_is_deterministic() {
        let schema = sample_schema();
        let first = render(&schema).unwrap();
        let mut shuffled = schema.clone();
        shuffled.types.reverse();
        assert_eq!(first, render(&schema).unwrap());
        assert_eq!(first, render(&shuffled).unwrap());
    }

    #[test]
    fn test_render_excludes_builtin_root_and_reserved() {
        let sdl = render(&sample_schema()).unwrap();
        assert!(!sdl.contains("type Query"));
        assert!(!sdl.contains("scalar String"));
        assert!(!sdl.contains("scalar ID"));
        assert!(!sdl.contains("__Type"));
        assert!(!sdl.contains("_Service"));
        assert!(sdl.contains("scalar Date\n"));
    }

    #[test]
    fn test_render_object() {
        let sdl = render(&sample_schema()).unwrap();
        let expected = "\
# A country
# with borders
type Country implements Node {
  code: ID!
  name: String!
  capital: String
  continent: Continent!
  languages: [Language!]!
  area: Float
  population: [Int!]
  founded: Date
  region: Region
  # unicode code points
  emojiU: String! @deprecated(reason: \"use \\\"emoji\\\"\")
}
";
        assert!(sdl.contains(expected), "{sdl}");
    }

    #[test]
    fn test_render_input_enum_union() {
        let sdl = render(&sample_schema()).unwrap();
        assert!(sdl.contains(
            "input CountryFilterInput {\n  code: StringQueryOperatorInput\n  limit: Int = 10\n}\n"
        ));
        assert!(sdl.contains(
            "enum Region {\n  # old world\n  EUROPE\n  NORTH_AMERICA\n  # deprecated: sunk\n  ATLANTIS\n}\n"
        ));
        assert!(sdl.contains("union SearchResult = Country | Continent\n"));
        assert!(sdl.contains("interface Node {\n  code: ID!\n}\n"));
    }

    #[test]
    fn test_rendered_sdl_parses() {
        let sdl = render(&sample_schema()).unwrap();
        check(&sdl).unwrap();
        assert!(matches!(
            check("type Broken {"),
            Err(Error::SchemaLoad(_))
        ));
        check("").unwrap();
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        let mut schema = sample_schema();
        schema.types[1].kind = TypeKind::Unknown("MYSTERY".to_string());
        assert!(matches!(
            render(&schema),
            Err(Error::UnknownTypeKind { .. })
        ));
    }

    #[test]
    fn test_field_arguments_and_defaults() {
        let field = FieldDef {
            name: "countries".to_string(),
            description: None,
            args: vec![
                InputValue {
                    name: "filter".to_string(),
                    description: None,
                    ty: TypeRef::named("CountryFilterInput"),
                    default_value: Some("{}".to_string()),
                },
                InputValue {
                    name: "first".to_string(),
                    description: None,
                    ty: TypeRef::non_null(TypeRef::named("Int")),
                    default_value: None,
                },
            ],
            ty: TypeRef::named("String"),
            is_deprecated: true,
            deprecation_reason: None,
        };
        let mut out = String::new();
        render_field(&mut out, &field);
        assert_eq!(
            out,
            "  countries(filter: CountryFilterInput = {}, first: Int!): String @deprecated\n"
        );
    }
}
