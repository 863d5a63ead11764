//! graphql wire types
//!
//! request body, response wrapper, and errors.

use serde::{Deserialize, Serialize};

/// graphql request body, serialized straight from typed variables
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V: Serialize> {
    /// document text
    pub query: &'a str,
    /// operation to run when the document holds several
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
    /// typed variables
    pub variables: &'a V,
}

/// graphql response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data or null if errors
    pub data: Option<T>,
    /// graphql errors array
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// graphql error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// graphql error location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_errors() {
        let ok: GraphQlResponse<serde_json::Value> = GraphQlResponse {
            data: Some(serde_json::json!({"ok": true})),
            errors: vec![],
        };
        assert!(!ok.has_errors());

        let err: GraphQlResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data": null, "errors": [{"message": "boom"}]}"#).unwrap();
        assert!(err.has_errors());
        assert_eq!(err.errors[0].message, "boom");
    }

    #[test]
    fn test_request_body_shape() {
        #[derive(Serialize)]
        struct Vars {
            code: String,
        }

        let vars = Vars {
            code: "DE".to_string(),
        };
        let body = GraphQlRequest {
            query: "query Country($code: ID!) { country(code: $code) { name } }",
            operation_name: Some("Country"),
            variables: &vars,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["operationName"], "Country");
        assert_eq!(value["variables"]["code"], "DE");

        let anonymous = GraphQlRequest {
            query: "{ ok }",
            operation_name: None,
            variables: &serde_json::json!({}),
        };
        let value = serde_json::to_value(&anonymous).unwrap();
        assert!(value.get("operationName").is_none());
    }
}
