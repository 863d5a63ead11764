//! main client
//!
//! runtime graphql client used by generated code: raw and typed execution,
//! generated operations, and schema introspection.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use crate::operation::Operation;
use crate::schema::{Schema, INTROSPECTION_QUERY};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use url::Url;

/// graphql client for one endpoint
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    endpoint: Url,
    http: reqwest::Client,
}

impl Client {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint = config.validate()?.clone();

        let http = match &config.http_client {
            Some(http) => http.clone(),
            None => reqwest::Client::builder()
                .default_headers(config.extra_headers.clone())
                .user_agent(config.user_agent.clone())
                .timeout(config.timeout)
                .danger_accept_invalid_certs(!config.verify_ssl)
                .build()?,
        };

        Ok(Self {
            config: Arc::new(config),
            endpoint,
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// graphql endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// execute a query and deserialize `data` into `T`
    pub async fn execute<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: &V,
    ) -> Result<GraphQlResponse<T>> {
        self.execute_with(query, operation_name, variables, |url, body| async move {
            self.post(url, body).await
        })
        .await
    }

    /// execute a generated operation and return its data
    pub async fn execute_operation<O: Operation>(
        &self,
        variables: &O::Variables,
    ) -> Result<O::Response> {
        self.execute_operation_with::<O, _, _>(variables, |url, body| async move {
            self.post(url, body).await
        })
        .await
    }

    /// run the standard introspection query.
    ///
    /// returns the decoded schema and the `data` payload as received.
    pub async fn introspect(&self) -> Result<(Schema, serde_json::Value)> {
        self.introspect_with(|url, body| async move { self.post(url, body).await })
            .await
    }

    async fn post(&self, url: Url, body: String) -> Result<(StatusCode, String)> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn parse_graphql_response<T: DeserializeOwned>(
    status: StatusCode,
    text: String,
) -> Result<GraphQlResponse<T>> {
    if !status.is_success() {
        // error bodies are often not graphql at all
        let errors = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&text)
            .map(|parsed| parsed.errors)
            .unwrap_or_default();
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors,
            body: text,
            message: format!("graphql http error: {}", status),
        });
    }

    let parsed: GraphQlResponse<T> = serde_json::from_str(&text)?;
    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .first()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| "graphql error".to_string());
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: parsed.errors,
            body: text,
            message,
        });
    }

    Ok(parsed)
}

impl Client {
    pub(crate) async fn execute_with<V, T, F, Fut>(
        &self,
        query: &str,
        operation_name: Option<&str>,
        variables: &V,
        send: F,
    ) -> Result<GraphQlResponse<T>>
    where
        V: Serialize,
        T: DeserializeOwned,
        F: FnOnce(Url, String) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let body = serde_json::to_string(&GraphQlRequest {
            query,
            operation_name,
            variables,
        })?;

        tracing::debug!(
            endpoint = %self.endpoint,
            operation = operation_name.unwrap_or("<anonymous>"),
            "sending graphql request"
        );
        let (status, text) = send(self.endpoint.clone(), body).await?;
        parse_graphql_response(status, text)
    }

    pub(crate) async fn execute_operation_with<O, F, Fut>(
        &self,
        variables: &O::Variables,
        send: F,
    ) -> Result<O::Response>
    where
        O: Operation,
        F: FnOnce(Url, String) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let response: GraphQlResponse<O::Response> = self
            .execute_with(O::QUERY, Some(O::NAME), variables, send)
            .await?;
        response.data.ok_or(Error::MissingData)
    }

    pub(crate) async fn introspect_with<F, Fut>(
        &self,
        send: F,
    ) -> Result<(Schema, serde_json::Value)>
    where
        F: FnOnce(Url, String) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let response: GraphQlResponse<serde_json::Value> = self
            .execute_with(
                INTROSPECTION_QUERY,
                Some("IntrospectionQuery"),
                &serde_json::Map::new(),
                send,
            )
            .await?;
        let data = response.data.ok_or(Error::MissingData)?;
        let schema = Schema::from_introspection(&data)?;
        Ok((schema, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use crate::schema::tests::sample_schema_json;
    use serde::Deserialize;

    fn test_client() -> Client {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test http client");
        Client::new(ClientConfig::new("http://localhost:1234/graphql").with_http_client(http))
            .unwrap()
    }

    #[derive(Debug, Serialize)]
    struct CountryRequest {
        code: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct CountryResponse {
        country: Option<CountryName>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct CountryName {
        name: String,
    }

    struct CountryOperation;

    impl Operation for CountryOperation {
        const NAME: &'static str = "Country";
        const KIND: OperationKind = OperationKind::Query;
        const QUERY: &'static str = "query Country($code: ID!) { country(code: $code) { name } }";
        type Variables = CountryRequest;
        type Response = CountryResponse;
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_posts_typed_body() {
        #[derive(Debug, Deserialize)]
        struct Data {
            value: i64,
        }
        let client = test_client();
        let response = client
            .execute_with::<_, Data, _, _>(
                "query Value { value }",
                Some("Value"),
                &serde_json::json!({ "limit": 3 }),
                |url, body| async move {
                    assert_eq!(url.path(), "/graphql");
                    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
                    assert_eq!(body["query"], "query Value { value }");
                    assert_eq!(body["operationName"], "Value");
                    assert_eq!(body["variables"]["limit"], 3);
                    Ok((StatusCode::OK, "{\"data\": {\"value\": 7}}".to_string()))
                },
            )
            .await
            .unwrap();

        assert_eq!(response.data.unwrap().value, 7);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_graphql_error() {
        let client = test_client();
        let err = client
            .execute_with::<_, serde_json::Value, _, _>(
                "query { ok }",
                None,
                &serde_json::Map::new(),
                |_url, body| async move {
                    assert!(!body.contains("operationName"));
                    Ok((
                        StatusCode::OK,
                        "{\"data\": null, \"errors\": [{\"message\": \"boom\"}]}".to_string(),
                    ))
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::GraphQl { ref message, .. } if message == "boom"));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_operation() {
        let client = test_client();
        let request = CountryRequest {
            code: "DE".to_string(),
        };
        let response = client
            .execute_operation_with::<CountryOperation, _, _>(&request, |_url, body| async move {
                let body: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(body["operationName"], "Country");
                assert_eq!(body["variables"], serde_json::json!({ "code": "DE" }));
                Ok((
                    StatusCode::OK,
                    "{\"data\": {\"country\": {\"name\": \"Germany\"}}}".to_string(),
                ))
            })
            .await
            .unwrap();

        assert_eq!(
            response,
            CountryResponse {
                country: Some(CountryName {
                    name: "Germany".to_string()
                })
            }
        );
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_operation_missing_data() {
        let client = test_client();
        let request = CountryRequest {
            code: "DE".to_string(),
        };
        let err = client
            .execute_operation_with::<CountryOperation, _, _>(&request, |_url, _body| async move {
                Ok((StatusCode::OK, "{\"data\": null}".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingData));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_introspect() {
        let client = test_client();
        let payload = sample_schema_json().to_string();
        let (schema, raw) = client
            .introspect_with(|_url, body| async move {
                let body: serde_json::Value = serde_json::from_str(&body).unwrap();
                assert_eq!(body["operationName"], "IntrospectionQuery");
                assert!(body["query"].as_str().unwrap().contains("__schema"));
                Ok((StatusCode::OK, payload))
            })
            .await
            .unwrap();

        assert!(schema.get("Country").is_some());
        assert!(raw.get("__schema").is_some());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_introspect_http_error() {
        let client = test_client();
        let err = client
            .introspect_with(|_url, _body| async move {
                Ok((StatusCode::UNAUTHORIZED, "denied".to_string()))
            })
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let err = Client::new(ClientConfig::new("ftp://example.com/graphql")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_graphql_response_http_error() {
        let text = "{\"errors\": [{\"message\": \"bad gateway\"}]}".to_string();
        let err =
            parse_graphql_response::<serde_json::Value>(StatusCode::BAD_GATEWAY, text).unwrap_err();
        match err {
            Error::GraphQl { status, errors, .. } => {
                assert_eq!(status, Some(502));
                assert_eq!(errors[0].message, "bad gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_graphql_response_invalid_json() {
        let err = parse_graphql_response::<serde_json::Value>(StatusCode::OK, "<html>".to_string())
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
