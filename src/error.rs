//! error types
//!
//! structured errors for schema fetch, schema load, operation parsing,
//! code generation, configuration, and output i/o.

use crate::graphql::GraphQlError;
use std::fmt;
use std::path::PathBuf;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the runtime client and the generator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graphql error: {message}")]
    GraphQl {
        /// http status if available
        status: Option<u16>,
        /// graphql error list
        errors: Vec<GraphQlError>,
        /// raw response body
        body: String,
        /// top-level message
        message: String,
    },

    #[error("graphql response has no data")]
    MissingData,

    #[error("schema load error: {0}")]
    SchemaLoad(String),

    #[error("unknown type kind {kind} for type {name}")]
    UnknownTypeKind {
        /// offending type
        name: String,
        /// raw kind string from the payload
        kind: String,
    },

    #[error("{}: {message}", .path.display())]
    OperationParse {
        /// document the operation came from
        path: PathBuf,
        /// parser or resolution message
        message: String,
    },

    #[error("operation {operation}: {construct} is not supported")]
    UnsupportedSelection {
        /// operation being generated
        operation: String,
        /// description of the rejected selection
        construct: String,
    },

    #[error("generated type name {0} is already taken")]
    NameCollision(String),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// file or directory involved
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::OperationParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// true if the error looks like an auth failure from the schema endpoint
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::GraphQl { status: Some(401 | 403), .. })
            || matches!(self, Error::Http(err) if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED))
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
