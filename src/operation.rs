//! generated operation contract
//!
//! implemented by the `<Name>Operation` types emitted into `client.rs`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// graphql operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// keyword used in graphql documents
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// graphql operation contract for generated types
pub trait Operation {
    /// operation name as written in the document
    const NAME: &'static str;
    /// query, mutation, or subscription
    const KIND: OperationKind;
    /// literal document text sent to the server
    const QUERY: &'static str;
    /// request type built from the variable definitions
    type Variables: Serialize;
    /// response payload type
    type Response: DeserializeOwned;
}
