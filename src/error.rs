//! Error vocabulary shared by both services.
//!
//! Every variant surfaces at the wire as an invalid-argument response whose
//! body carries the variant's message as the diagnostic. Missing keys are
//! the one exception and map to `404` so plain GETs read naturally.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("key must not be empty")]
    EmptyKey,
    #[error("server address must not be empty")]
    EmptyServer,
    #[error("server list must not be empty")]
    EmptyServerList,
    #[error("operation not allowed on key {0}")]
    IllegalKey(String),
    #[error("server {0} already in the cluster")]
    DuplicateServer(String),
    #[error("server {0} not in the cluster")]
    UnknownServer(String),
    #[error("server not responsible for key {0}")]
    NotResponsible(String),
    #[error("key {0} not found")]
    NotFound(String),
    #[error("cannot create post {0} without a user to link it to")]
    NeedsUserContext(String),
    #[error("malformed key {0}")]
    MalformedKey(String),
    #[error("shard bounds {0}..{1} are inverted")]
    InvalidShard(u32, u32),
    #[error("cannot partition the key space into {0} shards")]
    InvalidPartition(usize),
}

impl StoreError {
    /// HTTP status this error surfaces with.
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
