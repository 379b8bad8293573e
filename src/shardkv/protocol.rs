//! Shardkv Network Protocol
//!
//! API endpoints and DTOs for the data plane, shared by client requests,
//! peer-to-peer migration puts and cascaded deletes.

use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Public read endpoint, key in the path.
pub const ENDPOINT_GET: &str = "/get";
/// Write endpoint; also carries internal migration puts (empty `user`).
pub const ENDPOINT_PUT: &str = "/put";
/// Concatenating write endpoint.
pub const ENDPOINT_APPEND: &str = "/append";
/// Removal endpoint; users cascade to their posts.
pub const ENDPOINT_DELETE: &str = "/delete";
/// Node health and sizing counters.
pub const ENDPOINT_STATS: &str = "/health/stats";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub data: String,
    /// Author key (`user_<id>`) when a client stores a post; empty for
    /// every other form, including internal migration transfers.
    pub user: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppendRequest {
    pub key: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub key: String,
}

/// Response for reads. Exactly one of the fields is set.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub data: Option<String>,
    pub error: Option<String>,
}

/// Acknowledgment for mutating data-plane calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    /// Diagnostic for rejected requests.
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn rejected(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Health counters for one data server.
#[derive(Debug, Serialize, Deserialize)]
pub struct KvStatsResponse {
    pub address: String,
    pub entries: usize,
    pub shards_owned: usize,
    pub tombstones: usize,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
