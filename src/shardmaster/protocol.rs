//! Shardmaster Network Protocol
//!
//! API endpoints and DTOs for the control plane. Serialized as JSON over
//! HTTP; the `Shard` intervals ride along verbatim.

use crate::shard::interval::Shard;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Registers a new data server and rebalances.
pub const ENDPOINT_JOIN: &str = "/join";
/// Removes one or more data servers and rebalances.
pub const ENDPOINT_LEAVE: &str = "/leave";
/// Reassigns an arbitrary interval to one server.
pub const ENDPOINT_MOVE: &str = "/move";
/// Returns the current configuration snapshot.
pub const ENDPOINT_QUERY: &str = "/query";
/// Erases a key (cascading for users) across the cluster.
pub const ENDPOINT_GDPR_DELETE: &str = "/gdpr_delete";
/// Node health and sizing counters.
pub const ENDPOINT_STATS: &str = "/health/stats";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Address of the joining key-value server.
    pub server: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Addresses of the departing key-value servers.
    pub servers: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Destination server address.
    pub server: String,
    /// Interval to place on the destination.
    pub shard: Shard,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GdprDeleteRequest {
    /// Schema key whose data should be erased cluster-wide.
    pub key: String,
}

/// One server's slice of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub server: String,
    pub shards: Vec<Shard>,
}

/// Configuration snapshot, ordered by join time.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub config: Vec<ConfigEntry>,
}

/// Acknowledgment for mutating control-plane calls.
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

/// Health counters for the shardmaster node.
#[derive(Debug, Serialize, Deserialize)]
pub struct MasterStatsResponse {
    pub servers: usize,
    pub shards: usize,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
