use crate::shard::interval::Shard;
use crate::shardmaster::protocol::{
    AckResponse, ConfigEntry, GdprDeleteRequest, JoinRequest, LeaveRequest, MoveRequest,
    QueryResponse, ENDPOINT_GDPR_DELETE, ENDPOINT_JOIN, ENDPOINT_LEAVE, ENDPOINT_MOVE,
    ENDPOINT_QUERY,
};
use anyhow::Result;
use serde::Serialize;

/// Client for the shardmaster control API.
#[derive(Clone)]
pub struct MasterClient {
    http: reqwest::Client,
    addr: String,
}

impl MasterClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            addr: addr.into(),
        }
    }

    /// Fetches the current configuration snapshot, in join order.
    ///
    /// Single attempt; the reconciler treats a failure as a skipped tick.
    pub async fn query(&self) -> Result<Vec<ConfigEntry>> {
        let url = format!("http://{}{}", self.addr, ENDPOINT_QUERY);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("query rejected with {}", resp.status());
        }
        let body: QueryResponse = resp.json().await?;
        Ok(body.config)
    }

    pub async fn join(&self, server: &str) -> Result<()> {
        self.post(
            ENDPOINT_JOIN,
            &JoinRequest {
                server: server.to_string(),
            },
        )
        .await
    }

    pub async fn leave(&self, servers: Vec<String>) -> Result<()> {
        self.post(ENDPOINT_LEAVE, &LeaveRequest { servers }).await
    }

    pub async fn move_shard(&self, server: &str, shard: Shard) -> Result<()> {
        self.post(
            ENDPOINT_MOVE,
            &MoveRequest {
                server: server.to_string(),
                shard,
            },
        )
        .await
    }

    pub async fn gdpr_delete(&self, key: &str) -> Result<()> {
        self.post(
            ENDPOINT_GDPR_DELETE,
            &GdprDeleteRequest {
                key: key.to_string(),
            },
        )
        .await
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T) -> Result<()> {
        let url = format!("http://{}{}", self.addr, endpoint);
        let resp = self.http.post(&url).json(payload).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let diagnostic = match resp.json::<AckResponse>().await {
            Ok(ack) => ack.error.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        anyhow::bail!("{} rejected: {}", endpoint, diagnostic)
    }
}
