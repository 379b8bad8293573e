use crate::shardkv::protocol::{
    AppendRequest, DeleteRequest, PutRequest, ENDPOINT_APPEND, ENDPOINT_DELETE, ENDPOINT_PUT,
};
use serde::Serialize;
use std::time::Duration;

/// Delay between retries of a peer call that must not fail.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Client for the data-plane API of peer shardkv servers.
///
/// Migration and cascaded operations rely on at-least-once delivery, so
/// every call here loops until the peer returns success.
#[derive(Clone, Default)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Stores `key -> data` on the peer. `user` is empty for internal
    /// migration puts.
    pub async fn put(&self, addr: &str, key: &str, data: &str, user: &str) {
        let payload = PutRequest {
            key: key.to_string(),
            data: data.to_string(),
            user: user.to_string(),
        };
        self.post_until_ok(addr, ENDPOINT_PUT, &payload).await;
    }

    /// Appends `data` to `key` on the peer.
    pub async fn append(&self, addr: &str, key: &str, data: &str) {
        let payload = AppendRequest {
            key: key.to_string(),
            data: data.to_string(),
        };
        self.post_until_ok(addr, ENDPOINT_APPEND, &payload).await;
    }

    /// Deletes `key` on the peer.
    pub async fn delete(&self, addr: &str, key: &str) {
        let payload = DeleteRequest {
            key: key.to_string(),
        };
        self.post_until_ok(addr, ENDPOINT_DELETE, &payload).await;
    }

    async fn post_until_ok<T: Serialize>(&self, addr: &str, endpoint: &str, payload: &T) {
        let url = format!("http://{}{}", addr, endpoint);
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.http.post(&url).json(payload).send().await {
                Ok(resp) if resp.status().is_success() => return,
                Ok(resp) => {
                    tracing::debug!(
                        "peer call {} rejected with {} (attempt {})",
                        url,
                        resp.status(),
                        attempt
                    );
                }
                Err(e) => {
                    tracing::debug!("peer call {} failed: {} (attempt {})", url, e, attempt);
                }
            }
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }
}
