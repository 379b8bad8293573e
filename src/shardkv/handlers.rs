//! Shardkv API Handlers
//!
//! HTTP endpoints exposing the data plane. Handlers translate requests into
//! `ShardKv` calls and map `StoreError` onto the wire convention.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use sysinfo::System;

use super::memory::ShardKv;
use super::protocol::{
    AckResponse, AppendRequest, DeleteRequest, GetResponse, KvStatsResponse, PutRequest,
    ENDPOINT_APPEND, ENDPOINT_DELETE, ENDPOINT_GET, ENDPOINT_PUT, ENDPOINT_STATS,
};

pub async fn handle_get(
    Extension(kv): Extension<Arc<ShardKv>>,
    Path(key): Path<String>,
) -> (StatusCode, Json<GetResponse>) {
    match kv.get(&key).await {
        Ok(data) => (
            StatusCode::OK,
            Json(GetResponse {
                data: Some(data),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::debug!("get {} rejected: {}", key, e);
            (
                e.status(),
                Json(GetResponse {
                    data: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn handle_put(
    Extension(kv): Extension<Arc<ShardKv>>,
    Json(req): Json<PutRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match kv.put(&req.key, &req.data, &req.user).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::debug!("put {} rejected: {}", req.key, e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_append(
    Extension(kv): Extension<Arc<ShardKv>>,
    Json(req): Json<AppendRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match kv.append(&req.key, &req.data).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::debug!("append {} rejected: {}", req.key, e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_delete(
    Extension(kv): Extension<Arc<ShardKv>>,
    Json(req): Json<DeleteRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match kv.delete(&req.key).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::debug!("delete {} rejected: {}", req.key, e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_stats(Extension(kv): Extension<Arc<ShardKv>>) -> Json<KvStatsResponse> {
    let (entries, shards_owned, tombstones) = kv.local_counts().await;
    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    // sysinfo returns bytes for memory values.
    Json(KvStatsResponse {
        address: kv.address.clone(),
        entries,
        shards_owned,
        tombstones,
        cpu_usage: sys.global_cpu_info().cpu_usage(),
        mem_used_mb: sys.used_memory() / (1024 * 1024),
        mem_total_mb: sys.total_memory() / (1024 * 1024),
    })
}

/// Assembles the data-plane router. Shared by the binary and the
/// integration tests.
pub fn kv_router(kv: Arc<ShardKv>) -> Router {
    Router::new()
        .route(&format!("{}/:key", ENDPOINT_GET), get(handle_get))
        .route(ENDPOINT_PUT, post(handle_put))
        .route(ENDPOINT_APPEND, post(handle_append))
        .route(ENDPOINT_DELETE, post(handle_delete))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(kv))
}
