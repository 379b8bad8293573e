//! Shardmaster API Handlers
//!
//! HTTP endpoints exposing the control plane. Handlers translate requests
//! into `ShardMaster` calls and map `StoreError` onto the wire convention
//! (invalid-argument with a diagnostic string).

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use sysinfo::System;

use super::protocol::{
    AckResponse, GdprDeleteRequest, JoinRequest, LeaveRequest, MasterStatsResponse, MoveRequest,
    QueryResponse, ENDPOINT_GDPR_DELETE, ENDPOINT_JOIN, ENDPOINT_LEAVE, ENDPOINT_MOVE,
    ENDPOINT_QUERY, ENDPOINT_STATS,
};
use super::service::ShardMaster;

pub async fn handle_join(
    Extension(master): Extension<Arc<ShardMaster>>,
    Json(req): Json<JoinRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match master.join(&req.server).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::warn!("join rejected: {}", e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_leave(
    Extension(master): Extension<Arc<ShardMaster>>,
    Json(req): Json<LeaveRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match master.leave(&req.servers).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::warn!("leave rejected: {}", e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_move(
    Extension(master): Extension<Arc<ShardMaster>>,
    Json(req): Json<MoveRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match master.move_shard(&req.server, req.shard).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::warn!("move rejected: {}", e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_query(
    Extension(master): Extension<Arc<ShardMaster>>,
) -> Json<QueryResponse> {
    Json(QueryResponse {
        config: master.query().await,
    })
}

pub async fn handle_gdpr_delete(
    Extension(master): Extension<Arc<ShardMaster>>,
    Json(req): Json<GdprDeleteRequest>,
) -> (StatusCode, Json<AckResponse>) {
    match master.gdpr_delete(&req.key).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::ok())),
        Err(e) => {
            tracing::warn!("gdpr delete rejected: {}", e);
            (e.status(), Json(AckResponse::rejected(e)))
        }
    }
}

pub async fn handle_stats(
    Extension(master): Extension<Arc<ShardMaster>>,
) -> Json<MasterStatsResponse> {
    let (servers, shards) = master.counts().await;
    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    // sysinfo returns bytes for memory values.
    Json(MasterStatsResponse {
        servers,
        shards,
        cpu_usage: sys.global_cpu_info().cpu_usage(),
        mem_used_mb: sys.used_memory() / (1024 * 1024),
        mem_total_mb: sys.total_memory() / (1024 * 1024),
    })
}

/// Assembles the control-plane router. Shared by the binary and the
/// integration tests.
pub fn master_router(master: Arc<ShardMaster>) -> Router {
    Router::new()
        .route(ENDPOINT_JOIN, post(handle_join))
        .route(ENDPOINT_LEAVE, post(handle_leave))
        .route(ENDPOINT_MOVE, post(handle_move))
        .route(ENDPOINT_QUERY, get(handle_query))
        .route(ENDPOINT_GDPR_DELETE, post(handle_gdpr_delete))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(master))
}
