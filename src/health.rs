//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, the allowed route with its config source metadata,
//! and cumulative allow/reject counters.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::host_validation::RejectReason;
use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub config: ConfigHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ConfigHealth {
    pub source: String,
    pub version: String,
    pub loaded_ago_seconds: u64,
    pub host: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub allowed: u64,
    pub rejected: u64,
    pub forwarded_host_present: u64,
    pub host_missing: u64,
    pub host_mismatch: u64,
    pub port_mismatch: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let loaded = &state.config;
    let stats = &state.stats;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        config: ConfigHealth {
            source: loaded.source_name.clone(),
            version: loaded.version.short().to_string(),
            loaded_ago_seconds: loaded.loaded_at.elapsed().as_secs(),
            host: state.route.host().to_string(),
            port: state.route.port(),
        },
        stats: StatsResponse {
            allowed: stats.allowed.load(Ordering::Relaxed),
            rejected: stats.total_rejected(),
            forwarded_host_present: stats.rejected(RejectReason::ForwardedHostPresent),
            host_missing: stats.rejected(RejectReason::HostMissing),
            host_mismatch: stats.rejected(RejectReason::HostMismatch),
            port_mismatch: stats.rejected(RejectReason::PortMismatch),
        },
    })
}
