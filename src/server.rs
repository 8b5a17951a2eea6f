//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the allowed
//! route, config metadata, stats, and uptime), [`build_router`] for
//! wrapping an application router with the host guard and the common
//! middleware layers, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::model::Config;
use crate::config::ConfigVersion;
use crate::health::health_handler;
use crate::middleware::host_validation::{host_validation_guard, HostRoute, RejectReason};

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub version: ConfigVersion,
    pub source_name: String,
    pub loaded_at: Instant,
}

/// Per-decision counters. Never read on the request path.
#[derive(Debug)]
pub struct Stats {
    pub allowed: AtomicU64,
    pub forwarded_host_present: AtomicU64,
    pub host_missing: AtomicU64,
    pub host_mismatch: AtomicU64,
    pub port_mismatch: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allowed: AtomicU64::new(0),
            forwarded_host_present: AtomicU64::new(0),
            host_missing: AtomicU64::new(0),
            host_mismatch: AtomicU64::new(0),
            port_mismatch: AtomicU64::new(0),
        }
    }

    pub fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self, reason: RejectReason) {
        self.counter(reason).fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn rejected(&self, reason: RejectReason) -> u64 {
        self.counter(reason).load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_rejected(&self) -> u64 {
        RejectReason::ALL.iter().map(|r| self.rejected(*r)).sum()
    }

    fn counter(&self, reason: RejectReason) -> &AtomicU64 {
        match reason {
            RejectReason::ForwardedHostPresent => &self.forwarded_host_present,
            RejectReason::HostMissing => &self.host_missing,
            RejectReason::HostMismatch => &self.host_mismatch,
            RejectReason::PortMismatch => &self.port_mismatch,
        }
    }
}

pub struct AppState {
    pub route: HostRoute,
    pub config: LoadedConfig,
    pub start_time: Instant,
    pub stats: Stats,
}

impl AppState {
    #[must_use]
    pub fn new(config: LoadedConfig) -> Self {
        Self {
            route: HostRoute::from(&config.config.route),
            config,
            start_time: Instant::now(),
            stats: Stats::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerLimits {
    pub timeout: Duration,
    pub max_body: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            max_body: 1_048_576,
        }
    }
}

/// Put the host guard in front of every route and the fallback of `app`.
///
/// `/health` is mounted beside the guarded routes, so probes addressed by
/// pod IP still succeed. `app` must not define `/health` itself.
pub fn build_router(state: Arc<AppState>, app: Router, limits: ServerLimits) -> Router {
    app.layer(axum::middleware::from_fn_with_state(
        Arc::clone(&state),
        host_validation_guard,
    ))
    .route("/health", get(health_handler).with_state(state))
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(limits.max_body))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                limits.timeout,
            )),
    )
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
