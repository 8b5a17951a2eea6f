//! `hostguard run`: start the gate server.
//!
//! Resolves the allowed route once, then serves the host guard in front of
//! a terminal handler with graceful shutdown. The route is never reloaded.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;

use crate::cli::RunArgs;
use crate::cmd::resolve_config;
use crate::error::HostGuardError;
use crate::logging;
use crate::server::{self, AppState, ServerLimits};

pub async fn execute(args: RunArgs) -> Result<(), HostGuardError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let loaded = resolve_config(&args.route).await?;
    let state = Arc::new(AppState::new(loaded));

    let limits = ServerLimits {
        timeout: Duration::from_millis(args.timeout),
        max_body: args.max_body,
    };
    let router = server::build_router(Arc::clone(&state), standalone_app(), limits);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        route_host = %state.route.host(),
        route_port = state.route.port(),
        config_source = %state.config.source_name,
        config_version = %state.config.version.short(),
        "hostguard started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("hostguard stopped");
    Ok(())
}

/// Application used when the gate runs on its own: every request that
/// passes the guard gets an empty `200 OK`.
#[must_use]
pub fn standalone_app() -> Router {
    Router::new().fallback(|| async { StatusCode::OK })
}
