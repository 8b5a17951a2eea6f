//! hostguard is a `Host` header validation gate for HTTP services.
//!
//! Every inbound request is checked against one configured host/port pair
//! before it reaches the application. Requests carrying `X-Forwarded-Host`,
//! lacking `Host`, or naming another host or port are answered with
//! `400 Bad Request`; everything else passes through untouched.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate,
//!   check, health).
//! - [`config`] -- Configuration model, file sources, and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- The host validation gate itself.
//! - [`server`] -- Axum server setup, shared application state, and
//!   graceful shutdown.
//!
//! # Embedding
//!
//! ```ignore
//! let loaded = hostguard::cmd::resolve_config(&route_args).await?;
//! let state = Arc::new(hostguard::server::AppState::new(loaded));
//! let router = hostguard::server::build_router(state, my_app, ServerLimits::default());
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Public items exist for the binary and the integration tests.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod server;
