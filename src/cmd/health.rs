//! `hostguard health`: check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the response as formatted text or raw JSON.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::StatusCode;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::HostGuardError;
use crate::health::HealthResponse;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

fn request_error<E>(e: E) -> HostGuardError
where
    E: std::error::Error + Send + Sync + 'static,
{
    HostGuardError::HttpRequest {
        source: Box::new(e),
    }
}

/// `GET {base}/health`, returning the status and the collected body.
async fn probe(base: &str) -> Result<(StatusCode, Bytes), HostGuardError> {
    let uri: hyper::Uri = format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| HostGuardError::UriParse {
            source: Box::new(e),
        })?;

    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let req = hyper::Request::get(uri)
        .body(Full::new(Bytes::new()))
        .map_err(request_error)?;

    let response = tokio::time::timeout(PROBE_TIMEOUT, client.request(req))
        .await
        .map_err(|_| HostGuardError::HttpRequest {
            source: format!("health check timed out after {}s", PROBE_TIMEOUT.as_secs()).into(),
        })?
        .map_err(request_error)?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(request_error)?
        .to_bytes();
    Ok((status, body))
}

pub async fn execute(args: HealthArgs) -> Result<(), HostGuardError> {
    let (status, body) = probe(&args.url).await?;

    if !status.is_success() {
        return Err(HostGuardError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let body_str = String::from_utf8_lossy(&body);
    match serde_json::from_str::<HealthResponse>(&body_str) {
        Ok(health) => {
            let uptime = format_uptime(health.uptime_seconds);
            println!("\u{2713} hostguard is healthy ({})", args.url);
            println!("  uptime:         {uptime}");
            println!("  config source:  {}", health.config.source);
            println!(
                "  config version: {} (loaded {}s ago)",
                health.config.version, health.config.loaded_ago_seconds
            );
            println!(
                "  route:          {}:{}",
                health.config.host, health.config.port
            );
            println!(
                "  requests:       {} allowed, {} rejected",
                health.stats.allowed, health.stats.rejected
            );
            if health.stats.rejected > 0 {
                println!(
                    "  rejections:     {} forwarded-host-present, {} host-missing, \
                     {} host-mismatch, {} port-mismatch",
                    health.stats.forwarded_host_present,
                    health.stats.host_missing,
                    health.stats.host_mismatch,
                    health.stats.port_mismatch
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::format_uptime;

    #[test]
    fn uptime_uses_largest_unit() {
        assert_eq!(format_uptime(42), "42s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3_725), "1h 2m 5s");
    }
}
