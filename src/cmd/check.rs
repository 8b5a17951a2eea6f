//! `hostguard check`: evaluate a header set without starting a server.
//!
//! Builds a [`HeaderMap`] from repeated `-H 'Name: value'` flags, runs it
//! through the same [`evaluate`] the middleware uses, and prints the
//! decision. A rejection exits non-zero.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::cli::CheckArgs;
use crate::cmd::resolve_config;
use crate::error::HostGuardError;
use crate::middleware::host_validation::{evaluate, Decision, HostRoute};

pub async fn execute(args: CheckArgs) -> Result<(), HostGuardError> {
    let loaded = resolve_config(&args.route).await?;
    let route = HostRoute::from(&loaded.config.route);
    let headers = parse_headers(&args.headers)?;

    let decision = evaluate(&headers, &route);

    if args.json {
        println!("{}", json_report(decision, &route));
        return decision_result(decision, &route).map(|_| ());
    }

    // A rejection is printed once, by main, from the error
    let allowed = decision_result(decision, &route)?;
    println!("{allowed}");
    Ok(())
}

/// The allowed line for text output, or the rejection as an error.
pub fn decision_result(decision: Decision, route: &HostRoute) -> Result<String, HostGuardError> {
    let target = format!("{}:{}", route.host(), route.port());
    match decision {
        Decision::Allow => Ok(format!("\u{2713} allowed (route {target})")),
        Decision::Reject(reason) => Err(HostGuardError::Rejected {
            reason,
            route: target,
        }),
    }
}

#[must_use]
pub fn json_report(decision: Decision, route: &HostRoute) -> serde_json::Value {
    let (allowed, reason) = match decision {
        Decision::Allow => (true, None),
        Decision::Reject(reason) => (false, Some(reason.as_str())),
    };
    serde_json::json!({
        "allowed": allowed,
        "status": if allowed { 200 } else { 400 },
        "reason": reason,
        "route": {
            "host": route.host(),
            "port": route.port(),
        },
    })
}

/// Parse `Name: value` strings into a header map, keeping duplicates.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, HostGuardError> {
    let mut headers = HeaderMap::new();
    for input in raw {
        let invalid = |message: &str| HostGuardError::InvalidHeader {
            input: input.clone(),
            message: message.to_string(),
        };

        let (name, value) = input
            .split_once(':')
            .ok_or_else(|| invalid("expected 'Name: value'"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| invalid("invalid header name"))?;
        let value =
            HeaderValue::from_str(value.trim()).map_err(|_| invalid("invalid header value"))?;
        headers.append(name, value);
    }
    Ok(headers)
}
