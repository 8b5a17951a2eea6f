//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for values the host
//! guard could never match: empty hosts, hosts carrying their own port,
//! IPv6 literals, malformed hostnames, names a client would send in a
//! different form (Unicode, percent-escapes, shorthand IPv4), and port
//! zero. Returns a list of [`ValidationError`] values with per-field
//! suggestions.

use url::Host;

use super::model::Config;
use crate::error::ValidationError;

/// Validate the configured hostname. Returns `Ok(())` or a human-readable error.
pub fn validate_host(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("host cannot be empty".into());
    }
    if host.starts_with('[') || host.matches(':').count() > 1 {
        return Err("IPv6 literal hosts are not supported".into());
    }
    if host.contains(':') {
        return Err("host must not include a port".into());
    }
    if !host.is_ascii() {
        return Err("host must be ASCII (use its punycode form)".into());
    }
    if host.contains('%') {
        return Err("host must not contain percent-escapes".into());
    }
    match Host::parse(host) {
        Ok(Host::Ipv6(_)) => Err("IPv6 literal hosts are not supported".into()),
        Ok(parsed) if parsed.to_string() != host.to_ascii_lowercase() => {
            Err(format!("'{host}' is not in canonical form"))
        }
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{host}' is not a valid hostname")),
    }
}

/// The form a client puts on the wire for `host`, when it differs from the
/// configured text. The guard compares raw header text, so only this form
/// can ever match.
#[must_use]
pub fn canonical_host(host: &str) -> Option<String> {
    match Host::parse(host) {
        Ok(Host::Ipv6(_)) | Err(_) => None,
        Ok(parsed) => {
            let canonical = parsed.to_string();
            (canonical != host.to_ascii_lowercase()).then_some(canonical)
        }
    }
}

/// Validate the configured port. Returns `Ok(())` or a human-readable error.
pub fn validate_port(port: u16) -> Result<(), String> {
    if port == 0 {
        Err("port must be between 1 and 65535".into())
    } else {
        Ok(())
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let route = &config.route;

    if let Err(msg) = validate_host(&route.host) {
        let suggestion = route
            .host
            .rsplit_once(':')
            .filter(|(h, p)| !h.contains(':') && !p.is_empty())
            .map(|(h, p)| format!("use host '{h}' and set route.port to {p}"))
            .or_else(|| canonical_host(&route.host).map(|c| format!("use host '{c}'")));
        errors.push(ValidationError {
            field: "route.host".into(),
            message: msg,
            suggestion,
        });
    }

    if let Err(msg) = validate_port(route.port) {
        errors.push(ValidationError {
            field: "route.port".into(),
            message: msg,
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    format!(
        "{} is valid\n  accepts Host: {host} or {host}:{port}",
        path,
        host = config.route.host,
        port = config.route.port,
    )
}
