//! `Host` header validation.
//!
//! Every request is checked against the single configured [`HostRoute`]
//! before it reaches the application. [`evaluate`] is the pure decision;
//! [`host_validation_guard`] is the axum middleware that either runs the
//! rest of the chain or answers `400 Bad Request`.
//!
//! Rules, in order:
//!
//! 1. Any `X-Forwarded-Host` header rejects the request. It is never parsed.
//! 2. A missing `Host` header rejects the request.
//! 3. The `Host` value is split on its last `:`. Anything that cannot be
//!    split unambiguously (duplicate headers, opaque bytes, empty host,
//!    IPv6 literals) counts as a host mismatch.
//! 4. The host part must equal the configured host, ignoring ASCII case.
//! 5. A port, when present, must be the configured port written in
//!    canonical decimal. A bare host is accepted.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::model::RouteConfig;
use crate::server::AppState;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// The host/port pair requests must address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRoute {
    host: String,
    port: u16,
    port_text: String,
}

impl HostRoute {
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_ascii_lowercase(),
            port,
            port_text: port.to_string(),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl From<&RouteConfig> for HostRoute {
    fn from(route: &RouteConfig) -> Self {
        Self::new(&route.host, route.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    ForwardedHostPresent,
    HostMissing,
    HostMismatch,
    PortMismatch,
}

impl RejectReason {
    pub const ALL: [Self; 4] = [
        Self::ForwardedHostPresent,
        Self::HostMissing,
        Self::HostMismatch,
        Self::PortMismatch,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ForwardedHostPresent => "forwarded-host-present",
            Self::HostMissing => "host-missing",
            Self::HostMismatch => "host-mismatch",
            Self::PortMismatch => "port-mismatch",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(RejectReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Split a `Host` value into host and optional port.
///
/// Returns `None` when the split is ambiguous: empty input, an empty host
/// part, a bracketed IPv6 literal, or more than one `:`.
#[must_use]
pub fn split_host(value: &str) -> Option<(&str, Option<&str>)> {
    if value.is_empty() || value.starts_with('[') {
        return None;
    }
    match value.rsplit_once(':') {
        Some((host, _)) if host.is_empty() || host.contains(':') => None,
        Some((host, port)) => Some((host, Some(port))),
        None => Some((value, None)),
    }
}

/// Decide whether a request with these headers may reach the application.
#[must_use]
pub fn evaluate(headers: &HeaderMap, route: &HostRoute) -> Decision {
    if headers.contains_key(X_FORWARDED_HOST) {
        return Decision::Reject(RejectReason::ForwardedHostPresent);
    }

    let mut values = headers.get_all(HOST).iter();
    let Some(value) = values.next() else {
        return Decision::Reject(RejectReason::HostMissing);
    };
    if values.next().is_some() {
        return Decision::Reject(RejectReason::HostMismatch);
    }

    let Some((host, port)) = value.to_str().ok().and_then(split_host) else {
        return Decision::Reject(RejectReason::HostMismatch);
    };

    if !host.eq_ignore_ascii_case(&route.host) {
        return Decision::Reject(RejectReason::HostMismatch);
    }

    match port {
        Some(port) if port != route.port_text => Decision::Reject(RejectReason::PortMismatch),
        _ => Decision::Allow,
    }
}

/// Middleware that rejects requests whose `Host` does not address the
/// configured route. Allowed requests pass through untouched.
pub async fn host_validation_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match evaluate(request.headers(), &state.route) {
        Decision::Allow => {
            state.stats.record_allowed();
            next.run(request).await
        }
        Decision::Reject(reason) => {
            state.stats.record_rejected(reason);
            let headers = request.headers();
            tracing::warn!(
                reason = %reason,
                method = %request.method(),
                path = %request.uri().path(),
                host = ?headers.get(HOST),
                forwarded_host = ?headers.get(X_FORWARDED_HOST),
                "request rejected"
            );
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const ROUTE_HOST: &str = "verification.example";
    const INVALID_HOST: &str = "invalid-server.local";

    fn route() -> HostRoute {
        HostRoute::new(ROUTE_HOST, 8080)
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn decide(pairs: &[(&'static str, &'static str)]) -> Decision {
        evaluate(&headers(pairs), &route())
    }

    #[test]
    fn bare_host_is_allowed() {
        assert_eq!(decide(&[("host", ROUTE_HOST)]), Decision::Allow);
    }

    #[test]
    fn host_with_configured_port_is_allowed() {
        assert_eq!(
            decide(&[("host", "verification.example:8080")]),
            Decision::Allow
        );
    }

    #[test]
    fn forwarded_host_is_rejected_even_with_valid_host() {
        assert_eq!(
            decide(&[("host", ROUTE_HOST), ("x-forwarded-host", INVALID_HOST)]),
            Decision::Reject(RejectReason::ForwardedHostPresent)
        );
        assert_eq!(
            decide(&[("host", ROUTE_HOST), ("x-forwarded-host", ROUTE_HOST)]),
            Decision::Reject(RejectReason::ForwardedHostPresent)
        );
    }

    #[test]
    fn empty_forwarded_host_is_rejected() {
        assert_eq!(
            decide(&[("host", ROUTE_HOST), ("x-forwarded-host", "")]),
            Decision::Reject(RejectReason::ForwardedHostPresent)
        );
    }

    #[test]
    fn forwarded_host_wins_over_missing_host() {
        assert_eq!(
            decide(&[("x-forwarded-host", ROUTE_HOST)]),
            Decision::Reject(RejectReason::ForwardedHostPresent)
        );
    }

    #[test]
    fn missing_host_is_rejected() {
        assert_eq!(decide(&[]), Decision::Reject(RejectReason::HostMissing));
    }

    #[test]
    fn other_host_is_rejected() {
        assert_eq!(
            decide(&[("host", INVALID_HOST)]),
            Decision::Reject(RejectReason::HostMismatch)
        );
        assert_eq!(
            decide(&[("host", "invalid-server.local:8080")]),
            Decision::Reject(RejectReason::HostMismatch)
        );
    }

    #[test]
    fn other_port_is_rejected() {
        assert_eq!(
            decide(&[("host", "verification.example:9988")]),
            Decision::Reject(RejectReason::PortMismatch)
        );
    }

    #[test]
    fn port_must_be_canonical() {
        for host in [
            "verification.example:",
            "verification.example:08080",
            "verification.example:+8080",
            "verification.example:8080 ",
        ] {
            let map = {
                let mut map = HeaderMap::new();
                map.insert(HOST, HeaderValue::from_str(host).unwrap());
                map
            };
            assert_eq!(
                evaluate(&map, &route()),
                Decision::Reject(RejectReason::PortMismatch),
                "{host:?}"
            );
        }
    }

    #[test]
    fn host_comparison_ignores_ascii_case() {
        assert_eq!(
            decide(&[("host", "Verification.EXAMPLE:8080")]),
            Decision::Allow
        );
        let upper = HostRoute::new("VERIFICATION.example", 8080);
        assert_eq!(upper.host(), ROUTE_HOST);
        assert_eq!(
            evaluate(&headers(&[("host", ROUTE_HOST)]), &upper),
            Decision::Allow
        );
    }

    #[test]
    fn ambiguous_hosts_fail_closed() {
        for host in [
            "",
            ":8080",
            "[::1]:8080",
            "verification.example:8080:8080",
            "::1",
        ] {
            let mut map = HeaderMap::new();
            map.insert(HOST, HeaderValue::from_str(host).unwrap());
            assert_eq!(
                evaluate(&map, &route()),
                Decision::Reject(RejectReason::HostMismatch),
                "{host:?}"
            );
        }
    }

    #[test]
    fn duplicate_host_headers_are_rejected() {
        assert_eq!(
            decide(&[("host", ROUTE_HOST), ("host", ROUTE_HOST)]),
            Decision::Reject(RejectReason::HostMismatch)
        );
    }

    #[test]
    fn opaque_host_bytes_are_rejected() {
        let mut map = HeaderMap::new();
        map.insert(
            HOST,
            HeaderValue::from_bytes(b"verification.example\xff").unwrap(),
        );
        assert_eq!(
            evaluate(&map, &route()),
            Decision::Reject(RejectReason::HostMismatch)
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let map = headers(&[("host", "verification.example:9988")]);
        let route = route();
        let first = evaluate(&map, &route);
        let second = evaluate(&map, &route);
        assert_eq!(first, second);
        assert!(!first.is_allowed());
    }

    #[test]
    fn split_host_cases() {
        assert_eq!(split_host("a.example"), Some(("a.example", None)));
        assert_eq!(split_host("a.example:80"), Some(("a.example", Some("80"))));
        assert_eq!(split_host("a.example:"), Some(("a.example", Some(""))));
        assert_eq!(split_host(""), None);
        assert_eq!(split_host(":80"), None);
        assert_eq!(split_host("[::1]"), None);
        assert_eq!(split_host("a:b:c"), None);
    }

    #[test]
    fn reasons_render_as_kebab_case() {
        let rendered: Vec<String> = RejectReason::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "forwarded-host-present",
                "host-missing",
                "host-mismatch",
                "port-mismatch"
            ]
        );
    }
}
