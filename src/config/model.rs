//! Serde data structures for the hostguard configuration file.
//!
//! Contains [`Config`] (the root) and [`RouteConfig`], the host/port pair
//! every request's `Host` header is checked against. All types derive
//! `Serialize` and `Deserialize` with `deny_unknown_fields` for strict
//! parsing.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub route: RouteConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub host: String,

    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl Config {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            route: RouteConfig {
                host: host.into(),
                port,
            },
        }
    }
}

/// Accepts `port: 8080` as well as `port: "8080"`.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Number(u16),
        Text(String),
    }

    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => {
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(D::Error::custom(format!("'{text}' is not a valid port")));
            }
            text.parse()
                .map_err(|_| D::Error::custom(format!("'{text}' is not a valid port")))
        }
    }
}
