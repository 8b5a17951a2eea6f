//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides the file-based source (YAML, JSON, TOML, gated by feature flags),
//! the [`parse_config_str`] helper for format-specific deserialization, and
//! [`from_route_args`] for configs assembled from CLI flags alone.

pub mod file_source;

use std::path::Path;

use sha2::{Digest, Sha256};

use self::file_source::FileSource;
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::HostGuardError;

/// Config file names probed in the working directory, in order.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "hostguard.yaml",
    "hostguard.yml",
    "hostguard.json",
    "hostguard.toml",
];

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, HostGuardError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| HostGuardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| HostGuardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| HostGuardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(HostGuardError::UnsupportedFormat(other.to_string())),
    }
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Pick the file source matching the extension of `path`.
pub fn create_file_source(path: &Path) -> Result<Box<dyn ConfigSource>, HostGuardError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(FileSource::yaml(path.to_path_buf()))),

        #[cfg(feature = "json")]
        "json" => Ok(Box::new(FileSource::json(path.to_path_buf()))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(FileSource::toml(path.to_path_buf()))),

        other => Err(HostGuardError::UnsupportedFormat(other.to_string())),
    }
}

/// Build and validate a config from `--route-host` / `--route-port` alone.
///
/// The version digest covers the canonical `host:port` text so two
/// instances started with the same flags report the same version.
pub fn from_route_args(host: &str, port: u16) -> Result<(Config, ConfigVersion), HostGuardError> {
    let config = Config::new(host, port);
    if let Err(errors) = validate(&config) {
        return Err(HostGuardError::ConfigValidation { errors });
    }
    let hash = sha256_hex(format!("{host}:{port}").as_bytes());
    Ok((config, ConfigVersion::Hash(hash)))
}
