//! Configuration loading and validation.
//!
//! Defines the [`ConfigSource`] trait for config backends and the
//! [`ConfigVersion`] digest reported by `/health`. The configuration is read
//! once at startup; the allowed route never changes while the process runs.
//! Submodules provide the data model, validation logic, and the file-based
//! source implementations.

pub mod model;
pub mod sources;
pub mod validation;

use async_trait::async_trait;

use crate::error::HostGuardError;
use model::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl ConfigVersion {
    /// First eight hex digits of the digest, for display.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

// async_trait keeps ConfigSource usable as Box<dyn ConfigSource>;
// native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<(Config, ConfigVersion), HostGuardError>;
}
