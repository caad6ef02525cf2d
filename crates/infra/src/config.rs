//! Configuration loading and representation.
//!
//! Two inputs: [`ApplierConfig`] (how to apply, from code or the environment)
//! and [`SeedFile`] (what to apply, from a JSON document).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use forgeseed_catalog::{Attributes, InventorySpec, SeedSpec};
use forgeseed_core::{DomainError, TenantId};

use crate::context::{ExecutionArea, ExecutionContext};

pub const ENV_CALL_TIMEOUT_MS: &str = "FORGESEED_CALL_TIMEOUT_MS";
pub const ENV_REPROVISION: &str = "FORGESEED_REPROVISION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] DomainError),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// How the applier runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplierConfig {
    /// Timeout applied to every collaborator call; `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
    /// Re-run inventory and category attachment for entities that already exist.
    pub reprovision_existing: bool,
    pub area: ExecutionArea,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            call_timeout: Some(Duration::from_secs(30)),
            reprovision_existing: false,
            area: ExecutionArea::Admin,
        }
    }
}

impl ApplierConfig {
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_reprovision(mut self, reprovision: bool) -> Self {
        self.reprovision_existing = reprovision;
        self
    }

    pub fn with_area(mut self, area: ExecutionArea) -> Self {
        self.area = area;
        self
    }

    /// Defaults overridden by `FORGESEED_CALL_TIMEOUT_MS` (0 disables the
    /// timeout) and `FORGESEED_REPROVISION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CALL_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_CALL_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            config.call_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        if let Some(raw) = lookup(ENV_REPROVISION) {
            config.reprovision_existing =
                raw.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_REPROVISION,
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }

    /// Execution context for one run against `scope`.
    pub fn context(&self, scope: TenantId) -> ExecutionContext {
        let ctx = ExecutionContext::new(scope, self.area);
        match self.call_timeout {
            Some(timeout) => ctx.with_call_timeout(timeout),
            None => ctx,
        }
    }
}

/// Seed document as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    pub key: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub inventory: InventorySpec,
    #[serde(default)]
    pub category_names: Vec<String>,
}

impl SeedFile {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn into_spec(self) -> Result<SeedSpec, ConfigError> {
        Ok(SeedSpec::builder(self.key)
            .attributes(self.attributes)
            .inventory(self.inventory)
            .categories(self.category_names)
            .build()?)
    }
}
