use super::error::ApplicationError;
use crate::domain::fetch_config::{FetchConfig, PartialFetchConfig};
use std::path::Path;

/// Three-tier settings: caller override, then environment, then defaults.
#[derive(Clone, Debug, Default)]
pub struct ConfigResolver {
    environment: PartialFetchConfig,
    defaults: FetchConfig,
}

impl ConfigResolver {
    pub fn new(environment: PartialFetchConfig) -> Self {
        Self {
            environment,
            defaults: FetchConfig::default(),
        }
    }

    /// Snapshots the process environment; later changes are not observed.
    pub fn from_env() -> Self {
        Self::new(PartialFetchConfig::from_env())
    }

    pub fn resolve(&self, override_config: Option<&PartialFetchConfig>) -> FetchConfig {
        let layered = match override_config {
            Some(partial) => partial.clone().over(self.environment.clone()),
            None => self.environment.clone(),
        };
        layered.apply_to(self.defaults.clone())
    }
}

/// Reads a JSON override file, e.g. `{"timeout_seconds": 10, "cache_enabled": true}`.
pub fn load_override_file(path: &Path) -> Result<PartialFetchConfig, ApplicationError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ApplicationError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        ApplicationError::ConfigurationError(format!("invalid config {}: {}", path.display(), e))
    })
}
