//! Engine configuration.

use roster_core::{Error, Result, SortOrder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a `SyncEngine`.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use roster_engine::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::from_json(r#"{ "fetch_timeout_ms": 2500, "autoload": false }"#).unwrap();
/// assert_eq!(config.fetch_timeout, Duration::from_millis(2500));
/// assert!(!config.autoload);
/// assert_eq!(config.persist_limit, 100);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on a single page fetch.
    #[serde(rename = "fetch_timeout_ms", with = "millis")]
    pub fetch_timeout: Duration,
    /// Number of leading records saved on suspend.
    pub persist_limit: usize,
    /// Fetch the first page on cold start when nothing was persisted.
    pub autoload: bool,
    /// Sort order of the initial view.
    pub initial_sort: SortOrder,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            persist_limit: 100,
            autoload: true,
            initial_sort: SortOrder::Descending,
        }
    }
}

impl EngineConfig {
    /// Starts a builder from the defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout.is_zero() {
            return Err(Error::invalid_config("fetch_timeout must be positive"));
        }
        Ok(())
    }
}

/// Builder for `EngineConfig`.
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    pub fn persist_limit(mut self, limit: usize) -> Self {
        self.config.persist_limit = limit;
        self
    }

    pub fn autoload(mut self, autoload: bool) -> Self {
        self.config.autoload = autoload;
        self
    }

    pub fn initial_sort(mut self, sort: SortOrder) -> Self {
        self.config.initial_sort = sort;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
