//! Configuration lookup for the enablement switches.
//!
//! Layered configuration is loaded with the `config` crate from YAML files
//! and environment variables. The discovery pipeline only needs optional
//! boolean lookups by name, expressed by [`ConfigSource`].

use std::collections::HashMap;

use ::config::ConfigError;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ftpolicy.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "FTPOLICY_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "FTPOLICY";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "FTPOLICY_LOG";

/// Switches every non-fallback policy on or off.
pub const NON_FALLBACK_ENABLED_KEY: &str = "MP_Fault_Tolerance_NonFallback_Enabled";
/// Switches fault tolerance metrics on or off.
pub const METRICS_ENABLED_KEY: &str = "MP_Fault_Tolerance_Metrics_Enabled";

/// Optional boolean lookups by name.
pub trait ConfigSource: Send + Sync {
    /// Returns `Ok(None)` when the key is absent.
    fn lookup_bool(&self, key: &str) -> Result<Option<bool>, ConfigError>;
}

impl ConfigSource for ::config::Config {
    fn lookup_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        // Environment sources lowercase their keys.
        for candidate in [key.to_string(), key.to_lowercase()] {
            match self.get_bool(&candidate) {
                Ok(value) => return Ok(Some(value)),
                Err(ConfigError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// Fixed in-memory values.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    values: HashMap<String, bool>,
}

impl StaticConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: bool) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl ConfigSource for StaticConfig {
    fn lookup_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        Ok(self.values.get(key).copied())
    }
}

/// Load layered configuration from files and environment.
///
/// Sources, later overriding earlier:
/// 1. `ftpolicy.yaml` in the current directory (if it exists)
/// 2. File given by `path` (required if provided)
/// 3. File named by `CONFIG_ENV_VAR` (required if set)
/// 4. Environment variables with the `CONFIG_ENV_PREFIX` prefix
/// 5. Plain environment variables, so `MP_Fault_Tolerance_*` names work as-is
pub fn load(path: Option<&str>) -> Result<::config::Config, ConfigError> {
    use ::config::{Config as ConfigLib, Environment, File, FileFormat};

    let mut builder = ConfigLib::builder()
        .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

    if let Some(config_path) = path {
        builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
    }

    if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
        builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .add_source(Environment::default().try_parsing(true))
        .build()
}
