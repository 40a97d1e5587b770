//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Movement coordinator configuration.
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

/// Movement coordinator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorConfig {
    /// How many times a conflicted operation is retried before it is
    /// surfaced to the caller.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    /// Maximum accepted movement description length, in characters.
    #[serde(default = "default_max_description_len")]
    pub max_description_len: usize,
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_max_description_len() -> usize {
    255
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            max_description_len: default_max_description_len(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SALDO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_defaults() {
        let cfg = CoordinatorConfig::default();
        assert_eq!(cfg.max_conflict_retries, 3);
        assert_eq!(cfg.max_description_len, 255);
    }

    #[test]
    fn test_app_config_deserializes_with_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.coordinator.max_conflict_retries, 3);
    }
}
