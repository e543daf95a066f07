//! Configuration for the translator and its diagnostics.
//!
//! Settings are read from a TOML file and may be overridden by environment
//! variables prefixed with `HUBWIRE__`.

use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ConditionTable, FailureReason, ServiceErrorTranslator};
use crate::logging::{LogLevel, LoggingConfig};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] ::config::ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),

    /// The configuration could not be rendered as TOML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Maps one AMQP condition symbol to a failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConditionOverride {
    /// The condition symbol as sent on the wire, e.g. `com.microsoft:server-busy`.
    pub symbol: String,
    /// The reason failures with this condition classify as.
    pub reason: FailureReason,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HubwireConfig {
    /// Condition mappings that extend or replace the built-in table.
    ///
    /// When a symbol is listed more than once, the later entry wins.
    #[serde(default)]
    pub conditions: Vec<ConditionOverride>,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl HubwireConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Environment Variable Overrides
    ///
    /// Values can be overridden with `HUBWIRE__<SECTION>__<KEY>`, e.g.
    /// `HUBWIRE__LOGGING__LEVEL=debug`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, the path is not valid
    /// UTF-8, or the contents cannot be parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::new(path_str, FileFormat::Toml))
            .add_source(
                Environment::with_prefix("HUBWIRE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from TOML text, without environment overrides.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builds the condition table described by this configuration.
    ///
    /// Entries are applied in order, so a repeated symbol takes the reason of
    /// its last entry.
    pub fn condition_table(&self) -> ConditionTable {
        ConditionTable::with_overrides(
            self.conditions
                .iter()
                .map(|entry| (entry.symbol.as_str(), entry.reason)),
        )
    }

    /// Builds a translator using the configured condition table.
    pub fn translator(&self) -> ServiceErrorTranslator {
        ServiceErrorTranslator::with_conditions(self.condition_table())
    }

    /// Logging configuration derived from the `[logging]` section.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new()
            .with_level(self.logging.level)
            .with_timestamps(self.logging.timestamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amqp::AmqpCondition;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HubwireConfig::from_toml_str("").unwrap();
        assert!(config.conditions.is_empty());
        assert!(matches!(config.logging.level, LogLevel::Info));
        assert!(config.logging.timestamps);
    }

    #[test]
    fn test_parse_condition_overrides() {
        let toml_str = r#"
            [[conditions]]
            symbol = "vendor:throttled"
            reason = "service_busy"

            [[conditions]]
            symbol = "amqp:internal-error"
            reason = "general_error"

            [logging]
            level = "debug"
            timestamps = false
        "#;

        let config = HubwireConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.conditions.len(), 2);
        assert_eq!(config.conditions[0].symbol, "vendor:throttled");
        assert_eq!(config.conditions[0].reason, FailureReason::ServiceBusy);
        assert!(matches!(config.logging.level, LogLevel::Debug));
        assert!(!config.logging.timestamps);

        let table = config.condition_table();
        assert_eq!(
            table.reason_for(&AmqpCondition::from_symbol("vendor:throttled")),
            Some(FailureReason::ServiceBusy)
        );
        assert_eq!(
            table.reason_for(&AmqpCondition::InternalError),
            Some(FailureReason::GeneralError)
        );
    }

    #[test]
    fn test_repeated_symbol_uses_last_entry() {
        let toml_str = r#"
            [[conditions]]
            symbol = "vendor:throttled"
            reason = "service_busy"

            [[conditions]]
            symbol = "vendor:throttled"
            reason = "quota_exceeded"
        "#;

        let config = HubwireConfig::from_toml_str(toml_str).unwrap();
        let table = config.condition_table();
        assert_eq!(table.override_count(), 1);
        assert_eq!(
            table.reason_for(&AmqpCondition::from_symbol("vendor:throttled")),
            Some(FailureReason::QuotaExceeded)
        );
    }

    #[test]
    fn test_unknown_reason_is_rejected() {
        let toml_str = r#"
            [[conditions]]
            symbol = "vendor:throttled"
            reason = "on_fire"
        "#;

        let result = HubwireConfig::from_toml_str(toml_str);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = HubwireConfig::load("/definitely/not/here/hubwire.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let config = HubwireConfig {
            conditions: vec![ConditionOverride {
                symbol: "vendor:throttled".to_string(),
                reason: FailureReason::QuotaExceeded,
            }],
            logging: LoggingSection::default(),
        };

        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("vendor:throttled"));
        assert!(rendered.contains("quota_exceeded"));

        let parsed = HubwireConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed.conditions, config.conditions);
    }
}
