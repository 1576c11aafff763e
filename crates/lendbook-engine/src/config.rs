//! Ledger configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`LedgerConfig`].
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the ledger cannot run with.
    #[error("Invalid config field {field}: {message}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Top-level configuration for a ledger installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path of the redb database file.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Tenure applied to EMI loans created without one.
    #[serde(default = "default_tenure_months")]
    pub default_tenure_months: u32,

    /// Fraction of principal used as the flat monthly amount when none is set.
    #[serde(default = "default_flat_rate")]
    pub flat_default_rate: Decimal,

    /// Consecutive missed installments that make a loan a defaulter.
    #[serde(default = "default_streak_threshold")]
    pub defaulter_streak_threshold: u32,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_storage_path() -> String {
    "./data/lendbook.redb".to_string()
}

fn default_tenure_months() -> u32 {
    12
}

fn default_flat_rate() -> Decimal {
    Decimal::new(10, 2)
}

fn default_streak_threshold() -> u32 {
    2
}

fn default_log_filter() -> String {
    "warn,lendbook=info".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            default_tenure_months: default_tenure_months(),
            flat_default_rate: default_flat_rate(),
            defaulter_streak_threshold: default_streak_threshold(),
            log_filter: default_log_filter(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would produce empty schedules or flag every loan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_tenure_months == 0 {
            return Err(ConfigError::Validation {
                field: "default_tenure_months",
                message: "must be at least 1".to_string(),
            });
        }
        if self.flat_default_rate <= Decimal::ZERO {
            return Err(ConfigError::Validation {
                field: "flat_default_rate",
                message: format!("must be positive, got {}", self.flat_default_rate),
            });
        }
        if self.defaulter_streak_threshold == 0 {
            return Err(ConfigError::Validation {
                field: "defaulter_streak_threshold",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Schedule generation knobs.
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            default_tenure_months: self.default_tenure_months,
            flat_default_rate: self.flat_default_rate,
        }
    }

    /// Defaulter classification knobs.
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            streak_threshold: self.defaulter_streak_threshold,
        }
    }
}

/// Parameters of the schedule generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleConfig {
    /// Tenure used when an EMI loan has none.
    pub default_tenure_months: u32,
    /// Flat monthly amount as a fraction of principal.
    pub flat_default_rate: Decimal,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        LedgerConfig::default().schedule()
    }
}

/// Parameters of the defaulter classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Minimum run of consecutive overdue installments.
    pub streak_threshold: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        LedgerConfig::default().classifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.storage_path, "./data/lendbook.redb");
        assert_eq!(config.default_tenure_months, 12);
        assert_eq!(config.flat_default_rate, dec!(0.10));
        assert_eq!(config.defaulter_streak_threshold, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LedgerConfig::from_toml(
            r#"
            storage_path = "/var/lib/lendbook/book.redb"
            defaulter_streak_threshold = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_path, "/var/lib/lendbook/book.redb");
        assert_eq!(config.classifier().streak_threshold, 3);
        assert_eq!(config.schedule().default_tenure_months, 12);
    }

    #[test]
    fn test_rate_from_string() {
        let config = LedgerConfig::from_toml(r#"flat_default_rate = "0.05""#).unwrap();
        assert_eq!(config.flat_default_rate, dec!(0.05));
    }

    #[test]
    fn test_invalid_toml() {
        let err = LedgerConfig::from_toml("default_tenure_months = \"twelve\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_degenerate_values() {
        for (toml, field) in [
            ("default_tenure_months = 0", "default_tenure_months"),
            ("defaulter_streak_threshold = 0", "defaulter_streak_threshold"),
            (r#"flat_default_rate = "0""#, "flat_default_rate"),
        ] {
            match LedgerConfig::from_toml(toml).unwrap_err() {
                ConfigError::Validation { field: f, .. } => assert_eq!(f, field),
                other => panic!("unexpected error for {toml}: {other}"),
            }
        }
        assert!(LedgerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_missing_file() {
        let err = LedgerConfig::from_file("/nonexistent/lendbook.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
