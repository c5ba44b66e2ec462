//! Configuration types for vip-lint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or constructing rules.
///
/// All of these fail fast, before any scanning begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file.
    #[error("failed to read config file {path}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML content.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A rule option was present but malformed.
    #[error("rule `{rule}`: invalid option `{option}`: {message}")]
    InvalidOption {
        /// Rule name the option belongs to.
        rule: &'static str,
        /// Option key.
        option: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A configured name set was empty; the rule would be a no-op.
    #[error("rule `{rule}`: option `{option}` must not be empty")]
    EmptyNameSet {
        /// Rule name the option belongs to.
        rule: &'static str,
        /// Option key holding the empty set.
        option: &'static str,
    },

    /// A 1-based argument position of zero was configured.
    #[error("rule `{rule}`: argument position is 1-based and must be >= 1")]
    InvalidPosition {
        /// Rule name carrying the bad position.
        rule: &'static str,
    },

    /// Two registered rules share a name; dispatch would be ambiguous.
    #[error("duplicate rule registered: `{name}`")]
    DuplicateRule {
        /// The duplicated rule name.
        name: String,
    },
}

/// Top-level configuration for the scan engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Unconfigured rules are enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule, if any.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration table for a rule, if present.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets an option value, distinguishing "absent" from "malformed".
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the key is present but
    /// does not deserialize as `T`.
    pub fn require_option<T: serde::de::DeserializeOwned>(
        &self,
        rule: &'static str,
        key: &'static str,
    ) -> Result<Option<T>, ConfigError> {
        match self.options.get(key) {
            None => Ok(None),
            Some(value) => value
                .clone()
                .try_into()
                .map(Some)
                .map_err(|e| ConfigError::InvalidOption {
                    rule,
                    option: key,
                    message: e.to_string(),
                }),
        }
    }
}
