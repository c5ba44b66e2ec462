//! Rule presets and config-driven rule construction.

use crate::{DynamicCalls, RestrictedCacheGroup};
use vip_lint_core::{Config, ConfigError, RuleBox};

/// Returns the standard VIP minimum rule set with default settings.
#[must_use]
pub fn vip_minimum_rules() -> Vec<RuleBox> {
    vec![
        Box::new(DynamicCalls::new()),
        Box::new(RestrictedCacheGroup::new()),
    ]
}

/// Builds the standard rule set from a configuration.
///
/// Each rule reads its own options from the per-rule table when present
/// and falls back to its defaults otherwise. Enable/disable and severity
/// overrides are left to the engine, which consults the same config at
/// scan time.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any rule option is malformed, so that
/// bad configuration fails before any scanning begins.
pub fn rules_from_config(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    let dynamic_calls = match config.rule_config(crate::dynamic_calls::NAME) {
        Some(rule_config) => DynamicCalls::from_config(rule_config)?,
        None => DynamicCalls::new(),
    };
    let cache_group = match config.rule_config(crate::restricted_cache_group::NAME) {
        Some(rule_config) => RestrictedCacheGroup::from_config(rule_config)?,
        None => RestrictedCacheGroup::new(),
    };
    Ok(vec![Box::new(dynamic_calls), Box::new(cache_group)])
}
