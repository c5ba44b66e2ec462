//! Scan engine: owns the per-file scan lifecycle and rule dispatch.

use crate::config::{Config, ConfigError};
use crate::rule::{Rule, RuleBox, RuleFault, RuleScan};
use crate::token::TokenStream;
use crate::types::{Severity, Violation};

use std::collections::HashSet;
use tracing::{debug, warn};

/// A rule fault recorded during a scan.
///
/// Surfaced as a diagnostic distinct from a [`Violation`]: it reports a
/// defect in a rule, scoped to one token, not a finding about the
/// scanned code.
#[derive(Debug)]
pub struct ScanFault {
    /// Name of the rule that faulted.
    pub rule: String,
    /// Token index being processed when the fault occurred.
    pub position: usize,
    /// The underlying fault.
    pub fault: RuleFault,
}

impl std::fmt::Display for ScanFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule `{}` faulted at token {}: {}",
            self.rule, self.position, self.fault
        )
    }
}

/// Result of scanning one token stream.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// All violations found, ordered by position.
    pub violations: Vec<Violation>,
    /// Rule faults recorded along the way.
    pub faults: Vec<ScanFault>,
    /// Number of token positions visited (shorter than the stream if the
    /// scan was cancelled).
    pub tokens_scanned: usize,
}

impl ScanReport {
    /// Returns true if there are any error-level violations.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations as (errors, warnings).
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        (errors, self.violations.len() - errors)
    }
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
}

impl EngineBuilder {
    /// Creates a new builder with no rules registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule. Registration order is dispatch order.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Registers a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the configuration (per-rule enable/disable and severity
    /// overrides).
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateRule`] if two registered rules
    /// share a name.
    pub fn build(self) -> Result<Engine, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.name()) {
                return Err(ConfigError::DuplicateRule {
                    name: rule.name().to_string(),
                });
            }
        }
        Ok(Engine {
            rules: self.rules,
            config: self.config.unwrap_or_default(),
        })
    }
}

/// The scan engine.
///
/// Holds only registered rules and configuration, both immutable after
/// [`EngineBuilder::build`]; every call to [`Engine::scan`] creates a
/// fresh scan context (per-rule state and an empty violation list), so
/// the same engine can scan independent files concurrently from multiple
/// threads without any shared mutable state.
#[derive(Debug)]
pub struct Engine {
    rules: Vec<RuleBox>,
    config: Config,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Scans one token stream and returns the ordered violation list.
    #[must_use]
    pub fn scan(&self, stream: &TokenStream) -> ScanReport {
        self.scan_cancellable(stream, || false)
    }

    /// Scans one token stream, checking `should_cancel` between tokens.
    ///
    /// Cancellation is cooperative and coarse: once the callback returns
    /// true no further token is dispatched, and violations already
    /// emitted are returned as-is, never retracted.
    #[must_use]
    pub fn scan_cancellable(
        &self,
        stream: &TokenStream,
        mut should_cancel: impl FnMut() -> bool,
    ) -> ScanReport {
        debug!(tokens = stream.len(), "starting scan");

        struct ActiveScan<'a> {
            rule: &'a dyn Rule,
            state: Box<dyn RuleScan + 'a>,
        }

        // Fresh per-scan state for every enabled rule, registration order.
        let mut scans: Vec<ActiveScan<'_>> = self
            .rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!(rule = rule.name(), "skipping disabled rule");
                }
                enabled
            })
            .map(|rule| ActiveScan {
                rule: rule.as_ref(),
                state: rule.begin_scan(),
            })
            .collect();

        let mut report = ScanReport::default();

        for at in 0..stream.len() {
            if should_cancel() {
                debug!(position = at, "scan cancelled");
                break;
            }
            let Some(token) = stream.get(at) else {
                break;
            };
            for scan in &mut scans {
                if !scan.rule.interests().contains(token.kind) {
                    continue;
                }
                match scan.state.process(stream, at) {
                    Ok(violations) => {
                        let overridden = self.config.rule_severity(scan.rule.name());
                        report
                            .violations
                            .extend(violations.into_iter().map(|mut v| {
                                if let Some(severity) = overridden {
                                    v.severity = severity;
                                }
                                v
                            }));
                    }
                    Err(fault) => {
                        warn!(
                            rule = scan.rule.name(),
                            position = at,
                            %fault,
                            "rule faulted; continuing scan"
                        );
                        report.faults.push(ScanFault {
                            rule: scan.rule.name().to_string(),
                            position: at,
                            fault,
                        });
                    }
                }
            }
            report.tokens_scanned = at + 1;
        }

        // Stable sort: emission order (token order, then registration
        // order) is preserved within equal positions.
        report.violations.sort_by_key(|v| v.position);

        debug!(
            violations = report.violations.len(),
            faults = report.faults.len(),
            "scan complete"
        );
        report
    }
}
