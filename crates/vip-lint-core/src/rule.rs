//! Rule contract: the single narrow interface every analysis rule implements.

use crate::token::{TokenKindSet, TokenStream};
use crate::types::{Severity, Violation};
use thiserror::Error;

/// Internal fault raised by a rule while processing one token.
///
/// Distinct from a [`Violation`]: a fault is a defect in the rule, not a
/// finding about the scanned code. The engine catches faults at per-rule,
/// per-token granularity and keeps scanning.
#[derive(Debug, Error)]
pub enum RuleFault {
    /// A rule asked for a token index past the stream bounds in a way it
    /// did not expect.
    #[error("token index {at} out of bounds for stream of length {len}")]
    OutOfBounds {
        /// The offending index.
        at: usize,
        /// Length of the stream being scanned.
        len: usize,
    },

    /// Any other internal rule defect.
    #[error("{0}")]
    Internal(String),
}

/// A pluggable unit of analysis.
///
/// A rule declares its identity, the token kinds it wants to be invoked
/// for, and how to create its private per-scan state. The rule value
/// itself holds only configuration (restricted-name sets, target lists)
/// and is shareable across threads; all mutable state lives in the
/// [`RuleScan`] created per file, so nothing can leak between files or
/// between concurrent scans.
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "vip-dynamic-calls").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "VIP001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Returns the set of token kinds this rule wants to process.
    fn interests(&self) -> TokenKindSet;

    /// Creates fresh per-scan state for one file.
    ///
    /// Called by the engine at scan start; the returned state is dropped
    /// at scan end and never reused.
    fn begin_scan(&self) -> Box<dyn RuleScan + '_>;
}

impl core::fmt::Debug for dyn Rule + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("code", &self.code())
            .finish()
    }
}

/// Type alias for boxed [`Rule`] trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Per-scan state of one rule, driven token by token.
pub trait RuleScan {
    /// Processes the token at index `at`.
    ///
    /// The stream is read-only; the only outward effect is the returned
    /// violations.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleFault`] on an internal defect; the engine records
    /// it and continues with other rules and later tokens.
    fn process(&mut self, stream: &TokenStream, at: usize) -> Result<Vec<Violation>, RuleFault>;
}
