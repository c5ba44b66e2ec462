//! Rule to forbid dynamic calls of restricted functions through variables.
//!
//! Flags the pattern:
//!
//! ```php
//! $func = 'func_num_args';
//! $func();
//! ```
//!
//! The rule tracks the last string literal assigned to each variable name
//! in a single forward pass. The approximation is deliberately unsound:
//! it binds only on the exact shape `$var = 'literal'`, has no awareness
//! of conditionals, loops, or function boundaries, and a variable it
//! never saw bound is silently ignored. A missed binding can only
//! produce a false negative, never a false positive.
//!
//! # Configuration
//!
//! - `blacklist`: list of function names that must not be called
//!   dynamically (default: the PHP 7.1 incompatible set below)

use std::collections::{HashMap, HashSet};
use tracing::trace;
use vip_lint_core::{
    ConfigError, Cursor, Rule, RuleConfig, RuleFault, RuleScan, Severity, TokenKind,
    TokenKindSet, TokenStream, Violation,
};

/// Rule code for vip-dynamic-calls.
pub const CODE: &str = "VIP001";

/// Rule name for vip-dynamic-calls.
pub const NAME: &str = "vip-dynamic-calls";

const MESSAGE: &str = "Dynamic calling is not recommended in the case of %s.";

/// Upper bound on the token window searched for the assigned literal.
/// Keeps per-occurrence cost constant on pathological whitespace runs.
const ASSIGNMENT_LOOKAHEAD: usize = 16;

/// Functions that should not be called dynamically.
const DEFAULT_BLACKLIST: &[&str] = &[
    "assert",
    "compact",
    "extract",
    "func_get_args",
    "func_get_arg",
    "func_num_args",
    "get_defined_vars",
    "mb_parse_str",
    "parse_str",
];

/// Forbids dynamically calling blacklisted functions through variables
/// bound to string literals.
#[derive(Debug, Clone)]
pub struct DynamicCalls {
    blacklist: HashSet<String>,
    severity: Severity,
}

impl Default for DynamicCalls {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicCalls {
    /// Creates the rule with the default blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blacklist: DEFAULT_BLACKLIST.iter().map(ToString::to_string).collect(),
            severity: Severity::Error,
        }
    }

    /// Creates the rule with a custom blacklist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyNameSet`] if `names` is empty.
    pub fn with_blacklist<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blacklist: HashSet<String> = names.into_iter().map(Into::into).collect();
        if blacklist.is_empty() {
            return Err(ConfigError::EmptyNameSet {
                rule: NAME,
                option: "blacklist",
            });
        }
        Ok(Self {
            blacklist,
            severity: Severity::Error,
        })
    }

    /// Creates the rule from a per-rule configuration table.
    ///
    /// # Errors
    ///
    /// Returns an error if the `blacklist` option is present but
    /// malformed or empty.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        match config.require_option::<Vec<String>>(NAME, "blacklist")? {
            Some(names) => Self::with_blacklist(names),
            None => Ok(Self::new()),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for DynamicCalls {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids dynamic calls of restricted functions via variables"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> TokenKindSet {
        TokenKindSet::single(TokenKind::Variable)
    }

    fn begin_scan(&self) -> Box<dyn RuleScan + '_> {
        Box::new(DynamicCallsScan {
            rule: self,
            bindings: HashMap::new(),
        })
    }
}

/// The tracked association of a variable name with its most recently
/// assigned literal value.
#[derive(Debug)]
struct Binding {
    value: String,
    defined_at: usize,
}

/// Per-scan state: one live binding per variable name, last write wins.
struct DynamicCallsScan<'a> {
    rule: &'a DynamicCalls,
    bindings: HashMap<String, Binding>,
}

impl RuleScan for DynamicCallsScan<'_> {
    fn process(&mut self, stream: &TokenStream, at: usize) -> Result<Vec<Violation>, RuleFault> {
        let token = stream.get(at).ok_or(RuleFault::OutOfBounds {
            at,
            len: stream.len(),
        })?;

        // The call-shape check runs first so it judges the binding state
        // as it stood before this occurrence: a rebind at this very
        // token must not influence the check of its own trigger.
        let violation = self.check_call_shape(stream, at, &token.text);
        self.collect_assignment(stream, at, &token.text);

        Ok(violation.into_iter().collect())
    }
}

impl DynamicCallsScan<'_> {
    /// Check (b): is this occurrence a call of a blacklisted binding?
    fn check_call_shape(&self, stream: &TokenStream, at: usize, name: &str) -> Option<Violation> {
        let cursor = Cursor::new(stream);
        let open = cursor.next_non_whitespace(at + 1)?;
        if stream.get(open)?.kind != TokenKind::OpenParen {
            return None;
        }

        // Absence of evidence is not evidence of violation: a variable
        // never bound here is silently ignored.
        let binding = self.bindings.get(name)?;
        if !self.rule.blacklist.contains(&binding.value) {
            return None;
        }

        let open_token = stream.get(open)?;
        Some(
            Violation::new(
                CODE,
                NAME,
                self.rule.severity,
                open,
                open_token.line,
                open_token.column,
                MESSAGE,
            )
            .with_args([binding.value.clone()]),
        )
    }

    /// Check (a): does this occurrence bind the variable to a literal?
    ///
    /// Recognizes exactly `$var = 'literal'`; any other right-hand side
    /// leaves the bindings untouched.
    fn collect_assignment(&mut self, stream: &TokenStream, at: usize, name: &str) {
        let cursor = Cursor::new(stream);
        let Some(eq) = cursor.next_non_whitespace(at + 1) else {
            return;
        };
        if stream.get(eq).map(|t| t.kind) != Some(TokenKind::Assignment) {
            return;
        }
        let Some(lit) = cursor.find_next(
            TokenKindSet::single(TokenKind::StringLiteral),
            eq + 1,
            Some(eq + 1 + ASSIGNMENT_LOOKAHEAD),
            false,
            TokenKindSet::single(TokenKind::Whitespace),
        ) else {
            return;
        };
        let Some(literal) = stream.get(lit) else {
            return;
        };

        let binding = Binding {
            value: literal.unquoted().to_string(),
            defined_at: at,
        };
        trace!(
            variable = name,
            value = %binding.value,
            position = binding.defined_at,
            "recorded binding"
        );
        self.bindings.insert(name.to_string(), binding);
    }
}
