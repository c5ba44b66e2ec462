//! Core types for lint violations.

use serde::{Deserialize, Serialize};

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A lint violation found during one scan.
///
/// Self-describing: carries the token position, source location, rule
/// identity, and a `%s` message template with its ordered arguments, so
/// an external formatter needs no further lookups into the stream.
/// Violations are append-only; once emitted they are never mutated or
/// retracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "VIP001").
    pub code: String,
    /// Rule name (e.g., "vip-dynamic-calls").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Token index the violation is anchored at.
    pub position: usize,
    /// Line number (1-indexed) of the anchor token.
    pub line: usize,
    /// Column number (1-indexed) of the anchor token.
    pub column: usize,
    /// Message template; `%s` placeholders are filled from `args`.
    pub message: String,
    /// Ordered message arguments.
    pub args: Vec<String>,
}

impl Violation {
    /// Creates a new violation with no message arguments.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        position: usize,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            position,
            line,
            column,
            message: message.into(),
            args: Vec::new(),
        }
    }

    /// Sets the ordered message arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Renders the message template with its arguments substituted.
    ///
    /// Each `%s` consumes the next argument in order; placeholders
    /// without a matching argument are left verbatim.
    #[must_use]
    pub fn rendered_message(&self) -> String {
        let mut out = String::with_capacity(self.message.len());
        let mut args = self.args.iter();
        let mut rest = self.message.as_str();
        while let Some(pos) = rest.find("%s") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(arg) => out.push_str(arg),
                None => out.push_str("%s"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.line,
            self.column,
            self.severity,
            self.code,
            self.rendered_message()
        )
    }
}
