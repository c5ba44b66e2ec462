//! # vip-lint-core
//!
//! Core framework for rule-based linting over a tokenized source
//! representation. An external tokenizer produces a [`TokenStream`]; the
//! [`Engine`] scans it in a single forward pass, dispatching each token
//! to every registered [`Rule`] interested in its kind and collecting
//! the position-ordered [`Violation`] list for an external reporter.
//!
//! This crate provides:
//!
//! - [`Token`], [`TokenStream`], and [`TokenKindSet`] — the immutable
//!   token model with a closed kind taxonomy
//! - [`Cursor`] — stateless forward-search primitives rules use to
//!   inspect neighboring structure
//! - [`Rule`] and [`RuleScan`] — the contract every analysis rule
//!   implements, with private state scoped to one scan
//! - [`Engine`] — per-file scan lifecycle, dispatch, and fault isolation
//! - [`Config`] — TOML-based per-rule enable/disable and severity
//!   overrides
//!
//! ## Example
//!
//! ```ignore
//! use vip_lint_core::{Engine, TokenStream};
//!
//! let engine = Engine::builder().rule(MyRule::new()).build()?;
//! let report = engine.scan(&stream);
//! for violation in &report.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cursor;
mod engine;
mod rule;
mod token;
mod types;

pub use config::{Config, ConfigError, RuleConfig};
pub use cursor::Cursor;
pub use engine::{Engine, EngineBuilder, ScanFault, ScanReport};
pub use rule::{Rule, RuleBox, RuleFault, RuleScan};
pub use token::{Token, TokenKind, TokenKindSet, TokenStream, TokenStreamBuilder};
pub use types::{Severity, Violation};
