//! # vip-lint-rules
//!
//! Built-in lint rules for vip-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | VIP001 | `vip-dynamic-calls` | Forbids dynamic calls of restricted functions via variables |
//! | VIP002 | `vip-restricted-cache-group` | Forbids cache group names already in use by wp-memcached |
//!
//! ## Usage
//!
//! ```ignore
//! use vip_lint_core::Engine;
//! use vip_lint_rules::{DynamicCalls, RestrictedCacheGroup};
//!
//! let engine = Engine::builder()
//!     .rule(DynamicCalls::new())
//!     .rule(RestrictedCacheGroup::new())
//!     .build()?;
//! let report = engine.scan(&stream);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dynamic_calls;
mod presets;
mod restricted_cache_group;

pub use dynamic_calls::DynamicCalls;
pub use presets::{rules_from_config, vip_minimum_rules};
pub use restricted_cache_group::RestrictedCacheGroup;
