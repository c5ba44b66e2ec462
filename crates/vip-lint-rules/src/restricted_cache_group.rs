//! Rule to forbid cache group names already in use by wp-memcached.
//!
//! Checks a fixed argument position of configured target calls against a
//! restricted-name set:
//!
//! ```php
//! wp_cache_set( $key, $value, 'users' ); // 'users' is taken
//! ```
//!
//! # Configuration
//!
//! - `target_functions`: functions whose calls are inspected
//!   (default: `wp_cache_set`, `wp_cache_add`)
//! - `group_position`: 1-based argument position of the group name
//!   (default: 3)
//! - `restricted_groups`: group names that are disallowed
//!   (default: the wp-memcached group list below)

use std::collections::HashSet;
use vip_lint_core::{
    ConfigError, Cursor, Rule, RuleConfig, RuleFault, RuleScan, Severity, TokenKind,
    TokenKindSet, TokenStream, Violation,
};

/// Rule code for vip-restricted-cache-group.
pub const CODE: &str = "VIP002";

/// Rule name for vip-restricted-cache-group.
pub const NAME: &str = "vip-restricted-cache-group";

const MESSAGE: &str = "Please do not use cache group %s in a call to %s, as it is already in use by wp-memcached: https://docs.wpvip.com/technical-references/caching/object-cache/.";

const DEFAULT_TARGET_FUNCTIONS: &[&str] = &["wp_cache_set", "wp_cache_add"];

const DEFAULT_GROUP_POSITION: usize = 3;

/// Cache group names already in use by wp-memcached.
const DEFAULT_RESTRICTED_GROUPS: &[&str] = &[
    "category_relationships",
    "post_format_relationships",
    "post_tag_relationships",
    "term_meta",
    "user_meta",
    "blog-details",
    "blog-id-cache",
    "blog-lookup",
    "bookmark",
    "calendar",
    "category",
    "comment",
    "counts",
    "general",
    "global-posts",
    "options",
    "plugins",
    "post_ancestors",
    "post_meta",
    "posts",
    "rss",
    "site-lookup",
    "site-options",
    "site-transient",
    "terms",
    "themes",
    "timeinfo",
    "transient",
    "useremail",
    "userlogins",
    "usermeta",
    "users",
    "userslugs",
    "widget",
];

/// Forbids restricted literal group names at a fixed argument position
/// of cache-function calls.
#[derive(Debug, Clone)]
pub struct RestrictedCacheGroup {
    target_functions: HashSet<String>,
    group_position: usize,
    restricted_groups: HashSet<String>,
    severity: Severity,
}

impl Default for RestrictedCacheGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl RestrictedCacheGroup {
    /// Creates the rule with the wp-memcached defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target_functions: DEFAULT_TARGET_FUNCTIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            group_position: DEFAULT_GROUP_POSITION,
            restricted_groups: DEFAULT_RESTRICTED_GROUPS
                .iter()
                .map(ToString::to_string)
                .collect(),
            severity: Severity::Error,
        }
    }

    /// Creates the rule from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either name set is empty or the
    /// 1-based position is zero.
    pub fn with_parts<I, J, S, T>(
        target_functions: I,
        group_position: usize,
        restricted_groups: J,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let target_functions: HashSet<String> =
            target_functions.into_iter().map(Into::into).collect();
        if target_functions.is_empty() {
            return Err(ConfigError::EmptyNameSet {
                rule: NAME,
                option: "target_functions",
            });
        }
        let restricted_groups: HashSet<String> =
            restricted_groups.into_iter().map(Into::into).collect();
        if restricted_groups.is_empty() {
            return Err(ConfigError::EmptyNameSet {
                rule: NAME,
                option: "restricted_groups",
            });
        }
        if group_position == 0 {
            return Err(ConfigError::InvalidPosition { rule: NAME });
        }
        Ok(Self {
            target_functions,
            group_position,
            restricted_groups,
            severity: Severity::Error,
        })
    }

    /// Creates the rule from a per-rule configuration table, falling
    /// back to the defaults for absent options.
    ///
    /// # Errors
    ///
    /// Returns an error if an option is present but malformed, a name
    /// set is empty, or the position is zero.
    pub fn from_config(config: &RuleConfig) -> Result<Self, ConfigError> {
        let defaults = Self::new();
        let target_functions = match config
            .require_option::<Vec<String>>(NAME, "target_functions")?
        {
            Some(names) => names.into_iter().collect(),
            None => defaults.target_functions,
        };
        let restricted_groups = match config
            .require_option::<Vec<String>>(NAME, "restricted_groups")?
        {
            Some(names) => names.into_iter().collect(),
            None => defaults.restricted_groups,
        };
        let group_position = config
            .require_option::<usize>(NAME, "group_position")?
            .unwrap_or(defaults.group_position);

        Self::with_parts(target_functions, group_position, restricted_groups)
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for RestrictedCacheGroup {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids cache group names already in use by wp-memcached"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn interests(&self) -> TokenKindSet {
        TokenKindSet::single(TokenKind::Identifier)
    }

    fn begin_scan(&self) -> Box<dyn RuleScan + '_> {
        Box::new(RestrictedCacheGroupScan { rule: self })
    }
}

/// Per-scan state; this rule needs nothing beyond its configuration.
struct RestrictedCacheGroupScan<'a> {
    rule: &'a RestrictedCacheGroup,
}

impl RuleScan for RestrictedCacheGroupScan<'_> {
    fn process(&mut self, stream: &TokenStream, at: usize) -> Result<Vec<Violation>, RuleFault> {
        let token = stream.get(at).ok_or(RuleFault::OutOfBounds {
            at,
            len: stream.len(),
        })?;
        if !self.rule.target_functions.contains(token.text.as_str()) {
            return Ok(Vec::new());
        }

        let cursor = Cursor::new(stream);
        let Some(open) = cursor.find_next(
            TokenKindSet::single(TokenKind::OpenParen),
            at + 1,
            None,
            false,
            TokenKindSet::single(TokenKind::Whitespace),
        ) else {
            // Identifier not in call position, e.g. a bare reference.
            return Ok(Vec::new());
        };

        let Some((start, end)) = argument_span(stream, &cursor, open, self.rule.group_position)
        else {
            // Fewer arguments than the configured position, or an
            // unterminated call: report nothing, raise nothing.
            return Ok(Vec::new());
        };

        // First significant token of the argument must be the literal.
        let whitespace = TokenKindSet::single(TokenKind::Whitespace);
        let Some(arg) = cursor.find_next(whitespace, start, Some(end), true, whitespace) else {
            return Ok(Vec::new());
        };
        let Some(arg_token) = stream.get(arg) else {
            return Ok(Vec::new());
        };
        if arg_token.kind != TokenKind::StringLiteral {
            return Ok(Vec::new());
        }
        // The literal must be the argument's only significant token; a
        // multi-token argument such as `'users' . $suffix` names some
        // other group at runtime.
        if cursor
            .find_next(whitespace, arg + 1, Some(end), true, whitespace)
            .is_some()
        {
            return Ok(Vec::new());
        }
        let group = arg_token.unquoted();
        if !self.rule.restricted_groups.contains(group) {
            return Ok(Vec::new());
        }

        Ok(vec![Violation::new(
            CODE,
            NAME,
            self.rule.severity,
            at,
            token.line,
            token.column,
            MESSAGE,
        )
        .with_args([arg_token.text.clone(), token.text.clone()])])
    }
}

/// Locates the `[start, end)` token span of the `position`-th (1-based)
/// top-level argument of the call whose opening delimiter is at `open`.
///
/// Walks structural tokens only, tracking nesting depth so commas inside
/// nested calls do not shift the count. Returns `None` if the call has
/// fewer arguments or never closes.
fn argument_span(
    stream: &TokenStream,
    cursor: &Cursor<'_>,
    open: usize,
    position: usize,
) -> Option<(usize, usize)> {
    let structural = TokenKindSet::of(&[
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::Comma,
    ]);
    let skip = structural.complement();

    let mut depth = 1usize;
    let mut current = 1usize;
    let mut start = open + 1;
    let mut at = open;

    loop {
        let next = cursor.find_next(structural, at + 1, None, false, skip)?;
        match stream.get(next)?.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                depth -= 1;
                if depth == 0 {
                    return (current == position).then_some((start, next));
                }
            }
            TokenKind::Comma if depth == 1 => {
                if current == position {
                    return Some((start, next));
                }
                current += 1;
                start = next + 1;
            }
            _ => {}
        }
        at = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vip_lint_core::{Engine, TokenStreamBuilder};

    /// Appends `name( args... );` where each arg is (kind, text).
    fn build_call(b: &mut TokenStreamBuilder, name: &str, args: &[(TokenKind, &str)]) {
        b.identifier(name).open_paren().whitespace(" ");
        for (i, (kind, text)) in args.iter().enumerate() {
            if i > 0 {
                b.comma().whitespace(" ");
            }
            b.push(*kind, *text);
        }
        b.whitespace(" ").close_paren().other(";").whitespace("\n");
    }

    fn scan(rule: RestrictedCacheGroup, stream: &TokenStream) -> Vec<Violation> {
        let engine = Engine::builder().rule(rule).build().expect("engine builds");
        let report = engine.scan(stream);
        assert!(report.faults.is_empty(), "unexpected faults: {:?}", report.faults);
        report.violations
    }

    #[test]
    fn flags_restricted_group_at_configured_position() {
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "wp_cache_set",
            &[
                (TokenKind::Variable, "$key"),
                (TokenKind::Variable, "$value"),
                (TokenKind::StringLiteral, "'users'"),
            ],
        );
        let stream = b.build();

        let violations = scan(RestrictedCacheGroup::new(), &stream);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].position, 0);
        assert_eq!(
            violations[0].args,
            vec!["'users'".to_string(), "wp_cache_set".to_string()]
        );
    }

    #[test]
    fn non_restricted_group_is_fine() {
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "wp_cache_add",
            &[
                (TokenKind::Variable, "$key"),
                (TokenKind::Variable, "$value"),
                (TokenKind::StringLiteral, "'my-plugin-group'"),
            ],
        );
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn fewer_arguments_than_position_reports_nothing() {
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "wp_cache_set",
            &[
                (TokenKind::Variable, "$key"),
                (TokenKind::Variable, "$value"),
            ],
        );
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn untargeted_function_is_ignored() {
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "wp_cache_get",
            &[
                (TokenKind::Variable, "$key"),
                (TokenKind::Variable, "$value"),
                (TokenKind::StringLiteral, "'users'"),
            ],
        );
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn concatenated_argument_is_not_a_plain_literal() {
        // wp_cache_set( $key, $value, 'users' . $suffix ); -- the
        // effective group name is not 'users', so nothing is reported.
        let mut b = TokenStreamBuilder::new();
        b.identifier("wp_cache_set")
            .open_paren()
            .whitespace(" ")
            .variable("$key")
            .comma()
            .whitespace(" ")
            .variable("$value")
            .comma()
            .whitespace(" ")
            .string_literal("'users'")
            .whitespace(" ")
            .other(".")
            .whitespace(" ")
            .variable("$suffix")
            .whitespace(" ")
            .close_paren()
            .other(";");
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn variable_at_group_position_is_ignored() {
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "wp_cache_set",
            &[
                (TokenKind::Variable, "$key"),
                (TokenKind::Variable, "$value"),
                (TokenKind::Variable, "$group"),
            ],
        );
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn nested_call_in_earlier_argument_does_not_shift_the_count() {
        // wp_cache_set( make_key( $a, $b ), $value, 'users' );
        let mut b = TokenStreamBuilder::new();
        b.identifier("wp_cache_set")
            .open_paren()
            .whitespace(" ")
            .identifier("make_key")
            .open_paren()
            .whitespace(" ")
            .variable("$a")
            .comma()
            .whitespace(" ")
            .variable("$b")
            .whitespace(" ")
            .close_paren()
            .comma()
            .whitespace(" ")
            .variable("$value")
            .comma()
            .whitespace(" ")
            .string_literal("'users'")
            .whitespace(" ")
            .close_paren()
            .other(";");
        let violations = scan(RestrictedCacheGroup::new(), &b.build());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].args[0], "'users'");
    }

    #[test]
    fn unterminated_call_reports_nothing_without_fault() {
        let mut b = TokenStreamBuilder::new();
        b.identifier("wp_cache_set")
            .open_paren()
            .variable("$key")
            .comma()
            .variable("$value")
            .comma()
            .string_literal("'users'");
        // Missing close paren; argument list never completes.
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn identifier_without_call_shape_is_ignored() {
        let mut b = TokenStreamBuilder::new();
        b.identifier("wp_cache_set").other(";");
        assert!(scan(RestrictedCacheGroup::new(), &b.build()).is_empty());
    }

    #[test]
    fn multiple_qualifying_calls_each_report() {
        let mut b = TokenStreamBuilder::new();
        for group in ["'users'", "'posts'"] {
            build_call(
                &mut b,
                "wp_cache_set",
                &[
                    (TokenKind::Variable, "$key"),
                    (TokenKind::Variable, "$value"),
                    (TokenKind::StringLiteral, group),
                ],
            );
        }
        let violations = scan(RestrictedCacheGroup::new(), &b.build());
        assert_eq!(violations.len(), 2);
        assert!(violations[0].position < violations[1].position);
    }

    #[test]
    fn custom_position_and_sets() {
        let rule = RestrictedCacheGroup::with_parts(["cache_put"], 1, ["sessions"])
            .expect("valid parts");
        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "cache_put",
            &[
                (TokenKind::StringLiteral, "'sessions'"),
                (TokenKind::Variable, "$value"),
            ],
        );
        let violations = scan(rule, &b.build());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].args[0], "'sessions'");
    }

    #[test]
    fn zero_position_is_a_config_error() {
        let err = RestrictedCacheGroup::with_parts(["f"], 0, ["g"])
            .expect_err("zero position rejected");
        assert!(matches!(err, ConfigError::InvalidPosition { rule: NAME }));
    }

    #[test]
    fn empty_sets_are_config_errors() {
        let err = RestrictedCacheGroup::with_parts(Vec::<String>::new(), 3, ["g"])
            .expect_err("empty targets rejected");
        assert!(matches!(
            err,
            ConfigError::EmptyNameSet {
                rule: NAME,
                option: "target_functions",
            }
        ));

        let err = RestrictedCacheGroup::with_parts(["f"], 3, Vec::<String>::new())
            .expect_err("empty groups rejected");
        assert!(matches!(
            err,
            ConfigError::EmptyNameSet {
                rule: NAME,
                option: "restricted_groups",
            }
        ));
    }

    #[test]
    fn from_config_overrides_defaults() {
        let config = vip_lint_core::Config::parse(
            r#"
            [rules.vip-restricted-cache-group]
            target_functions = ["cache_put"]
            group_position = 2
            restricted_groups = ["sessions"]
            "#,
        )
        .expect("valid TOML parses");
        let rule_config = config.rule_config(NAME).expect("table present");
        let rule = RestrictedCacheGroup::from_config(rule_config).expect("builds from config");

        let mut b = TokenStreamBuilder::new();
        build_call(
            &mut b,
            "cache_put",
            &[
                (TokenKind::Variable, "$value"),
                (TokenKind::StringLiteral, "'sessions'"),
            ],
        );
        assert_eq!(scan(rule, &b.build()).len(), 1);
    }
}
