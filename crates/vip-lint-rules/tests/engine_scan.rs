//! Integration test: the standard rule set end-to-end via the engine.
//!
//! Builds token streams the way an external tokenizer would and verifies
//! the full config → rules → engine → violations pipeline.

use vip_lint_core::{Config, Engine, Severity, TokenStream, Violation};
use vip_lint_rules::{rules_from_config, vip_minimum_rules};

/// Token stream for:
///
/// ```php
/// $func = 'func_num_args';
/// $func();
/// wp_cache_set( $key, $value, 'users' );
/// ```
fn fixture_stream() -> TokenStream {
    TokenStream::builder()
        .variable("$func")
        .whitespace(" ")
        .assignment()
        .whitespace(" ")
        .string_literal("'func_num_args'")
        .other(";")
        .whitespace("\n")
        .variable("$func")
        .open_paren()
        .close_paren()
        .other(";")
        .whitespace("\n")
        .identifier("wp_cache_set")
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
        .close_paren()
        .other(";")
        .build()
}

fn standard_engine(config: Config) -> Engine {
    let mut builder = Engine::builder().config(config);
    for rule in vip_minimum_rules() {
        builder = builder.rule_box(rule);
    }
    builder.build().expect("engine builds")
}

#[test]
fn standard_rules_find_both_violations_in_order() {
    let engine = standard_engine(Config::default());
    let report = engine.scan(&fixture_stream());

    assert!(report.faults.is_empty());
    assert_eq!(report.violations.len(), 2);
    assert!(report.violations[0].position < report.violations[1].position);

    let codes: Vec<&str> = report.violations.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["VIP001", "VIP002"]);
}

#[test]
fn rendered_violations_match_expected_diagnostics() {
    let engine = standard_engine(Config::default());
    let report = engine.scan(&fixture_stream());

    insta::assert_snapshot!(
        report.violations[0].to_string(),
        @"2:6: error [VIP001] Dynamic calling is not recommended in the case of func_num_args."
    );
    insta::assert_snapshot!(
        report.violations[1].to_string(),
        @"3:1: error [VIP002] Please do not use cache group 'users' in a call to wp_cache_set, as it is already in use by wp-memcached: https://docs.wpvip.com/technical-references/caching/object-cache/."
    );
}

#[test]
fn identical_input_and_config_give_byte_identical_output() {
    let stream = fixture_stream();
    let engine = standard_engine(Config::default());

    let first = serde_json::to_string(&engine.scan(&stream).violations)
        .expect("violations serialize");
    let second = serde_json::to_string(&engine.scan(&stream).violations)
        .expect("violations serialize");
    assert_eq!(first, second);

    // A separately built engine over the same config agrees too.
    let other = standard_engine(Config::default());
    let third = serde_json::to_string(&other.scan(&stream).violations)
        .expect("violations serialize");
    assert_eq!(first, third);
}

#[test]
fn no_state_survives_between_scans_of_different_files() {
    let engine = standard_engine(Config::default());

    // First file binds $func to a blacklisted name.
    let report = engine.scan(&fixture_stream());
    assert_eq!(report.violations.len(), 2);

    // Second file only calls $func; the binding must be gone.
    let call_only = TokenStream::builder()
        .variable("$func")
        .open_paren()
        .close_paren()
        .other(";")
        .build();
    assert!(engine.scan(&call_only).violations.is_empty());
}

#[test]
fn config_disables_a_rule_without_touching_the_other() {
    let config = Config::parse(
        r#"
        [rules.vip-dynamic-calls]
        enabled = false
        "#,
    )
    .expect("valid TOML parses");
    let engine = standard_engine(config);
    let report = engine.scan(&fixture_stream());

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].code, "VIP002");
}

#[test]
fn config_severity_override_applies_at_scan_time() {
    let config = Config::parse(
        r#"
        [rules.vip-restricted-cache-group]
        severity = "warning"
        "#,
    )
    .expect("valid TOML parses");
    let engine = standard_engine(config);
    let report = engine.scan(&fixture_stream());

    let cache = report
        .violations
        .iter()
        .find(|v| v.code == "VIP002")
        .expect("cache group violation present");
    assert_eq!(cache.severity, Severity::Warning);
    let (errors, warnings) = report.count_by_severity();
    assert_eq!((errors, warnings), (1, 1));
}

#[test]
fn rules_from_config_feed_custom_options_through() {
    let config = Config::parse(
        r#"
        [rules.vip-dynamic-calls]
        blacklist = ["my_forbidden_fn"]

        [rules.vip-restricted-cache-group]
        target_functions = ["cache_put"]
        group_position = 1
        restricted_groups = ["sessions"]
        "#,
    )
    .expect("valid TOML parses");
    let rules = rules_from_config(&config).expect("rules build from config");
    let mut builder = Engine::builder().config(config);
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let engine = builder.build().expect("engine builds");

    let stream = TokenStream::builder()
        .variable("$f")
        .whitespace(" ")
        .assignment()
        .whitespace(" ")
        .string_literal("'my_forbidden_fn'")
        .other(";")
        .whitespace("\n")
        .variable("$f")
        .open_paren()
        .close_paren()
        .other(";")
        .whitespace("\n")
        .identifier("cache_put")
        .open_paren()
        .string_literal("'sessions'")
        .close_paren()
        .other(";")
        .build();

    let report = engine.scan(&stream);
    let codes: Vec<&str> = report.violations.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(codes, vec!["VIP001", "VIP002"]);
}

#[test]
fn machine_readable_output_is_self_describing() {
    let engine = standard_engine(Config::default());
    let report = engine.scan(&fixture_stream());

    let json = serde_json::to_value(&report.violations).expect("violations serialize");
    let entries = json.as_array().expect("array of violations");
    assert_eq!(entries.len(), 2);
    for entry in entries {
        // Everything a reporter needs, no stream lookups required.
        for field in ["code", "rule", "severity", "position", "line", "column", "message", "args"] {
            assert!(entry.get(field).is_some(), "missing field {field}");
        }
    }

    let back: Vec<Violation> =
        serde_json::from_value(json).expect("violations deserialize");
    assert_eq!(back, report.violations);
}
