// crates/permission-engine-cli/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Exercises the translation catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable i18n helpers.
// Dependencies: permission-engine-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the CLI i18n catalog behavior:
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - Every locale defines the same keys.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use permission_engine_cli::i18n::Locale;
use permission_engine_cli::i18n::MessageArg;
use permission_engine_cli::i18n::SUPPORTED_LOCALES;
use permission_engine_cli::i18n::catalog_keys;
use permission_engine_cli::i18n::translate;
use permission_engine_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("path", "/tmp/permission-engine.toml");
    assert_eq!(arg.key, "path");
    assert_eq!(arg.value, "/tmp/permission-engine.toml");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("path", "/tmp/permission-engine.toml")];
    let result = translate("config.init.ok", args);
    assert_eq!(result, "Example config written to /tmp/permission-engine.toml");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    let result = translate("missing.key", Vec::new());
    assert_eq!(result, "missing.key");
}

/// Confirms the t! macro formats named arguments.
#[test]
fn t_macro_formats_message() {
    let rendered = t!("main.version", version = "0.1.0");
    assert_eq!(rendered, "permission-engine 0.1.0");
}

/// Confirms every locale defines exactly the English key set.
#[test]
fn locales_share_catalog_keys() {
    let english = catalog_keys(Locale::En);
    for locale in SUPPORTED_LOCALES {
        assert_eq!(catalog_keys(*locale), english, "locale {}", locale.as_str());
    }
}

/// Confirms locale parsing tolerates case and region tags.
#[test]
fn locale_parse_accepts_region_tags() {
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse("CA-es"), Some(Locale::Ca));
    assert_eq!(Locale::parse("ca_ES.UTF-8"), Some(Locale::Ca));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("fr"), None);
}
