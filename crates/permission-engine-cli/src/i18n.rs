// crates/permission-engine-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The permission engine CLI keeps user-facing strings in a small translation
//! catalog so messages stay consistent across commands. All runtime output
//! should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "permission-engine {version}"),
    ("main.unsupported_dispatch", "Command is not handled by the engine dispatcher."),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.invalid_identifier", "Invalid argument: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config validated successfully."),
    ("config.init.ok", "Example config written to {path}"),
    ("config.init.exists", "Refusing to overwrite {path}; pass --force to replace it."),
    ("config.init.write_failed", "Failed to write config to {path}: {error}"),
    ("engine.action_failed", "Permission action failed: {error}"),
    (
        "engine.memory_ledger_warning",
        "Warning: the ledger is in-memory; this change is discarded when the command exits.",
    ),
    ("ledger.open_failed", "Failed to open ledger: {error}"),
    ("ledger.query_failed", "Ledger query failed: {error}"),
    ("ledger.sqlite_required", "Ledger commands require [ledger] type = \"sqlite\"."),
    ("ledger.head_missing", "Head snapshot {version} is missing from the ledger."),
    ("events.open_failed", "Failed to open event log {path}: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("audit.path_missing", "File audit sink requires a path."),
    ("payload.not_configured", "No [payload_store] section is configured."),
    ("payload.read_failed", "Failed to read payload from {path}: {error}"),
    ("payload.store_failed", "Payload store request failed: {error}"),
    ("payload.task_failed", "Payload store task failed: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Static Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "permission-engine {version}"),
    ("main.unsupported_dispatch", "El distribuïdor del motor no gestiona aquesta ordre."),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.serialize_failed", "No s'ha pogut serialitzar la sortida: {error}"),
    (
        "input.read_too_large",
        "Es rebutja llegir {kind} a {path} perquè té {size} bytes (límit {limit}).",
    ),
    ("input.invalid_identifier", "Argument no vàlid: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.validate.ok", "Configuració validada correctament."),
    ("config.init.ok", "Configuració d'exemple escrita a {path}"),
    (
        "config.init.exists",
        "Es rebutja sobreescriure {path}; feu servir --force per substituir-lo.",
    ),
    ("config.init.write_failed", "No s'ha pogut escriure la configuració a {path}: {error}"),
    ("engine.action_failed", "L'acció de permisos ha fallat: {error}"),
    (
        "engine.memory_ledger_warning",
        "Avís: el registre és en memòria; aquest canvi es descarta quan acaba l'ordre.",
    ),
    ("ledger.open_failed", "No s'ha pogut obrir el registre: {error}"),
    ("ledger.query_failed", "La consulta al registre ha fallat: {error}"),
    ("ledger.sqlite_required", "Les ordres de registre requereixen [ledger] type = \"sqlite\"."),
    ("ledger.head_missing", "Falta la instantània {version} al registre."),
    ("events.open_failed", "No s'ha pogut obrir el registre d'esdeveniments {path}: {error}"),
    ("audit.open_failed", "No s'ha pogut obrir el registre d'auditoria {path}: {error}"),
    ("audit.path_missing", "La sortida d'auditoria a fitxer requereix un camí."),
    ("payload.not_configured", "No hi ha cap secció [payload_store] configurada."),
    ("payload.read_failed", "No s'ha pogut llegir el payload de {path}: {error}"),
    ("payload.store_failed", "La petició al magatzem de payloads ha fallat: {error}"),
    ("payload.task_failed", "La tasca del magatzem de payloads ha fallat: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

/// Returns the catalog keys defined for `locale`, sorted.
#[must_use]
pub fn catalog_keys(locale: Locale) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = catalog_for(locale).keys().copied().collect();
    keys.sort_unstable();
    keys
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
