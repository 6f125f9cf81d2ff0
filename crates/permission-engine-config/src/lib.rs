// crates/permission-engine-config/src/lib.rs
// ============================================================================
// Module: Permission Engine Config Library
// Description: Configuration model and loader for the permission engine.
// Purpose: Turn permission-engine.toml into validated engine settings.
// Dependencies: permission-engine-core, permission-engine-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from a TOML file chosen by CLI flag, the
//! `PERMISSION_ENGINE_CONFIG` environment variable, or the default filename.
//! Loading fails closed: oversized, non-UTF-8, unknown-field, or
//! inconsistent configuration is rejected before any engine is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::AuditSinkType;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::EventsConfig;
pub use config::LedgerConfig;
pub use config::LedgerType;
pub use config::NetworkConfig;
pub use config::PayloadStoreConfig;
pub use config::PermissionEngineConfig;
pub use config::RetryConfig;
pub use examples::example_config_toml;
