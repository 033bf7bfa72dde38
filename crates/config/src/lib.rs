//! Configuration loading, env substitution, and validation.
//!
//! Config files: `configurator.toml`, `configurator.yaml`, or `configurator.json`
//! Searched in `./` then `~/.config/configurator/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution in the raw
//! file text.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        BOT_TOKEN_ENV, apply_env_overrides, config_dir, discover_and_load, load_config,
        load_or_discover,
    },
    schema::{ConfiguratorConfig, DEFAULT_API_BASE_URL, SlackConfig, TriggerConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
