use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::ConfiguratorConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "configurator.toml",
    "configurator.yaml",
    "configurator.yml",
    "configurator.json",
];

/// Environment variable that overrides `slack.bot_token`.
pub const BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ConfiguratorConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./configurator.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/configurator/configurator.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ConfiguratorConfig::default()` if no config file is found.
pub fn discover_and_load() -> ConfiguratorConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ConfiguratorConfig::default()
}

/// Load from an explicit path when given, otherwise discover, then apply
/// environment overrides.
pub fn load_or_discover(explicit: Option<&Path>) -> anyhow::Result<ConfiguratorConfig> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => discover_and_load(),
    };
    Ok(apply_env_overrides(config))
}

/// Apply `SLACK_BOT_TOKEN` when set and non-empty.
pub fn apply_env_overrides(config: ConfiguratorConfig) -> ConfiguratorConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: ConfiguratorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfiguratorConfig {
    if let Some(token) = lookup(BOT_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        if !config.slack.bot_token.expose_secret().is_empty() {
            debug!("{BOT_TOKEN_ENV} overrides configured bot token");
        }
        config.slack.bot_token = Secret::new(token);
    }
    config
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/configurator/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "configurator").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ConfiguratorConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
