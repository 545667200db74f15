use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::AppConfig;
use crate::scanner::{ErrorPolicy, ScanMode};

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "DIRECTIVE_SCAN_";
const REPO_CONFIG_BASE: &str = "directive-scan";

/// Values set explicitly on the command line
///
/// Unset fields are left out of serialization so they never mask lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_policy: Option<ErrorPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ScanMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe: Option<bool>,
}

/// Load the merged configuration
///
/// Priority, lowest first:
/// 1. embedded defaults
/// 2. `~/.config/directive-scan/config.toml`
/// 3. `./directive-scan.{toml,json,yaml,yml}`, or only `custom_config` when given
/// 4. `DIRECTIVE_SCAN_*` environment variables (`__` separates nested keys)
/// 5. `cli_overrides`
pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<AppConfig> {
    tracing::trace!("CONFIG LOAD: Starting");

    let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

    if let Some(path) = custom_config {
        if !Path::new(path).is_file() {
            bail!("Config file not found: {path}");
        }
        tracing::trace!("CONFIG LOAD: Using custom config {path}");
        figment = merge_file(figment, path);
    } else {
        figment = figment
            .merge(Toml::file(user_config_path()))
            .merge(Toml::file(format!("{REPO_CONFIG_BASE}.toml")))
            .merge(Json::file(format!("{REPO_CONFIG_BASE}.json")))
            .merge(Yaml::file(format!("{REPO_CONFIG_BASE}.yaml")))
            .merge(Yaml::file(format!("{REPO_CONFIG_BASE}.yml")));
    }

    // Environment variables beat files
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(overrides) = cli_overrides {
        tracing::trace!("CONFIG LOAD: Applying CLI overrides");
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: AppConfig = figment
        .extract()
        .context("Failed to load configuration")?;
    tracing::trace!("CONFIG LOAD: directory = {}", config.directory.display());
    Ok(config)
}

fn merge_file(figment: Figment, path: &str) -> Figment {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

fn user_config_path() -> String {
    match std::env::var("HOME") {
        Ok(home) => format!("{home}/.config/directive-scan/config.toml"),
        Err(_) => "~/.config/directive-scan/config.toml".to_string(),
    }
}
