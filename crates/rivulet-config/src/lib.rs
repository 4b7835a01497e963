//! Configuration for rivulet tools.
//!
//! Defaults, then a TOML file, then `RIVULET_`-prefixed environment
//! variables (`__` separates nesting, e.g. `RIVULET_LOCALE__DEFAULT_LANG`).
//! Translates into the resolver and HTTP settings of `rivulet_i18n`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rivulet_i18n::{HttpOptions, ResolverConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub locale: LocaleSection,
}

/// `[locale]`: where bundles live and which language to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleSection {
    /// Bundle root: an `http(s)://` URL or a directory.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Selected language. The default language when unset.
    pub lang: Option<String>,

    #[serde(default = "default_caching")]
    pub caching: bool,

    /// HTTP timeout for bundle requests.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            namespaces: default_namespaces(),
            default_lang: default_lang(),
            lang: None,
            caching: default_caching(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_uri() -> String {
    "locales".into()
}
fn default_namespaces() -> Vec<String> {
    vec!["translation".into()]
}
fn default_lang() -> String {
    "en".into()
}
fn default_caching() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Reject settings the resolver cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let locale = &self.locale;
        if locale.base_uri.trim().is_empty() {
            return Err(invalid("locale.base_uri", "must not be empty"));
        }
        if locale.namespaces.is_empty() {
            return Err(invalid("locale.namespaces", "at least one namespace is required"));
        }
        if locale.namespaces.iter().any(|ns| ns.trim().is_empty()) {
            return Err(invalid("locale.namespaces", "namespace names must not be empty"));
        }
        if locale.default_lang.trim().is_empty() {
            return Err(invalid("locale.default_lang", "must not be empty"));
        }
        if locale.timeout_secs == 0 {
            return Err(invalid("locale.timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

impl LocaleSection {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            lang: self.lang.clone(),
            caching: self.caching,
            ..ResolverConfig::new(&self.base_uri)
                .with_namespaces(self.namespaces.iter().cloned())
                .with_default_lang(self.default_lang.clone())
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            ..HttpOptions::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "rivulet", "rivulet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rivulet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RIVULET_").split("__"))
}

/// Load and validate the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load and validate the config from `path` + environment. A missing file
/// is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if loading or validation fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
