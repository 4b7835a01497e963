//! Resolve the effective configuration: file and environment through
//! `rivulet_config`, then command-line overrides.

use std::path::PathBuf;

use tracing::debug;

use rivulet_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config named by `--config` (which must exist) or the platform
/// default (which may not), then apply the global flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_file(global)?;
    let mut config = rivulet_config::load_config_from(&path)?;
    apply_overrides(&mut config, global);
    config.validate()?;
    debug!(path = %path.display(), base_uri = %config.locale.base_uri, "configuration resolved");
    Ok(config)
}

fn config_file(global: &GlobalOpts) -> Result<PathBuf, CliError> {
    let Some(path) = &global.config else {
        return Ok(rivulet_config::config_path());
    };
    if path.is_file() {
        Ok(path.clone())
    } else {
        Err(CliError::NoConfig {
            path: path.display().to_string(),
            default: rivulet_config::config_path().display().to_string(),
        })
    }
}

fn apply_overrides(config: &mut Config, global: &GlobalOpts) {
    let locale = &mut config.locale;
    if let Some(base_uri) = &global.base_uri {
        locale.base_uri.clone_from(base_uri);
    }
    if let Some(lang) = &global.default_lang {
        locale.default_lang.clone_from(lang);
    }
    if !global.namespaces.is_empty() {
        locale.namespaces.clone_from(&global.namespaces);
    }
}
