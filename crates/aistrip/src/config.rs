//! CLI-aware configuration: layers `GlobalOpts` overrides on top of the
//! shared `aistrip-config` loading and credential chain.
//!
//! Core never sees these types -- it receives a pre-built `PlatformConfig`.

use std::path::PathBuf;

use secrecy::SecretString;

use aistrip_config::Config;
use aistrip_core::PlatformConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `AISTRIP_CONFIG`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(aistrip_config::config_path)
}

/// Load the config file + environment, with flag overrides applied.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = aistrip_config::load_config_from(&config_file(global))?;

    if let Some(ref url) = global.base_url {
        cfg.base_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if let Some(ref path) = global.registry {
        cfg.registry = Some(path.clone());
    }
    Ok(cfg)
}

/// Resolve the key (flag first, then the shared chain) and build the
/// platform configuration.
pub fn platform_config(global: &GlobalOpts, cfg: &Config) -> Result<PlatformConfig, CliError> {
    let key = match global.key {
        Some(ref key) if !key.is_empty() => SecretString::from(key.clone()),
        _ => aistrip_config::resolve_key(cfg)?,
    };
    Ok(aistrip_config::to_platform_config(cfg, key)?)
}

/// Accessory cache file for this invocation.
pub fn registry_path(cfg: &Config) -> PathBuf {
    aistrip_config::registry_path(cfg)
}
