//! Configuration for the AiStrip bridge.
//!
//! TOML file + `AISTRIP_*` environment overlay, credential resolution
//! (env var, keyring, plaintext), and translation to
//! `aistrip_core::PlatformConfig`. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aistrip_core::{DEFAULT_BASE_URL, PlatformConfig};

/// Environment variable consulted for the key when `key_env` is unset or empty.
pub const KEY_ENV: &str = "AISTRIP_KEY";

/// Keyring service under which keys are stored.
pub const KEYRING_SERVICE: &str = "aistrip";

const ENV_PREFIX: &str = "AISTRIP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no key configured for platform '{name}'")]
    NoCredentials { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

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

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Platform display name; also scopes the keyring entry.
    #[serde(default = "default_name")]
    pub name: String,

    /// Environment variable holding the key.
    pub key_env: Option<String>,

    /// Key in plaintext (prefer keyring or env var).
    pub key: Option<String>,

    /// Service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Re-run discovery every N seconds in `run`. 0 disables.
    #[serde(default)]
    pub refresh_interval: u64,

    /// Accessory cache file. Defaults to the platform data dir.
    pub registry: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            key_env: None,
            key: None,
            base_url: default_base_url(),
            timeout: default_timeout(),
            refresh_interval: 0,
            registry: None,
        }
    }
}

fn default_name() -> String {
    "AiStrip".into()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    10
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "aistrip", "aistrip")
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("aistrip");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Accessory cache location: the configured path, else the platform data dir.
pub fn registry_path(cfg: &Config) -> PathBuf {
    if let Some(ref path) = cfg.registry {
        return path.clone();
    }
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("accessories.json"),
        |dirs| dirs.data_dir().join("accessories.json"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        // The key is resolved separately so the precedence chain holds.
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["key"]))
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{name}/key"))
}

/// Resolve the key from the credential chain (no CLI flag step).
///
/// Order: env var named by `key_env`, then `AISTRIP_KEY`, then the system
/// keyring, then plaintext `key`.
pub fn resolve_key(cfg: &Config) -> Result<SecretString, ConfigError> {
    let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    // 1. Configured env var
    if let Some(val) = cfg.key_env.as_deref().and_then(from_env) {
        return Ok(SecretString::from(val));
    }

    // 2. Well-known env var
    if let Some(val) = from_env(KEY_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(&cfg.name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref key) = cfg.key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }

    Err(ConfigError::NoCredentials {
        name: cfg.name.clone(),
    })
}

/// Store `key` in the system keyring under the platform name.
pub fn store_key(name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(name)
        .and_then(|entry| entry.set_password(key))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `PlatformConfig` from `cfg` with an already-resolved key.
pub fn to_platform_config(cfg: &Config, key: SecretString) -> Result<PlatformConfig, ConfigError> {
    let base_url: url::Url = cfg.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {}", cfg.base_url),
    })?;
    if cfg.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut platform = PlatformConfig::new(cfg.name.clone(), key)
        .map_err(|e| ConfigError::Validation {
            field: "platform".into(),
            reason: e.to_string(),
        })?
        .with_base_url(base_url)
        .with_refresh_interval(cfg.refresh_interval);
    platform.timeout = Duration::from_secs(cfg.timeout);
    Ok(platform)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
            assert_eq!(cfg.timeout, 10);
            Ok(())
        });
    }

    #[test]
    fn file_then_env_overlay() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    name = "Living Room"
                    key = "from-file"
                    base_url = "http://localhost:8080/api/fa2"
                    refresh_interval = 60
                "#,
            )?;
            jail.set_env("AISTRIP_TIMEOUT", "3");
            jail.set_env("AISTRIP_KEY", "from-env");

            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.name, "Living Room");
            assert_eq!(cfg.refresh_interval, 60);
            assert_eq!(cfg.timeout, 3);
            // The env key never overwrites the plaintext field.
            assert_eq!(cfg.key.as_deref(), Some("from-file"));
            Ok(())
        });
    }

    #[test]
    fn configured_env_var_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("MY_STRIP_KEY", "custom");
            jail.set_env("AISTRIP_KEY", "generic");
            let cfg = Config {
                key_env: Some("MY_STRIP_KEY".into()),
                key: Some("plain".into()),
                ..Config::default()
            };
            assert_eq!(resolve_key(&cfg).unwrap().expose_secret(), "custom");
            Ok(())
        });
    }

    #[test]
    fn well_known_env_var_beats_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("AISTRIP_KEY", "generic");
            let cfg = Config {
                key: Some("plain".into()),
                ..Config::default()
            };
            assert_eq!(resolve_key(&cfg).unwrap().expose_secret(), "generic");
            Ok(())
        });
    }

    #[test]
    fn translates_to_platform_config() {
        let cfg = Config {
            base_url: "http://127.0.0.1:9000/api/fa2".into(),
            timeout: 4,
            refresh_interval: 30,
            ..Config::default()
        };
        let platform = to_platform_config(&cfg, SecretString::from("k".to_string())).unwrap();

        assert_eq!(platform.name, "AiStrip");
        assert_eq!(platform.base_url.as_str(), "http://127.0.0.1:9000/api/fa2");
        assert_eq!(platform.timeout, Duration::from_secs(4));
        assert_eq!(platform.refresh_interval_secs, 30);
    }

    #[test]
    fn rejects_bad_url_and_zero_timeout() {
        let key = || SecretString::from("k".to_string());

        let bad_url = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            to_platform_config(&bad_url, key()),
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));

        let zero = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(to_platform_config(&zero, key()).is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            name: "Office".into(),
            key_env: Some("OFFICE_KEY".into()),
            refresh_interval: 120,
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn explicit_registry_path_is_kept() {
        let cfg = Config {
            registry: Some(PathBuf::from("/tmp/strips.json")),
            ..Config::default()
        };
        assert_eq!(registry_path(&cfg), PathBuf::from("/tmp/strips.json"));
        assert!(registry_path(&Config::default()).ends_with("accessories.json"));
    }
}
