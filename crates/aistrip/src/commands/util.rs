//! Shared helpers for command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use aistrip_config::Config;
use aistrip_core::{
    AccessoryRecord, FileRegistry, MemoryRegistry, NormalizedDevice, Platform, PlatformConfig,
};

use crate::config;
use crate::error::CliError;

// ── Accessory rows ──────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AccessoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device ID")]
    device_id: String,
    #[tabled(rename = "Identity")]
    identity: String,
}

impl From<&AccessoryRecord> for AccessoryRow {
    fn from(r: &AccessoryRecord) -> Self {
        Self {
            name: r.display_name.clone(),
            device_id: r.device().device_id.clone(),
            identity: r.identity.to_string(),
        }
    }
}

/// Serializable view of an accessory for structured output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorySummary {
    pub name: String,
    pub device_id: String,
    pub identity: String,
}

impl From<&AccessoryRecord> for AccessorySummary {
    fn from(r: &AccessoryRecord) -> Self {
        Self {
            name: r.display_name.clone(),
            device_id: r.device().device_id.clone(),
            identity: r.identity.to_string(),
        }
    }
}

// ── Platform construction ───────────────────────────────────────────

/// Open the file-backed accessory registry for this invocation.
pub fn open_registry(cfg: &Config) -> Result<Arc<FileRegistry>, CliError> {
    let path = config::registry_path(cfg);
    Ok(Arc::new(FileRegistry::open(path)?))
}

/// A platform backed by a throwaway registry, for one-off device calls.
pub fn ephemeral_platform(platform_config: PlatformConfig) -> Result<Platform, CliError> {
    Ok(Platform::new(
        platform_config,
        Arc::new(MemoryRegistry::new()),
    )?)
}

/// A platform backed by the persistent registry, restored and ready to launch.
pub fn persistent_platform(
    cfg: &Config,
    platform_config: PlatformConfig,
) -> Result<(Platform, Arc<FileRegistry>), CliError> {
    let registry = open_registry(cfg)?;
    let platform = Platform::new(platform_config, Arc::<FileRegistry>::clone(&registry))?;
    let restored = platform.restore_from_registry();
    tracing::debug!(restored, path = %registry.path().display(), "registry restored");
    Ok((platform, registry))
}

// ── Device resolution ───────────────────────────────────────────────

/// Resolve a device identifier: exact device ID first, then a unique
/// case-insensitive name match.
pub fn resolve_device(
    devices: &[NormalizedDevice],
    identifier: &str,
) -> Result<NormalizedDevice, CliError> {
    if let Some(device) = devices.iter().find(|d| d.device_id == identifier) {
        return Ok(device.clone());
    }

    let by_name: Vec<_> = devices
        .iter()
        .filter(|d| d.device_name.eq_ignore_ascii_case(identifier))
        .collect();

    match by_name.as_slice() {
        [device] => Ok((*device).clone()),
        [] => Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: identifier.into(),
            list_command: "devices".into(),
        }),
        many => Err(CliError::Validation {
            field: "device".into(),
            reason: format!(
                "'{identifier}' matches {} devices; use a device ID ({})",
                many.len(),
                many.iter()
                    .map(|d| d.device_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}
