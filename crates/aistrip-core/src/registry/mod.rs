// ── Accessory host registry ──
//
// The host owns accessory records across restarts; the platform only asks
// it to register, update and unregister them. Two in-process registries
// are provided: a memory-only one and one persisted to a JSON file.

mod file;
mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{AccessoryIdentity, AccessoryRecord};

pub use file::FileRegistry;
pub use memory::MemoryRegistry;

/// Plugin + platform pair that scopes registrations in the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginKey {
    pub plugin: String,
    pub platform: String,
}

impl PluginKey {
    pub fn new(plugin: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            platform: platform.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plugin, self.platform)
    }
}

/// One call made against a registry, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOp {
    Register(Vec<AccessoryIdentity>),
    Update(Vec<AccessoryIdentity>),
    Unregister(Vec<AccessoryIdentity>),
}

/// Host-side storage of accessory records.
///
/// All operations are batched. Implementations must reject registering an
/// identity that is already present.
pub trait AccessoryRegistry: Send + Sync {
    /// Accessories restored from the previous run, handed to the platform
    /// before launch.
    fn restored(&self) -> Vec<AccessoryRecord>;

    fn register(&self, key: &PluginKey, accessories: &[AccessoryRecord]) -> Result<(), CoreError>;

    fn update(&self, accessories: &[AccessoryRecord]) -> Result<(), CoreError>;

    fn unregister(&self, key: &PluginKey, accessories: &[AccessoryRecord])
    -> Result<(), CoreError>;
}

fn identities(accessories: &[AccessoryRecord]) -> Vec<AccessoryIdentity> {
    accessories.iter().map(|a| a.identity).collect()
}
