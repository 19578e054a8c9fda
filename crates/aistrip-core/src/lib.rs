// aistrip-core: Accessory reconciliation and outlet control between the
// AiStrip cloud and an accessory host.

pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod outlet;
pub mod platform;
pub mod reconcile;
pub mod registry;
mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PLATFORM_NAME, PLUGIN_NAME, PlatformConfig};
pub use directory::DeviceDirectory;
pub use error::CoreError;
pub use outlet::{OutletController, parse_outlet_state};
pub use platform::Platform;
pub use reconcile::{ReconcileOutcome, ReconcilePlan, Upsert};
pub use registry::{AccessoryRegistry, FileRegistry, MemoryRegistry, PluginKey, RegistryOp};

pub use model::{
    AccessoryContext, AccessoryIdentity, AccessoryInfo, AccessoryRecord, IdentityScheme,
    NamespacedUuid, NormalizedDevice, SUPPORTED_DEVICE_TYPE,
};

pub use aistrip_api::{AiStripClient, DEFAULT_BASE_URL};
