// ── Domain model ──
//
// Remote devices, the identities derived from them, and the accessory
// records the host registry keeps across restarts.

pub mod accessory;
pub mod device;
pub mod identity;

pub use accessory::{AccessoryContext, AccessoryInfo, AccessoryRecord};
pub use device::{NormalizedDevice, SUPPORTED_DEVICE_TYPE, normalize_devices};
pub use identity::{AccessoryIdentity, IdentityScheme, NamespacedUuid};
