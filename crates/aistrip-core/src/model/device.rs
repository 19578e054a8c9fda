use serde::{Deserialize, Serialize};
use tracing::warn;

use aistrip_api::RemoteDevice;

/// The only device kind exposed as an outlet accessory.
pub const SUPPORTED_DEVICE_TYPE: &str = "AiStrip";

/// A supported remote device, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDevice {
    pub device_id: String,
    pub device_name: String,
}

impl NormalizedDevice {
    pub fn new(device_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            device_name: device_name.into(),
        }
    }

    /// Project a directory entry, or `None` if it is not a supported strip
    /// or has no outlet id.
    pub fn from_remote(remote: &RemoteDevice) -> Option<Self> {
        if remote.device_type != SUPPORTED_DEVICE_TYPE {
            return None;
        }
        let Some(device_id) = remote.outlet_id.clone().filter(|id| !id.is_empty()) else {
            warn!(extra = ?remote.extra, "skipping AiStrip entry without an outlet id");
            return None;
        };
        let device_name = remote
            .outlet_name
            .clone()
            .unwrap_or_else(|| device_id.clone());
        Some(Self {
            device_id,
            device_name,
        })
    }
}

/// Filter a directory listing down to supported devices, in listing order.
pub fn normalize_devices(remote: &[RemoteDevice]) -> Vec<NormalizedDevice> {
    remote.iter().filter_map(NormalizedDevice::from_remote).collect()
}
