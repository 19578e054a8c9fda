use serde::{Deserialize, Serialize};

use super::device::NormalizedDevice;
use super::identity::AccessoryIdentity;

const MANUFACTURER: &str = "FamilyAsyst";
const MODEL: &str = "AiStrip";

/// Accessory-information characteristics shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryInfo {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub name: String,
}

impl AccessoryInfo {
    pub fn for_device(device: &NormalizedDevice) -> Self {
        Self {
            manufacturer: MANUFACTURER.into(),
            model: MODEL.into(),
            serial_number: device.device_id.clone(),
            name: device.device_name.clone(),
        }
    }
}

/// Free-form per-accessory data persisted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryContext {
    pub device: NormalizedDevice,
}

/// An accessory as the host registry stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryRecord {
    pub identity: AccessoryIdentity,
    pub display_name: String,
    pub context: AccessoryContext,
    pub info: AccessoryInfo,
}

impl AccessoryRecord {
    pub fn new(identity: AccessoryIdentity, device: NormalizedDevice) -> Self {
        Self {
            identity,
            display_name: device.device_name.clone(),
            info: AccessoryInfo::for_device(&device),
            context: AccessoryContext { device },
        }
    }

    /// The remote device this accessory is bound to.
    pub fn device(&self) -> &NormalizedDevice {
        &self.context.device
    }

    /// Copy of this record carrying `device`'s current metadata.
    pub fn refreshed(&self, device: &NormalizedDevice) -> Self {
        Self {
            identity: self.identity,
            display_name: device.device_name.clone(),
            info: AccessoryInfo::for_device(device),
            context: AccessoryContext {
                device: device.clone(),
            },
        }
    }
}
