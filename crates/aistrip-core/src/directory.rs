// ── Device directory ──
//
// One listing call per discovery cycle, filtered and projected to the
// devices that become accessories. Nothing is cached between calls.

use std::sync::Arc;

use tracing::debug;

use aistrip_api::AiStripClient;

use crate::error::CoreError;
use crate::model::{NormalizedDevice, normalize_devices};

/// Enumerates the supported devices on the account.
#[derive(Debug, Clone)]
pub struct DeviceDirectory {
    client: Arc<AiStripClient>,
}

impl DeviceDirectory {
    pub fn new(client: Arc<AiStripClient>) -> Self {
        Self { client }
    }

    /// Fetch and normalize the device list.
    ///
    /// Any failure (transport, status, `ok != true`, `error` set) is a
    /// [`CoreError::DirectoryFetch`]; there is no retry.
    pub async fn fetch_devices(&self) -> Result<Vec<NormalizedDevice>, CoreError> {
        let remote = self
            .client
            .list_devices()
            .await
            .map_err(|source| CoreError::DirectoryFetch { source })?;

        let devices = normalize_devices(&remote);
        debug!(
            listed = remote.len(),
            supported = devices.len(),
            "device directory fetched"
        );
        Ok(devices)
    }
}
