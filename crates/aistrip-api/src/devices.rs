// Device endpoints
//
// Directory listing (`dev/all`), per-device state (`dev/{id}`) and relay
// control (`dev/{id}/control`).

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::AiStripClient;
use crate::error::Error;
use crate::models::{
    ControlRequest, ControlResponse, DeviceDetail, Envelope, RemoteDevice, truthy_message,
};

impl AiStripClient {
    /// List every device on the account, of every kind.
    ///
    /// `GET /dev/all`. The envelope must say `ok: true` and carry no
    /// `error`; anything else is an [`Error::Api`]. An entry that does not
    /// decode as a [`RemoteDevice`] is logged and dropped, the rest of the
    /// listing is kept.
    pub async fn list_devices(&self) -> Result<Vec<RemoteDevice>, Error> {
        let url = self.endpoint(&["dev", "all"])?;
        debug!("listing devices");

        let envelope: Envelope<Vec<Value>> = self.get(url).await?;
        if let Some(message) = envelope.error_message() {
            return Err(Error::Api { message });
        }
        if envelope.ok != Some(true) {
            return Err(Error::Api {
                message: "device list response was not ok".into(),
            });
        }
        let entries = envelope.data.ok_or_else(|| Error::Api {
            message: "device list response carried no data".into(),
        })?;

        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value::<RemoteDevice>(entry)
                    .inspect_err(|e| warn!(index, error = %e, "skipping undecodable device entry"))
                    .ok()
            })
            .collect())
    }

    /// Fetch the detail record of a single device.
    ///
    /// `GET /dev/{deviceId}`. This endpoint does not always set `ok`, so
    /// only an explicit `ok: false` or an `error` field is a failure.
    pub async fn device_state(&self, device_id: &str) -> Result<DeviceDetail, Error> {
        let url = self.endpoint(&["dev", device_id])?;
        debug!(device_id, "fetching device state");

        let envelope: Envelope<DeviceDetail> = self.get(url).await?;
        if let Some(message) = envelope.error_message() {
            return Err(Error::Api { message });
        }
        if envelope.ok == Some(false) {
            return Err(Error::Api {
                message: format!("state request for {device_id} was not ok"),
            });
        }
        envelope.data.ok_or_else(|| Error::Api {
            message: format!("state response for {device_id} carried no data"),
        })
    }

    /// Switch a device's relay on or off.
    ///
    /// `POST /dev/{deviceId}/control` with `{"state": 0|1, "kind": "ios"}`.
    pub async fn control_device(&self, device_id: &str, on: bool) -> Result<ControlResponse, Error> {
        let url = self.endpoint(&["dev", device_id, "control"])?;
        let body = ControlRequest::new(on);
        debug!(device_id, state = body.state, "controlling device");

        let resp: ControlResponse = self.post(url, &body).await?;
        if let Some(message) = resp.error.as_ref().and_then(truthy_message) {
            return Err(Error::Api { message });
        }
        if resp.ok == Some(false) {
            return Err(Error::Api {
                message: format!("control request for {device_id} was not ok"),
            });
        }
        Ok(resp)
    }

    /// Raw directory payload, for diagnostics.
    ///
    /// `GET /dev/all` without envelope validation.
    pub async fn list_devices_raw(&self) -> Result<Value, Error> {
        let url = self.endpoint(&["dev", "all"])?;
        self.get(url).await
    }
}
