// ── Outlet controller ──
//
// One per accessory. The host reads and writes the On characteristic
// synchronously, so `get`/`set` answer from a cached value and push the
// network round-trip onto a detached task. Results land in a `watch`
// channel that subscribers (the host, the CLI, tests) can observe.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use aistrip_api::AiStripClient;

use crate::error::{CoreError, KEY_HINT};
use crate::model::{AccessoryIdentity, AccessoryRecord, NormalizedDevice};

/// Marker preceding the relay flag inside `attridVal`.
const STATE_MARKER: &str = "12_";

/// Read the relay flag out of an `attridVal` string.
///
/// Takes the segment between the first and second `12_` marker: `"1"` is
/// on, anything else is off. `None` when the marker is missing.
pub fn parse_outlet_state(attrid_val: &str) -> Option<bool> {
    let mut segments = attrid_val.split(STATE_MARKER);
    segments.next();
    segments.next().map(|flag| flag == "1")
}

/// Cached On/Off state of one outlet, backed by the remote service.
///
/// Cheaply cloneable; clones share the cache and the bound device.
#[derive(Clone)]
pub struct OutletController {
    inner: Arc<OutletInner>,
}

struct OutletInner {
    client: Arc<AiStripClient>,
    identity: AccessoryIdentity,
    device: RwLock<NormalizedDevice>,
    state: watch::Sender<bool>,
}

impl OutletController {
    /// Bind a controller to `record`'s device. The cache starts off.
    pub fn new(client: Arc<AiStripClient>, record: &AccessoryRecord) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(OutletInner {
                client,
                identity: record.identity,
                device: RwLock::new(record.device().clone()),
                state,
            }),
        }
    }

    pub fn identity(&self) -> AccessoryIdentity {
        self.inner.identity
    }

    /// The device currently bound to this controller.
    pub fn device(&self) -> NormalizedDevice {
        self.inner
            .device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn device_id(&self) -> String {
        self.inner
            .device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .device_id
            .clone()
    }

    /// Replace the bound device metadata after a directory refresh.
    pub fn rebind(&self, device: NormalizedDevice) {
        let mut bound = self
            .inner
            .device
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if bound.device_id != device.device_id {
            warn!(
                from = %bound.device_id,
                to = %device.device_id,
                "outlet rebound to a different device id"
            );
        }
        *bound = device;
    }

    /// Cached state without touching the network.
    pub fn cached(&self) -> bool {
        *self.inner.state.borrow()
    }

    /// Observe cache updates.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.state.subscribe()
    }

    // ── Host-facing handlers ─────────────────────────────────────────

    /// Return the cached state and refresh it in the background.
    ///
    /// A failed refresh is logged and leaves the cache unchanged.
    pub fn get(&self) -> bool {
        let cached = self.cached();
        let this = self.clone();
        self.spawn_detached("refresh", async move {
            if let Err(e) = this.refresh().await {
                this.report(&e);
            }
        });
        cached
    }

    /// Switch the outlet in the background.
    ///
    /// The cache follows the state the service reports back, not `desired`.
    pub fn set(&self, desired: bool) {
        let this = self.clone();
        self.spawn_detached("control", async move {
            if let Err(e) = this.control(desired).await {
                this.report(&e);
            }
        });
    }

    // ── Awaitable operations ─────────────────────────────────────────

    /// Fetch the device state and update the cache.
    pub async fn refresh(&self) -> Result<bool, CoreError> {
        let device_id = self.device_id();
        let detail = self
            .inner
            .client
            .device_state(&device_id)
            .await
            .map_err(|source| CoreError::StateFetch {
                device_id: device_id.clone(),
                source,
            })?;

        let on = detail
            .attrid_val
            .as_deref()
            .and_then(parse_outlet_state)
            .ok_or_else(|| CoreError::MalformedState {
                device_id: device_id.clone(),
                value: detail.attrid_val.clone(),
            })?;

        self.publish(&device_id, on);
        Ok(on)
    }

    /// Send a control request and update the cache from the response.
    ///
    /// A response without a usable `state` field counts as off.
    pub async fn control(&self, desired: bool) -> Result<bool, CoreError> {
        let device_id = self.device_id();
        let resp = self
            .inner
            .client
            .control_device(&device_id, desired)
            .await
            .map_err(|source| CoreError::Control {
                device_id: device_id.clone(),
                source,
            })?;

        let on = resp.reported_state().unwrap_or_else(|| {
            debug!(device_id, state = ?resp.state, "control response carried no state, assuming off");
            false
        });

        self.publish(&device_id, on);
        Ok(on)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn publish(&self, device_id: &str, on: bool) {
        let previous = self.inner.state.send_replace(on);
        debug!(device_id, previous, on, "outlet state updated");
    }

    fn report(&self, err: &CoreError) {
        let device = self.device();
        match err.api_error() {
            Some(source) => error!(
                device_id = %device.device_id,
                name = %device.device_name,
                error = %source,
                "{err}, {KEY_HINT}"
            ),
            None => error!(
                device_id = %device.device_id,
                name = %device.device_name,
                "{err}, {KEY_HINT}"
            ),
        }
    }

    fn spawn_detached<F>(&self, op: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fut);
            }
            Err(_) => warn!(
                device_id = %self.device_id(),
                op,
                "no async runtime available, outlet request dropped"
            ),
        }
    }
}

impl std::fmt::Debug for OutletController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutletController")
            .field("identity", &self.inner.identity)
            .field("device", &self.device())
            .field("cached", &self.cached())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use aistrip_api::TransportConfig;

    use super::*;
    use crate::model::{IdentityScheme, NamespacedUuid};

    #[test]
    fn parses_flag_after_marker() {
        assert_eq!(parse_outlet_state("0a1b12_1"), Some(true));
        assert_eq!(parse_outlet_state("0a1b12_0"), Some(false));
        assert_eq!(parse_outlet_state("12_1"), Some(true));
    }

    #[test]
    fn only_exact_one_is_on() {
        assert_eq!(parse_outlet_state("x12_"), Some(false));
        assert_eq!(parse_outlet_state("x12_10"), Some(false));
        assert_eq!(parse_outlet_state("x12_true"), Some(false));
    }

    #[test]
    fn reads_segment_before_second_marker() {
        assert_eq!(parse_outlet_state("a12_112_0"), Some(true));
        assert_eq!(parse_outlet_state("a12_012_1"), Some(false));
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(parse_outlet_state(""), None);
        assert_eq!(parse_outlet_state("13_1"), None);
        assert_eq!(parse_outlet_state("1_2_1"), None);
    }

    fn controller() -> OutletController {
        let client = AiStripClient::new(
            Url::parse("http://127.0.0.1:9/api/fa2").unwrap(),
            &SecretString::from("k".to_string()),
            &TransportConfig::default(),
        )
        .unwrap();
        let device = NormalizedDevice::new("x1", "Lamp");
        let record = AccessoryRecord::new(NamespacedUuid::default().identity("x1"), device);
        OutletController::new(Arc::new(client), &record)
    }

    #[test]
    fn get_outside_runtime_returns_cache() {
        let outlet = controller();
        assert!(!outlet.get());
        outlet.set(true);
        assert!(!outlet.cached());
    }

    #[test]
    fn rebind_replaces_device_and_keeps_identity() {
        let outlet = controller();
        let identity = outlet.identity();
        outlet.rebind(NormalizedDevice::new("x1", "Desk Lamp"));

        assert_eq!(outlet.device().device_name, "Desk Lamp");
        assert_eq!(outlet.identity(), identity);
    }
}
