// ── Platform ──
//
// Lifecycle glue between the host and the cloud: collects accessories the
// host restored, runs discovery once the host has launched, applies the
// reconciliation plan to the registry and keeps one outlet controller per
// live accessory. Optionally re-runs discovery on an interval.

use std::slice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use indexmap::IndexMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use aistrip_api::AiStripClient;

use crate::config::PlatformConfig;
use crate::directory::DeviceDirectory;
use crate::error::{CoreError, KEY_HINT};
use crate::model::{AccessoryIdentity, AccessoryRecord, IdentityScheme, NamespacedUuid};
use crate::outlet::OutletController;
use crate::reconcile::{ReconcileOutcome, ReconcilePlan, Upsert};
use crate::registry::{AccessoryRegistry, PluginKey};

/// Bridge between one AiStrip account and one accessory registry.
///
/// Cheaply cloneable via `Arc<PlatformInner>`.
#[derive(Clone)]
pub struct Platform {
    inner: Arc<PlatformInner>,
}

struct PlatformInner {
    config: PlatformConfig,
    plugin_key: PluginKey,
    client: Arc<AiStripClient>,
    directory: DeviceDirectory,
    registry: Arc<dyn AccessoryRegistry>,
    scheme: Arc<dyn IdentityScheme>,
    known: Mutex<IndexMap<AccessoryIdentity, AccessoryRecord>>,
    controllers: DashMap<AccessoryIdentity, OutletController>,
    /// Serializes discovery cycles (startup, periodic, manual).
    cycle: tokio::sync::Mutex<()>,
    launched: watch::Sender<bool>,
    /// Set once periodic discovery has been spawned.
    refresh_started: AtomicBool,
    last_discovery: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Platform {
    /// Create a platform talking to the service described by `config`.
    ///
    /// Does not touch the network or the registry. Feed restored
    /// accessories through [`configure_accessory`](Self::configure_accessory)
    /// or [`restore_from_registry`](Self::restore_from_registry), then call
    /// [`did_finish_launching`](Self::did_finish_launching).
    pub fn new(
        config: PlatformConfig,
        registry: Arc<dyn AccessoryRegistry>,
    ) -> Result<Self, CoreError> {
        let client = AiStripClient::new(config.base_url.clone(), &config.key, &config.transport())
            .map_err(|e| CoreError::Config {
                message: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self::with_parts(
            config,
            Arc::new(client),
            registry,
            Arc::new(NamespacedUuid::default()),
        ))
    }

    /// Create a platform from pre-built parts.
    pub fn with_parts(
        config: PlatformConfig,
        client: Arc<AiStripClient>,
        registry: Arc<dyn AccessoryRegistry>,
        scheme: Arc<dyn IdentityScheme>,
    ) -> Self {
        let (launched, _) = watch::channel(false);
        let (last_discovery, _) = watch::channel(None);
        let plugin_key = config.plugin_key();

        Self {
            inner: Arc::new(PlatformInner {
                config,
                plugin_key,
                directory: DeviceDirectory::new(Arc::clone(&client)),
                client,
                registry,
                scheme,
                known: Mutex::new(IndexMap::new()),
                controllers: DashMap::new(),
                cycle: tokio::sync::Mutex::new(()),
                launched,
                refresh_started: AtomicBool::new(false),
                last_discovery,
                cancel: CancellationToken::new(),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<AiStripClient> {
        &self.inner.client
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.inner.directory
    }

    // ── Restore phase ────────────────────────────────────────────────

    /// Take over an accessory the host restored from its cache.
    ///
    /// The accessory is bound to an outlet controller straight away so the
    /// host can serve reads before discovery completes.
    pub fn configure_accessory(&self, record: AccessoryRecord) {
        info!(
            name = %record.display_name,
            identity = %record.identity,
            "Loading accessory from cache"
        );
        self.bind(&record);
        self.known().insert(record.identity, record);
    }

    /// Feed every accessory the registry restored through
    /// [`configure_accessory`](Self::configure_accessory).
    pub fn restore_from_registry(&self) -> usize {
        let restored = self.inner.registry.restored();
        let count = restored.len();
        for record in restored {
            self.configure_accessory(record);
        }
        count
    }

    // ── Launch and discovery ─────────────────────────────────────────

    /// The host finished launching: run discovery, then start periodic
    /// re-discovery if configured.
    ///
    /// Periodic discovery starts after the first call whose discovery did
    /// not fail, so a launch retried after a registry error still gets it.
    pub async fn did_finish_launching(&self) -> Result<ReconcileOutcome, CoreError> {
        let was_launched = self.inner.launched.send_replace(true);
        if was_launched {
            debug!("platform already launched");
        }
        info!(known = self.known().len(), "host finished launching, discovering devices");

        let outcome = self.discover_devices().await?;

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 && !self.inner.refresh_started.swap(true, Ordering::AcqRel) {
            let platform = self.clone();
            let cancel = self.inner.cancel.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(platform, interval_secs, cancel)));
            debug!(interval_secs, "periodic discovery started");
        }

        Ok(outcome)
    }

    /// Fetch the directory and reconcile the registry against it.
    ///
    /// A failed fetch skips the cycle and leaves every known accessory in
    /// place. Registry failures are returned.
    pub async fn discover_devices(&self) -> Result<ReconcileOutcome, CoreError> {
        if !self.is_launched() {
            return Err(CoreError::NotLaunched);
        }
        let _cycle = self.inner.cycle.lock().await;

        let fresh = match self.inner.directory.fetch_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                match e.api_error() {
                    Some(source) => error!(error = %source, "{e}, {KEY_HINT}"),
                    None => error!("{e}, {KEY_HINT}"),
                }
                return Ok(ReconcileOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let plan = ReconcilePlan::compute(&self.known(), &fresh, self.inner.scheme.as_ref());
        self.apply_plan(&plan)?;

        self.inner.last_discovery.send_replace(Some(Utc::now()));
        info!(
            devices = fresh.len(),
            added = plan.added().count(),
            updated = plan.updated().count(),
            removed = plan.remove.len(),
            "discovery complete"
        );
        Ok(ReconcileOutcome::Applied(plan))
    }

    /// Push `plan` to the registry: one batched unregister, then one call
    /// per upsert in order. Local state follows each accepted call.
    fn apply_plan(&self, plan: &ReconcilePlan) -> Result<(), CoreError> {
        let key = &self.inner.plugin_key;

        if !plan.remove.is_empty() {
            for record in &plan.remove {
                info!(name = %record.display_name, "Removing existing accessory from cache");
            }
            self.inner.registry.unregister(key, &plan.remove)?;

            let mut known = self.known();
            for record in &plan.remove {
                known.shift_remove(&record.identity);
                self.inner.controllers.remove(&record.identity);
            }
        }

        for upsert in &plan.upserts {
            let record = upsert.record();
            match upsert {
                Upsert::Update(_) => {
                    info!(name = %record.display_name, "Restoring existing accessory from cache");
                    self.inner.registry.update(slice::from_ref(record))?;
                }
                Upsert::Add(_) => {
                    info!(name = %record.display_name, "Adding new accessory");
                    self.inner.registry.register(key, slice::from_ref(record))?;
                }
            }
            self.bind(record);
            self.known().insert(record.identity, record.clone());
        }

        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn is_launched(&self) -> bool {
        *self.inner.launched.borrow()
    }

    /// Time of the last discovery cycle that reached the registry.
    pub fn last_discovery(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_discovery.borrow()
    }

    pub fn subscribe_discovery(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_discovery.subscribe()
    }

    /// Accessories currently held, in registration order.
    pub fn accessories(&self) -> Vec<AccessoryRecord> {
        self.known().values().cloned().collect()
    }

    pub fn identity_for(&self, device_id: &str) -> AccessoryIdentity {
        self.inner.scheme.identity(device_id)
    }

    pub fn controller(&self, identity: &AccessoryIdentity) -> Option<OutletController> {
        self.inner.controllers.get(identity).map(|c| c.value().clone())
    }

    pub fn controller_for_device(&self, device_id: &str) -> Option<OutletController> {
        self.controller(&self.identity_for(device_id))
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// Stop periodic discovery and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("platform shut down");
    }

    // ── Internals ────────────────────────────────────────────────────

    fn known(&self) -> std::sync::MutexGuard<'_, IndexMap<AccessoryIdentity, AccessoryRecord>> {
        self.inner
            .known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach an outlet controller to `record`, reusing an existing one.
    fn bind(&self, record: &AccessoryRecord) {
        if let Some(existing) = self.inner.controllers.get(&record.identity) {
            existing.rebind(record.device().clone());
            return;
        }
        self.inner.controllers.insert(
            record.identity,
            OutletController::new(Arc::clone(&self.inner.client), record),
        );
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically re-run discovery.
async fn refresh_task(platform: Platform, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = platform.discover_devices().await {
                    warn!(error = %e, "periodic discovery failed");
                }
            }
        }
    }
}
