// ── In-memory registry ──

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::{AccessoryRegistry, PluginKey, RegistryOp, identities};
use crate::error::CoreError;
use crate::model::{AccessoryIdentity, AccessoryRecord};
use crate::store::AccessoryCollection;

/// Registry that keeps records in process memory and journals every call.
pub struct MemoryRegistry {
    accessories: AccessoryCollection,
    journal: Mutex<Vec<RegistryOp>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            accessories: AccessoryCollection::new(),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// A registry pre-populated as if `records` survived a restart.
    pub fn with_records(records: impl IntoIterator<Item = AccessoryRecord>) -> Self {
        let registry = Self::new();
        for record in records {
            registry.accessories.upsert(record);
        }
        registry
    }

    /// Current records, ordered by display name.
    pub fn snapshot(&self) -> Arc<Vec<Arc<AccessoryRecord>>> {
        self.accessories.snapshot()
    }

    pub fn get(&self, identity: &AccessoryIdentity) -> Option<Arc<AccessoryRecord>> {
        self.accessories.get(identity)
    }

    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessories.len() == 0
    }

    /// Every call made so far, oldest first.
    pub fn journal(&self) -> Vec<RegistryOp> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the journal (records are kept).
    pub fn clear_journal(&self) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Reject any of `accessories` whose identity is already registered.
    pub(super) fn ensure_unregistered(&self, accessories: &[AccessoryRecord]) -> Result<(), CoreError> {
        match accessories
            .iter()
            .find(|a| self.accessories.contains(&a.identity))
        {
            Some(dup) => Err(CoreError::Registry {
                message: format!(
                    "accessory {} ({}) is already registered",
                    dup.display_name, dup.identity
                ),
            }),
            None => Ok(()),
        }
    }

    fn record(&self, op: RegistryOp) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessoryRegistry for MemoryRegistry {
    fn restored(&self) -> Vec<AccessoryRecord> {
        self.snapshot().iter().map(|r| (**r).clone()).collect()
    }

    fn register(&self, key: &PluginKey, accessories: &[AccessoryRecord]) -> Result<(), CoreError> {
        self.ensure_unregistered(accessories)?;

        for accessory in accessories {
            self.accessories.upsert(accessory.clone());
        }
        debug!(%key, count = accessories.len(), "registered accessories");
        self.record(RegistryOp::Register(identities(accessories)));
        Ok(())
    }

    fn update(&self, accessories: &[AccessoryRecord]) -> Result<(), CoreError> {
        for accessory in accessories {
            self.accessories.upsert(accessory.clone());
        }
        self.record(RegistryOp::Update(identities(accessories)));
        Ok(())
    }

    fn unregister(
        &self,
        key: &PluginKey,
        accessories: &[AccessoryRecord],
    ) -> Result<(), CoreError> {
        for accessory in accessories {
            self.accessories.remove(&accessory.identity);
        }
        debug!(%key, count = accessories.len(), "unregistered accessories");
        self.record(RegistryOp::Unregister(identities(accessories)));
        Ok(())
    }
}
