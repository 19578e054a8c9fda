// ── Accessory collection ──
//
// Concurrent storage keyed by accessory identity, with an ordered snapshot
// held in a `watch` channel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{AccessoryIdentity, AccessoryRecord};

/// A lock-free collection of accessory records.
///
/// Every mutation rebuilds the snapshot. Snapshots are ordered by display
/// name, then identity, so listings are stable regardless of hash order.
pub(crate) struct AccessoryCollection {
    by_identity: DashMap<AccessoryIdentity, Arc<AccessoryRecord>>,

    /// Full snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<AccessoryRecord>>>>,
}

impl AccessoryCollection {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_identity: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace a record.
    pub(crate) fn upsert(&self, record: AccessoryRecord) {
        self.by_identity.insert(record.identity, Arc::new(record));
        self.rebuild_snapshot();
    }

    /// Remove a record by identity. Returns the removed record if it existed.
    pub(crate) fn remove(&self, identity: &AccessoryIdentity) -> Option<Arc<AccessoryRecord>> {
        let removed = self.by_identity.remove(identity).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    pub(crate) fn get(&self, identity: &AccessoryIdentity) -> Option<Arc<AccessoryRecord>> {
        self.by_identity.get(identity).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, identity: &AccessoryIdentity) -> bool {
        self.by_identity.contains_key(identity)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<AccessoryRecord>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_identity.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<AccessoryRecord>> = self
            .by_identity
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect();
        values.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.identity.cmp(&b.identity))
        });
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{IdentityScheme, NamespacedUuid, NormalizedDevice};

    fn record(id: &str, name: &str) -> AccessoryRecord {
        let identity = NamespacedUuid::default().identity(id);
        AccessoryRecord::new(identity, NormalizedDevice::new(id, name))
    }

    #[test]
    fn upsert_replaces_by_identity() {
        let col = AccessoryCollection::new();
        let rec = record("x1", "Lamp");
        col.upsert(rec.clone());
        col.upsert(record("x1", "Desk Lamp"));

        assert_eq!(col.len(), 1);
        assert_eq!(col.get(&rec.identity).unwrap().display_name, "Desk Lamp");
    }

    #[test]
    fn remove_drops_record_and_snapshot_entry() {
        let col = AccessoryCollection::new();
        let rec = record("x1", "Lamp");
        col.upsert(rec.clone());

        let removed = col.remove(&rec.identity).unwrap();
        assert_eq!(removed.display_name, "Lamp");
        assert!(!col.contains(&rec.identity));
        assert!(col.snapshot().is_empty());
        assert!(col.remove(&rec.identity).is_none());
    }

    #[test]
    fn snapshot_is_sorted_by_name() {
        let col = AccessoryCollection::new();
        col.upsert(record("x2", "Fan"));
        col.upsert(record("x1", "Lamp"));
        col.upsert(record("x3", "Amp"));

        let names: Vec<_> = col
            .snapshot()
            .iter()
            .map(|r| r.display_name.clone())
            .collect();
        assert_eq!(names, ["Amp", "Fan", "Lamp"]);
    }
}
