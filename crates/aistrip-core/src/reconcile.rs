// ── Accessory reconciliation ──
//
// Pure set-diff between the accessories the host restored and the devices
// the directory just returned. Applying the plan is the platform's job;
// nothing here touches a registry or the network.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::warn;

use crate::model::{AccessoryIdentity, AccessoryRecord, IdentityScheme, NormalizedDevice};

/// One step of the upsert pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// A known accessory, refreshed with the device's current metadata.
    Update(AccessoryRecord),
    /// A new accessory for a device with no known identity.
    Add(AccessoryRecord),
}

impl Upsert {
    pub fn record(&self) -> &AccessoryRecord {
        match self {
            Self::Update(r) | Self::Add(r) => r,
        }
    }
}

/// What a reconciliation cycle will do, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Known accessories with no matching device. Unregistered as one batch.
    pub remove: Vec<AccessoryRecord>,
    /// One entry per distinct fresh device, in directory order.
    pub upserts: Vec<Upsert>,
}

impl ReconcilePlan {
    /// Diff `known` against `fresh`.
    ///
    /// Duplicate device ids in `fresh` collapse to their first occurrence,
    /// so no identity is ever planned twice.
    pub fn compute(
        known: &IndexMap<AccessoryIdentity, AccessoryRecord>,
        fresh: &[NormalizedDevice],
        scheme: &dyn IdentityScheme,
    ) -> Self {
        let mut seen: HashSet<AccessoryIdentity> = HashSet::with_capacity(fresh.len());
        let mut targets: Vec<(AccessoryIdentity, &NormalizedDevice)> =
            Vec::with_capacity(fresh.len());

        for device in fresh {
            let identity = scheme.identity(&device.device_id);
            if seen.insert(identity) {
                targets.push((identity, device));
            } else {
                warn!(device_id = %device.device_id, "device listed twice, ignoring repeat");
            }
        }

        let remove = known
            .values()
            .filter(|record| !seen.contains(&record.identity))
            .cloned()
            .collect();

        let upserts = targets
            .into_iter()
            .map(|(identity, device)| match known.get(&identity) {
                Some(existing) => Upsert::Update(existing.refreshed(device)),
                None => Upsert::Add(AccessoryRecord::new(identity, device.clone())),
            })
            .collect();

        Self { remove, upserts }
    }

    pub fn added(&self) -> impl Iterator<Item = &AccessoryRecord> {
        self.upserts.iter().filter_map(|u| match u {
            Upsert::Add(r) => Some(r),
            Upsert::Update(_) => None,
        })
    }

    pub fn updated(&self) -> impl Iterator<Item = &AccessoryRecord> {
        self.upserts.iter().filter_map(|u| match u {
            Upsert::Update(r) => Some(r),
            Upsert::Add(_) => None,
        })
    }

    /// `true` when the cycle registers and unregisters nothing.
    pub fn is_steady(&self) -> bool {
        self.remove.is_empty() && self.added().next().is_none()
    }
}

/// Result of one discovery cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The directory could not be fetched; known accessories were left alone.
    Skipped { reason: String },
    /// The plan was applied to the registry.
    Applied(ReconcilePlan),
}

impl ReconcileOutcome {
    pub fn plan(&self) -> Option<&ReconcilePlan> {
        match self {
            Self::Applied(plan) => Some(plan),
            Self::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Key records by identity, keeping their order.
pub fn index_by_identity(
    records: impl IntoIterator<Item = AccessoryRecord>,
) -> IndexMap<AccessoryIdentity, AccessoryRecord> {
    records.into_iter().map(|r| (r.identity, r)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::model::NamespacedUuid;

    fn scheme() -> NamespacedUuid {
        NamespacedUuid::default()
    }

    fn device(id: &str, name: &str) -> NormalizedDevice {
        NormalizedDevice::new(id, name)
    }

    fn known(devices: &[NormalizedDevice]) -> IndexMap<AccessoryIdentity, AccessoryRecord> {
        index_by_identity(
            devices
                .iter()
                .map(|d| AccessoryRecord::new(scheme().identity(&d.device_id), d.clone())),
        )
    }

    fn ids<'a>(records: impl Iterator<Item = &'a AccessoryRecord>) -> Vec<String> {
        records.map(|r| r.device().device_id.clone()).collect()
    }

    #[test]
    fn empty_known_adds_every_device() {
        let fresh = vec![device("x1", "Lamp"), device("x2", "Fan"), device("x3", "Heater")];
        let plan = ReconcilePlan::compute(&IndexMap::new(), &fresh, &scheme());

        assert!(plan.remove.is_empty());
        assert_eq!(ids(plan.added()), ["x1", "x2", "x3"]);
        assert_eq!(plan.updated().count(), 0);
    }

    #[test]
    fn duplicate_device_ids_add_once() {
        let fresh = vec![device("x1", "Lamp"), device("x1", "Lamp copy"), device("x2", "Fan")];
        let plan = ReconcilePlan::compute(&IndexMap::new(), &fresh, &scheme());

        assert_eq!(ids(plan.added()), ["x1", "x2"]);
        assert_eq!(plan.added().next().unwrap().display_name, "Lamp");
    }

    #[test]
    fn same_devices_twice_is_steady() {
        let fresh = vec![device("x1", "Lamp"), device("x2", "Fan")];
        let plan = ReconcilePlan::compute(&known(&fresh), &fresh, &scheme());

        assert!(plan.is_steady());
        assert_eq!(ids(plan.updated()), ["x1", "x2"]);
    }

    #[test]
    fn removes_exactly_the_unmatched() {
        let prior = vec![device("a", "A"), device("b", "B"), device("c", "C")];
        let fresh = vec![device("b", "B"), device("d", "D")];
        let plan = ReconcilePlan::compute(&known(&prior), &fresh, &scheme());

        assert_eq!(ids(plan.remove.iter()), ["a", "c"]);
        assert_eq!(ids(plan.updated()), ["b"]);
        assert_eq!(ids(plan.added()), ["d"]);
    }

    #[test]
    fn empty_fresh_removes_everything() {
        let prior = vec![device("a", "A"), device("b", "B")];
        let plan = ReconcilePlan::compute(&known(&prior), &[], &scheme());

        assert_eq!(ids(plan.remove.iter()), ["a", "b"]);
        assert!(plan.upserts.is_empty());
    }

    #[test]
    fn rename_is_an_update_with_new_metadata() {
        let prior = vec![device("x1", "Lamp")];
        let fresh = vec![device("x1", "Reading Lamp")];
        let plan = ReconcilePlan::compute(&known(&prior), &fresh, &scheme());

        let updated: Vec<_> = plan.updated().collect();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].identity, scheme().identity("x1"));
        assert_eq!(updated[0].display_name, "Reading Lamp");
        assert_eq!(updated[0].info.name, "Reading Lamp");
    }

    #[test]
    fn upserts_follow_directory_order() {
        let prior = vec![device("b", "B")];
        let fresh = vec![device("c", "C"), device("b", "B"), device("a", "A")];
        let plan = ReconcilePlan::compute(&known(&prior), &fresh, &scheme());

        let order: Vec<_> = plan
            .upserts
            .iter()
            .map(|u| match u {
                Upsert::Add(r) => format!("add:{}", r.device().device_id),
                Upsert::Update(r) => format!("update:{}", r.device().device_id),
            })
            .collect();
        assert_eq!(order, ["add:c", "update:b", "add:a"]);
    }

    #[test]
    fn injected_scheme_decides_matching() {
        // Every seed maps to the same identity: all devices collapse into one.
        let constant = |_: &str| AccessoryIdentity::from(Uuid::nil());
        let fresh = vec![device("x1", "Lamp"), device("x2", "Fan")];
        let plan = ReconcilePlan::compute(&IndexMap::new(), &fresh, &constant);

        let added: Vec<_> = plan.added().collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].identity, AccessoryIdentity::from(Uuid::nil()));
    }

    #[test]
    fn skipped_outcome_has_no_plan() {
        let outcome = ReconcileOutcome::Skipped {
            reason: "fetch failed".into(),
        };
        assert!(outcome.is_skipped());
        assert!(outcome.plan().is_none());
    }
}
