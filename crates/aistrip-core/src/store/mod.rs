// ── Accessory storage ──
//
// Lock-free keyed storage backing the in-process registries.

mod collection;

pub(crate) use collection::AccessoryCollection;
