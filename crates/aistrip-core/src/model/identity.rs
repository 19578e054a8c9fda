// ── Accessory identity ──
//
// The identity is the only join key between a remote device and the
// accessory the host restored from its cache, so it must come out the same
// for the same device id on every run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an accessory in the host registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryIdentity(Uuid);

impl AccessoryIdentity {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccessoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccessoryIdentity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for AccessoryIdentity {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

/// Deterministic derivation of an identity from a seed string.
///
/// Implemented for plain closures so tests can pin exact values.
pub trait IdentityScheme: Send + Sync {
    fn identity(&self, seed: &str) -> AccessoryIdentity;
}

impl<F> IdentityScheme for F
where
    F: Fn(&str) -> AccessoryIdentity + Send + Sync,
{
    fn identity(&self, seed: &str) -> AccessoryIdentity {
        self(seed)
    }
}

/// UUIDv5 of the seed under a fixed namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespacedUuid {
    namespace: Uuid,
}

impl NamespacedUuid {
    /// Namespace of the bridge's own accessories. Never change it: every
    /// cached accessory would be dropped and re-added on the next start.
    pub const DEFAULT_NAMESPACE: Uuid = Uuid::from_u128(0x8f3c_1d52_a6e4_5b07_9c21_4e6d_0ab3_f719);

    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &Uuid {
        &self.namespace
    }
}

impl Default for NamespacedUuid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMESPACE)
    }
}

impl IdentityScheme for NamespacedUuid {
    fn identity(&self, seed: &str) -> AccessoryIdentity {
        AccessoryIdentity(Uuid::new_v5(&self.namespace, seed.as_bytes()))
    }
}
