// ── File-backed registry ──
//
// A `MemoryRegistry` backed by a JSON cache file, so accessories survive
// process restarts the way a host's own accessory cache would. Each mutation
// writes the resulting record set first and only then applies it in memory;
// a failed write leaves both at the previous state.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AccessoryRegistry, MemoryRegistry, PluginKey, RegistryOp};
use crate::error::CoreError;
use crate::model::{AccessoryIdentity, AccessoryRecord};

const CACHE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    accessories: Vec<AccessoryRecord>,
}

/// Registry persisted to a JSON file.
pub struct FileRegistry {
    path: PathBuf,
    inner: MemoryRegistry,
    /// Held across write-then-apply.
    write_lock: Mutex<()>,
}

impl FileRegistry {
    /// Open the cache at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let cache: CacheFile = serde_json::from_str(&contents)?;
                if cache.version != CACHE_FORMAT_VERSION {
                    return Err(CoreError::Registry {
                        message: format!(
                            "unsupported cache version {} in {}",
                            cache.version,
                            path.display()
                        ),
                    });
                }
                cache.accessories
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), count = records.len(), "opened accessory cache");
        Ok(Self {
            path,
            inner: MemoryRegistry::with_records(records),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal(&self) -> Vec<RegistryOp> {
        self.inner.journal()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The record set after dropping `removed` and upserting `upserts`.
    fn candidate(
        &self,
        upserts: &[AccessoryRecord],
        removed: &[AccessoryRecord],
    ) -> Vec<AccessoryRecord> {
        let mut records: IndexMap<AccessoryIdentity, AccessoryRecord> = self
            .inner
            .restored()
            .into_iter()
            .map(|r| (r.identity, r))
            .collect();
        for record in removed {
            records.shift_remove(&record.identity);
        }
        for record in upserts {
            records.insert(record.identity, record.clone());
        }
        records.into_values().collect()
    }

    /// Write `accessories`, replacing the file atomically.
    fn persist(&self, accessories: Vec<AccessoryRecord>) -> Result<(), CoreError> {
        let cache = CacheFile {
            version: CACHE_FORMAT_VERSION,
            accessories,
        };
        let json = serde_json::to_string_pretty(&cache)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), count = cache.accessories.len(), "accessory cache written");
        Ok(())
    }
}

impl AccessoryRegistry for FileRegistry {
    fn restored(&self) -> Vec<AccessoryRecord> {
        self.inner.restored()
    }

    fn register(&self, key: &PluginKey, accessories: &[AccessoryRecord]) -> Result<(), CoreError> {
        let _guard = self.lock();
        self.inner.ensure_unregistered(accessories)?;
        self.persist(self.candidate(accessories, &[]))?;
        self.inner.register(key, accessories)
    }

    fn update(&self, accessories: &[AccessoryRecord]) -> Result<(), CoreError> {
        let _guard = self.lock();
        self.persist(self.candidate(accessories, &[]))?;
        self.inner.update(accessories)
    }

    fn unregister(
        &self,
        key: &PluginKey,
        accessories: &[AccessoryRecord],
    ) -> Result<(), CoreError> {
        let _guard = self.lock();
        self.persist(self.candidate(&[], accessories))?;
        self.inner.unregister(key, accessories)
    }
}
