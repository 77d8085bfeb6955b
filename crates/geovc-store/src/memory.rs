use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tracing::trace;

use geovc_model::StoredObject;
use geovc_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ConfigStore, Hints, ObjectStore};

/// In-memory, HashMap-based object store.
///
/// The reference implementation of [`ObjectStore`], intended for tests
/// and embedding. All objects live behind a `RwLock`; the open flag and
/// the read-only hint are independent of the object map, so the
/// read-only mode survives close/reopen.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    open: AtomicBool,
    hints: Hints,
}

impl InMemoryObjectStore {
    /// Create a new store, already open, with default hints.
    pub fn new() -> Self {
        Self::with_hints(Hints::default())
    }

    /// Create a new store, already open, with the given hints.
    pub fn with_hints(hints: Hints) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            open: AtomicBool::new(true),
            hints,
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.size)
            .sum()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn check_writable(&self) -> StoreResult<()> {
        self.check_open()?;
        if self.hints.read_only {
            Err(StoreError::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn open(&self) -> StoreResult<()> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn get_stored(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        self.check_open()?;
        let map = self.objects.read().expect("lock poisoned");
        match map.get(id) {
            Some(stored) => {
                let computed = stored.compute_id();
                if computed != *id {
                    return Err(StoreError::HashMismatch { id: *id, computed });
                }
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    fn put_stored(&self, object: &StoredObject) -> StoreResult<bool> {
        self.check_writable()?;
        let id = object.compute_id();
        let mut map = self.objects.write().expect("lock poisoned");
        // Idempotent: identical content maps to the same ID, so a racing
        // duplicate insert leaves the store in the same final state.
        if map.contains_key(&id) {
            return Ok(false);
        }
        trace!(id = %id.short_hex(), kind = %object.kind, bytes = object.size, "stored object");
        map.insert(id, object.clone());
        Ok(true)
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        self.check_writable()?;
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .field("open", &self.is_open())
            .field("read_only", &self.hints.read_only)
            .finish()
    }
}

/// In-memory key-value config store.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get_config(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put_config(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn all_config(&self) -> StoreResult<Vec<(String, String)>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
