use geovc_model::{RevCommit, RevFeature, RevFeatureType, RevObject, RevTag, RevTree, StoredObject};
use geovc_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::listener::BulkOpListener;

/// Open-time hints for a store instance.
///
/// `read_only` is a process-wide toggle on the instance: every mutating
/// call checks it, and it persists across close/reopen of the same
/// backing store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hints {
    pub read_only: bool,
}

impl Hints {
    pub fn read_only() -> Self {
        Self { read_only: true }
    }
}

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; content determines identity.
/// - `put` is idempotent: duplicate writes of identical content are
///   harmless, including racing writers.
/// - Concurrent reads and writes are safe without external locking.
/// - `get` verifies stored bytes against the requested hash; corruption
///   is surfaced, never repaired.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Open the store. Idempotent.
    fn open(&self) -> StoreResult<()>;

    /// Close the store. Subsequent operations fail with `Closed` until
    /// reopened. The read-only hint survives close/reopen.
    fn close(&self) -> StoreResult<()>;

    /// Returns `true` if the store is open.
    fn is_open(&self) -> bool;

    /// Read an object's raw storage envelope.
    ///
    /// Returns `Ok(None)` if the object does not exist. Implementations
    /// must verify the payload hash and fail with `HashMismatch` on
    /// corruption.
    fn get_stored(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write a raw storage envelope. Returns `true` if newly inserted.
    fn put_stored(&self, object: &StoredObject) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    ///
    /// Intended for garbage collection only; deleting referenced objects
    /// corrupts the repository.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    // -----------------------------------------------------------------
    // Decoded access
    // -----------------------------------------------------------------

    /// Read and decode an object, failing with `NotFound` if absent.
    fn get(&self, id: &ObjectId) -> StoreResult<RevObject> {
        self.get_if_present(id)?
            .ok_or(StoreError::NotFound(*id))
    }

    /// Read and decode an object; `Ok(None)` for absence.
    fn get_if_present(&self, id: &ObjectId) -> StoreResult<Option<RevObject>> {
        match self.get_stored(id)? {
            Some(stored) => Ok(Some(RevObject::from_stored_object(&stored)?)),
            None => Ok(None),
        }
    }

    /// Encode and write an object. Returns `true` if newly inserted,
    /// `false` if an identical object already existed.
    fn put(&self, object: &RevObject) -> StoreResult<bool> {
        self.put_stored(&object.to_stored_object()?)
    }

    /// Typed read: revision tree.
    fn get_tree(&self, id: &ObjectId) -> StoreResult<RevTree> {
        Ok(self.get(id)?.into_tree()?)
    }

    /// Typed read: feature payload.
    fn get_feature(&self, id: &ObjectId) -> StoreResult<RevFeature> {
        Ok(self.get(id)?.into_feature()?)
    }

    /// Typed read: feature-type schema.
    fn get_feature_type(&self, id: &ObjectId) -> StoreResult<RevFeatureType> {
        Ok(self.get(id)?.into_feature_type()?)
    }

    /// Typed read: commit.
    fn get_commit(&self, id: &ObjectId) -> StoreResult<RevCommit> {
        Ok(self.get(id)?.into_commit()?)
    }

    /// Typed read: tag.
    fn get_tag(&self, id: &ObjectId) -> StoreResult<RevTag> {
        Ok(self.get(id)?.into_tag()?)
    }

    /// Returns `true` if an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.get_stored(id)?.is_some())
    }

    // -----------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------

    /// Read many objects, reporting each found/not-found item to the
    /// listener. A missing item never aborts the batch.
    fn get_all(
        &self,
        ids: &[ObjectId],
        listener: &dyn BulkOpListener,
    ) -> StoreResult<Vec<Option<RevObject>>> {
        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_stored(id)? {
                Some(stored) => {
                    listener.found(id, stored.size);
                    result.push(Some(RevObject::from_stored_object(&stored)?));
                }
                None => {
                    listener.not_found(id);
                    result.push(None);
                }
            }
        }
        Ok(result)
    }

    /// Write many objects, reporting each inserted/existed item to the
    /// listener. Returns the IDs in input order.
    fn put_all(
        &self,
        objects: &[RevObject],
        listener: &dyn BulkOpListener,
    ) -> StoreResult<Vec<ObjectId>> {
        let mut ids = Vec::with_capacity(objects.len());
        for object in objects {
            let stored = object.to_stored_object()?;
            let id = stored.compute_id();
            if self.put_stored(&stored)? {
                listener.inserted(&id, stored.size);
            } else {
                listener.existed(&id);
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Delete many objects, reporting each deleted/not-deleted item to
    /// the listener. Returns the number actually deleted.
    fn delete_all(
        &self,
        ids: &[ObjectId],
        listener: &dyn BulkOpListener,
    ) -> StoreResult<usize> {
        let mut count = 0;
        for id in ids {
            if self.delete(id)? {
                listener.deleted(id);
                count += 1;
            } else {
                listener.not_deleted(id);
            }
        }
        Ok(count)
    }
}

/// Small key-value store for repository configuration.
///
/// Records storage format/version negotiation
/// (`storage.<kind>=<name>`, `<name>.version=<semver>`) and any other
/// repository-scoped settings. Keys are flat dotted strings.
pub trait ConfigStore: Send + Sync {
    /// Read a config value.
    fn get_config(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a config value.
    fn put_config(&self, key: &str, value: &str) -> StoreResult<()>;

    /// All config entries, sorted by key.
    fn all_config(&self) -> StoreResult<Vec<(String, String)>>;
}
