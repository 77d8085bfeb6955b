use std::sync::atomic::{AtomicU64, Ordering};

use geovc_types::ObjectId;

/// Receives per-item notifications during bulk store operations.
///
/// Bulk `get_all`/`put_all`/`delete_all` report each item's outcome here
/// instead of aborting the batch, so callers can drive progress bars and
/// retry only the items that failed. All methods default to no-ops.
pub trait BulkOpListener: Send + Sync {
    /// An object was found during a bulk get. `bytes` is its payload size.
    fn found(&self, _id: &ObjectId, _bytes: u64) {}

    /// An object was absent during a bulk get.
    fn not_found(&self, _id: &ObjectId) {}

    /// An object was newly inserted during a bulk put.
    fn inserted(&self, _id: &ObjectId, _bytes: u64) {}

    /// An identical object already existed during a bulk put.
    fn existed(&self, _id: &ObjectId) {}

    /// An object was removed during a bulk delete.
    fn deleted(&self, _id: &ObjectId) {}

    /// An object to delete was absent during a bulk delete.
    fn not_deleted(&self, _id: &ObjectId) {}
}

/// The no-op listener, for callers that don't track progress.
#[derive(Debug, Default)]
pub struct NoopListener;

impl BulkOpListener for NoopListener {}

/// Shared no-op listener instance.
pub static NOOP_LISTENER: NoopListener = NoopListener;

/// A listener that counts outcomes, suitable for progress reporting.
#[derive(Debug, Default)]
pub struct CountingListener {
    found: AtomicU64,
    found_bytes: AtomicU64,
    not_found: AtomicU64,
    inserted: AtomicU64,
    inserted_bytes: AtomicU64,
    existed: AtomicU64,
    deleted: AtomicU64,
    not_deleted: AtomicU64,
}

impl CountingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found_count(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    pub fn found_bytes(&self) -> u64 {
        self.found_bytes.load(Ordering::Relaxed)
    }

    pub fn not_found_count(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }

    pub fn inserted_count(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    pub fn inserted_bytes(&self) -> u64 {
        self.inserted_bytes.load(Ordering::Relaxed)
    }

    pub fn existed_count(&self) -> u64 {
        self.existed.load(Ordering::Relaxed)
    }

    pub fn deleted_count(&self) -> u64 {
        self.deleted.load(Ordering::Relaxed)
    }

    pub fn not_deleted_count(&self) -> u64 {
        self.not_deleted.load(Ordering::Relaxed)
    }
}

impl BulkOpListener for CountingListener {
    fn found(&self, _id: &ObjectId, bytes: u64) {
        self.found.fetch_add(1, Ordering::Relaxed);
        self.found_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn not_found(&self, _id: &ObjectId) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    fn inserted(&self, _id: &ObjectId, bytes: u64) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
        self.inserted_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    fn existed(&self, _id: &ObjectId) {
        self.existed.fetch_add(1, Ordering::Relaxed);
    }

    fn deleted(&self, _id: &ObjectId) {
        self.deleted.fetch_add(1, Ordering::Relaxed);
    }

    fn not_deleted(&self, _id: &ObjectId) {
        self.not_deleted.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_listener_accumulates() {
        let listener = CountingListener::new();
        let id = ObjectId::from_raw([1; 20]);

        listener.found(&id, 100);
        listener.found(&id, 50);
        listener.not_found(&id);
        listener.inserted(&id, 10);
        listener.existed(&id);
        listener.deleted(&id);
        listener.not_deleted(&id);

        assert_eq!(listener.found_count(), 2);
        assert_eq!(listener.found_bytes(), 150);
        assert_eq!(listener.not_found_count(), 1);
        assert_eq!(listener.inserted_count(), 1);
        assert_eq!(listener.inserted_bytes(), 10);
        assert_eq!(listener.existed_count(), 1);
        assert_eq!(listener.deleted_count(), 1);
        assert_eq!(listener.not_deleted_count(), 1);
    }

    #[test]
    fn noop_listener_is_silent() {
        let id = ObjectId::from_raw([2; 20]);
        NOOP_LISTENER.found(&id, 1);
        NOOP_LISTENER.not_found(&id);
    }
}
