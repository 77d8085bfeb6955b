//! Content-addressed object storage for GeoVC.
//!
//! This crate defines the storage seams the versioning engine is built
//! against, plus in-memory reference implementations used by tests and
//! embedding:
//!
//! - [`ObjectStore`] — get/put/delete of [`RevObject`]s keyed by content
//!   hash, with bulk variants reporting per-item outcomes through a
//!   [`BulkOpListener`]
//! - [`ConfigStore`] — small key-value store recording storage
//!   format/version negotiation
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; `put` is idempotent because
//!    content determines identity, so concurrent duplicate writes are
//!    harmless.
//! 2. `get` re-verifies the payload hash; corruption is surfaced, never
//!    repaired.
//! 3. A read-only store fails every mutating call fast, and the flag
//!    survives close/reopen of the same backing store.
//! 4. The store performs no locking beyond what its backing engine needs.
//!
//! [`RevObject`]: geovc_model::RevObject

pub mod config;
pub mod error;
pub mod listener;
pub mod memory;
pub mod traits;

pub use config::StorageFormat;
pub use error::{StoreError, StoreResult};
pub use listener::{BulkOpListener, CountingListener, NOOP_LISTENER};
pub use memory::{InMemoryConfigStore, InMemoryObjectStore};
pub use traits::{ConfigStore, Hints, ObjectStore};
