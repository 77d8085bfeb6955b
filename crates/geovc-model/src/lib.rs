//! The immutable, content-addressed object model for GeoVC.
//!
//! Every piece of permanent repository state is one of five object kinds,
//! each write-once and self-identified by the hash of its canonical
//! serialized form:
//!
//! - [`RevTree`] — one namespace level of a snapshot, flat or bucket-sharded
//! - [`RevFeature`] — an ordered list of optional attribute values
//! - [`RevFeatureType`] — a schema descriptor for features
//! - [`RevCommit`] — a snapshot root plus ancestry and authorship
//! - [`RevTag`] — a named, immutable pointer to a commit
//!
//! # Design Rules
//!
//! 1. Objects are immutable once constructed; identity is derived, never
//!    assigned.
//! 2. Canonical serialization sorts every collection, so the ObjectId of a
//!    tree is a pure function of its logical content regardless of
//!    construction order.
//! 3. [`Conflict`] records are *not* objects — they live in the staging
//!    area, never in the permanent store.

pub mod commit;
pub mod conflict;
pub mod error;
pub mod feature;
pub mod feature_type;
pub mod geometry;
pub mod rev_object;
pub mod stored;
pub mod tag;
pub mod tree;

pub use commit::{RevCommit, Signature};
pub use conflict::Conflict;
pub use error::{ModelError, ModelResult};
pub use feature::{AttributeValue, RevFeature};
pub use feature_type::{AttributeDescriptor, AttributeKind, RevFeatureType};
pub use geometry::{Coord, Envelope};
pub use rev_object::RevObject;
pub use stored::{ObjectKind, StoredObject};
pub use tag::RevTag;
pub use tree::{empty_tree_id, Bucket, Node, NodeKind, RevTree};
