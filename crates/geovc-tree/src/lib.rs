//! Revision tree construction for GeoVC.
//!
//! [`TreeBuilder`] turns a stream of `(path, Option<Node>)` edits against a
//! (possibly empty) starting tree into a new, normalized [`RevTree`],
//! writing every new subtree and shard to the object store.
//!
//! # Invariants
//!
//! - Determinism: the same final set of (path → Node) pairs produces
//!   byte-identical serialized trees, and therefore the same ObjectId,
//!   regardless of edit order.
//! - Structural sharing: shards and subtrees untouched by edits are
//!   carried by ObjectId, never re-read, re-hashed, or re-written.
//! - Sharding: a level with more than
//!   [`TreeConfig::normalization_threshold`] entries is partitioned into
//!   at most [`TreeConfig::bucket_fanout`] hash-keyed shards, recursively.
//!
//! [`RevTree`]: geovc_model::RevTree

pub mod builder;
pub mod error;
pub mod order;
pub mod progress;

pub use builder::{find_node, TreeBuilder, TreeConfig};
pub use error::{TreeError, TreeResult};
pub use order::bucket_index;
pub use progress::{CancelFlag, NoopProgress, ProgressListener, NOOP_PROGRESS};
