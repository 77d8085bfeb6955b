use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::geometry::Envelope;
use crate::stored::{ObjectKind, StoredObject};

/// What a tree node points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A nested namespace level (a child `RevTree`).
    Tree,
    /// A leaf feature payload (a `RevFeature`).
    Feature,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Feature => write!(f, "feature"),
        }
    }
}

/// A named entry within a revision tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Entry name, unique within its namespace level.
    pub name: String,
    /// Content-addressed ID of the referenced tree or feature.
    pub object_id: ObjectId,
    /// Whether this entry is a subtree or a leaf feature.
    pub kind: NodeKind,
    /// Feature-type schema reference, when the target carries one.
    pub metadata_id: Option<ObjectId>,
    /// Bounding envelope of the referenced content, when spatial.
    pub envelope: Option<Envelope>,
}

impl Node {
    /// A leaf feature node.
    pub fn feature(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            object_id,
            kind: NodeKind::Feature,
            metadata_id: None,
            envelope: None,
        }
    }

    /// A subtree node.
    pub fn tree(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            name: name.into(),
            object_id,
            kind: NodeKind::Tree,
            metadata_id: None,
            envelope: None,
        }
    }

    /// Attach a feature-type reference.
    pub fn with_metadata(mut self, metadata_id: ObjectId) -> Self {
        self.metadata_id = Some(metadata_id);
        self
    }

    /// Attach a bounding envelope.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Returns `true` for subtree nodes.
    pub fn is_tree(&self) -> bool {
        self.kind == NodeKind::Tree
    }

    /// Returns `true` for leaf feature nodes.
    pub fn is_feature(&self) -> bool {
        self.kind == NodeKind::Feature
    }
}

/// One hash-partitioned shard of a bucketed tree level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// ID of the child `RevTree` holding this shard's entries.
    pub tree_id: ObjectId,
    /// Leaf feature count beneath this shard.
    pub size: u64,
    /// Union envelope of the shard's entries, when spatial.
    pub envelope: Option<Envelope>,
}

impl Bucket {
    pub fn new(tree_id: ObjectId, size: u64) -> Self {
        Self {
            tree_id,
            size,
            envelope: None,
        }
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

/// One namespace level of a snapshot: a Merkle tree node.
///
/// Holds either a flat, name-sorted entry list (small levels) or up to
/// `bucket_fanout` hash-partitioned [`Bucket`] shards (large levels) —
/// never both. The empty tree holds neither and has a well-known ID
/// ([`empty_tree_id`]).
///
/// The ObjectId of a `RevTree` is a pure function of its normalized
/// content: entries are kept name-sorted and buckets keyed by index in a
/// `BTreeMap`, so construction order never affects identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevTree {
    /// Leaf feature nodes reachable beneath this tree, through both
    /// subtree nodes and buckets. O(1) size queries depend on this.
    pub size: u64,
    /// Direct child TREE nodes at this namespace level (through buckets).
    pub num_trees: u32,
    /// Flat form: name-sorted entries. Empty when bucketed.
    pub entries: Vec<Node>,
    /// Sharded form: bucket index → shard. Empty when flat.
    pub buckets: BTreeMap<u32, Bucket>,
}

impl RevTree {
    /// The empty tree (zero entries, zero buckets).
    pub fn empty() -> Self {
        Self {
            size: 0,
            num_trees: 0,
            entries: Vec::new(),
            buckets: BTreeMap::new(),
        }
    }

    /// A flat tree from entries plus precomputed totals.
    ///
    /// `size` must count leaf features reachable beneath the entries
    /// (recursing through subtree nodes); `num_trees` counts the direct
    /// TREE entries. Entries are sorted by name here, making the
    /// serialized form canonical regardless of input order.
    pub fn flat(mut entries: Vec<Node>, size: u64, num_trees: u32) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            size,
            num_trees,
            entries,
            buckets: BTreeMap::new(),
        }
    }

    /// A flat tree whose entries are all leaf feature nodes.
    pub fn leaf(entries: Vec<Node>) -> Self {
        debug_assert!(entries.iter().all(Node::is_feature));
        let size = entries.len() as u64;
        Self::flat(entries, size, 0)
    }

    /// A bucketed tree from shards plus precomputed totals.
    pub fn bucketed(buckets: BTreeMap<u32, Bucket>, size: u64, num_trees: u32) -> Self {
        Self {
            size,
            num_trees,
            entries: Vec::new(),
            buckets,
        }
    }

    /// Returns `true` if this is the empty tree.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.buckets.is_empty()
    }

    /// Returns `true` if this level is bucket-sharded.
    pub fn is_bucketed(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Look up a direct entry by name. Flat trees only; bucketed levels
    /// require shard resolution through a store.
    pub fn entry(&self, name: &str) -> Option<&Node> {
        self.entries
            .binary_search_by(|n| n.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Union envelope across entries or buckets.
    pub fn envelope(&self) -> Option<Envelope> {
        let mut result = None;
        for node in &self.entries {
            result = Envelope::union(result, node.envelope);
        }
        for bucket in self.buckets.values() {
            result = Envelope::union(result, bucket.envelope);
        }
        result
    }

    /// The content-addressed ID of this tree.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(ModelError::TypeMismatch {
                expected: ObjectKind::Tree,
                found: obj.kind,
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| ModelError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}

/// The well-known ID of the empty tree, computed once per process.
pub fn empty_tree_id() -> ObjectId {
    static EMPTY_ID: OnceLock<ObjectId> = OnceLock::new();
    *EMPTY_ID.get_or_init(|| {
        RevTree::empty()
            .id()
            .expect("empty tree serialization is infallible")
    })
}
