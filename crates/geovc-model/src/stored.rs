use serde::{Deserialize, Serialize};

use geovc_crypto::ContentHasher;
use geovc_types::ObjectId;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// One namespace level of a snapshot (flat or bucket-sharded).
    Tree,
    /// A feature payload: ordered optional attribute values.
    Feature,
    /// A feature-type schema descriptor.
    FeatureType,
    /// A commit: snapshot root plus ancestry and authorship.
    Commit,
    /// A named, immutable pointer to a commit.
    Tag,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Feature => write!(f, "feature"),
            Self::FeatureType => write!(f, "featuretype"),
            Self::Commit => write!(f, "commit"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// A stored object: kind tag + canonical serialized payload + cached size.
///
/// `StoredObject` is the unit of storage and of wire exchange. Storage
/// backends never interpret `data` — they are pure key-value stores keyed
/// by content hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The canonical serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and canonical payload bytes.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    ///
    /// Uses the domain-separated hasher for the object's kind.
    pub fn compute_id(&self) -> ObjectId {
        self.hasher().hash(&self.data)
    }

    /// Verify that the payload bytes hash to `expected`.
    pub fn verify_id(&self, expected: &ObjectId) -> bool {
        self.hasher().verify(&self.data, expected)
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self.kind {
            ObjectKind::Tree => &ContentHasher::TREE,
            ObjectKind::Feature => &ContentHasher::FEATURE,
            ObjectKind::FeatureType => &ContentHasher::FEATURE_TYPE,
            ObjectKind::Commit => &ContentHasher::COMMIT,
            ObjectKind::Tag => &ContentHasher::TAG,
        }
    }
}
