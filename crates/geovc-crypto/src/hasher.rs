use geovc_types::{ObjectId, OBJECT_ID_LEN};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"geovc-tree-v1"`) prepended to
/// every hash computation, so objects of different kinds with identical
/// bytes produce different [`ObjectId`]s. The 256-bit BLAKE3 output is
/// truncated to the 160-bit ObjectId width.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for revision tree objects.
    pub const TREE: Self = Self {
        domain: "geovc-tree-v1",
    };
    /// Hasher for feature payload objects.
    pub const FEATURE: Self = Self {
        domain: "geovc-feature-v1",
    };
    /// Hasher for feature-type schema objects.
    pub const FEATURE_TYPE: Self = Self {
        domain: "geovc-featuretype-v1",
    };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        domain: "geovc-commit-v1",
    };
    /// Hasher for tag objects.
    pub const TAG: Self = Self {
        domain: "geovc-tag-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        let digest = hasher.finalize();
        let mut raw = [0u8; OBJECT_ID_LEN];
        raw.copy_from_slice(&digest.as_bytes()[..OBJECT_ID_LEN]);
        ObjectId::from_raw(raw)
    }

    /// Hash a serializable value as canonical JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<ObjectId, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected object ID.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
