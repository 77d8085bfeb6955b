use geovc_model::{ModelError, ObjectKind};
use geovc_types::ObjectId;

/// Errors from object store and config store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The object exists but a different kind was requested.
    #[error("type mismatch for requested object: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: stored bytes hash to {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Mutating call against a read-only store.
    #[error("store is read-only")]
    ReadOnly,

    /// Operation against a closed store.
    #[error("store is closed")]
    Closed,

    /// Backend format/version mismatch discovered on open.
    #[error("repository connection refused: expected {expected}, found {found}")]
    RepositoryConnection { expected: String, found: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::TypeMismatch { expected, found } => {
                Self::TypeMismatch { expected, found }
            }
            ModelError::CorruptObject { id, reason } => Self::CorruptObject { id, reason },
            ModelError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
