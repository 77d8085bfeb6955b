use geovc_types::ObjectId;

use crate::stored::ObjectKind;

/// Errors from encoding, decoding, or kind-checking model objects.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An object was present but a different kind was requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
