use geovc_types::ObjectId;

/// Errors from ref operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// The name violates the ref naming rules.
    #[error("invalid ref name: {0:?}")]
    InvalidName(String),

    /// The named ref does not exist.
    #[error("ref not found: {0}")]
    NotFound(String),

    /// A compare-and-swap observed a different value than expected.
    #[error("concurrent modification of {name}: expected {expected:?}, found {found:?}")]
    ConcurrentModification {
        name: String,
        expected: Option<ObjectId>,
        found: Option<ObjectId>,
    },

    /// Symbolic refs form a cycle or an over-long chain.
    #[error("symbolic ref chain does not terminate: {0}")]
    CircularSymbolic(String),

    /// A serialized ref line could not be parsed.
    #[error("malformed ref line: {0:?}")]
    Parse(String),
}

/// Result alias for ref operations.
pub type RefResult<T> = Result<T, RefError>;
