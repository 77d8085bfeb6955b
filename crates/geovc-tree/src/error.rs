use geovc_model::ModelError;
use geovc_store::StoreError;

/// Errors from tree construction.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A path was empty or contained empty segments.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The operation was cancelled through its progress listener.
    #[error("operation cancelled")]
    Cancelled,

    /// Failure from the backing object store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure encoding or decoding a model object.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
