use geovc_model::ModelError;
use geovc_store::StoreError;

/// Errors from tree comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Failure from the backing object store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure decoding a model object.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for diff operations.
pub type DiffResult<T> = Result<T, DiffError>;
