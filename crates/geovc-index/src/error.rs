use geovc_diff::DiffError;
use geovc_model::ModelError;
use geovc_store::StoreError;
use geovc_tree::TreeError;

/// Errors from staging operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Failure from the backing object store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure building a revision tree.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Failure walking a diff.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Failure decoding a model object.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for staging operations.
pub type IndexResult<T> = Result<T, IndexError>;
