use geovc_diff::DiffError;
use geovc_model::ModelError;
use geovc_store::StoreError;
use geovc_tree::TreeError;

/// Errors from merge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Failure from the backing object store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Failure walking one of the side diffs.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Failure building the merged tree.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Failure decoding a model object.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
