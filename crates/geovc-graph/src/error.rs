use geovc_model::ModelError;
use geovc_types::ObjectId;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A commit was referenced but never registered.
    #[error("commit not in graph: {0}")]
    NotFound(ObjectId),

    /// Failure computing a commit's ID.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
