use geovc_diff::DiffError;
use geovc_graph::GraphError;
use geovc_index::IndexError;
use geovc_merge::MergeError;
use geovc_model::ModelError;
use geovc_refs::RefError;
use geovc_store::StoreError;
use geovc_tree::TreeError;

use crate::exchange::ExchangeError;

/// Errors from repository-level operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A commit was attempted while conflicts remain unresolved.
    #[error("cannot commit: {count} unresolved conflict(s)")]
    ConflictsExist { count: u64 },

    /// The staged tree matches the current head and no merge is pending.
    #[error("nothing to commit")]
    NothingToCommit,

    /// A revision string resolved to no known ref or commit.
    #[error("cannot resolve revision: {0:?}")]
    RevNotFound(String),

    /// No conflict is recorded at the given path.
    #[error("no conflict at path: {0:?}")]
    NoConflictAt(String),

    /// The operation needs an existing repository.
    #[error("not in a repository")]
    NoRepository,

    /// A mutating operation was dispatched against a read-only context.
    #[error("operation requires write access")]
    ReadOnly,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
