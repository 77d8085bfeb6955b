use geovc_model::Conflict;
use geovc_types::ObjectId;

use crate::error::IndexResult;

/// Persistence for per-namespace staging state.
///
/// Each namespace holds a working-tree ID, a staged-tree ID, and the
/// unresolved conflicts of an in-progress merge. Namespaces are fully
/// isolated; the empty string is the repository's default namespace.
pub trait StagingStore: Send + Sync {
    /// The staged tree of `namespace`; the empty tree if never set.
    fn staged_tree(&self, namespace: &str) -> IndexResult<ObjectId>;

    fn set_staged_tree(&self, namespace: &str, tree_id: ObjectId) -> IndexResult<()>;

    /// The working tree of `namespace`; the empty tree if never set.
    fn work_tree(&self, namespace: &str) -> IndexResult<ObjectId>;

    fn set_work_tree(&self, namespace: &str, tree_id: ObjectId) -> IndexResult<()>;

    /// Record a conflict, replacing any previous conflict at its path.
    fn add_conflict(&self, namespace: &str, conflict: Conflict) -> IndexResult<()>;

    fn get_conflict(&self, namespace: &str, path: &str) -> IndexResult<Option<Conflict>>;

    /// Conflicts in path order, optionally restricted to a path prefix.
    fn conflicts(&self, namespace: &str, prefix: Option<&str>) -> IndexResult<Vec<Conflict>>;

    fn remove_conflict(&self, namespace: &str, path: &str) -> IndexResult<()>;

    /// Drop every conflict in `namespace`.
    fn remove_conflicts(&self, namespace: &str) -> IndexResult<()>;

    fn has_conflicts(&self, namespace: &str) -> IndexResult<bool>;

    fn conflict_count(&self, namespace: &str) -> IndexResult<u64>;

    /// Discard a namespace's entire state (transaction abort).
    fn remove_namespace(&self, namespace: &str) -> IndexResult<()>;
}
