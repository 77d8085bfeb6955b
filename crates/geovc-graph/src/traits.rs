use geovc_model::RevCommit;
use geovc_types::ObjectId;

use crate::error::GraphResult;

/// Parent edges and timestamps of one registered commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
    pub id: ObjectId,
    pub parents: Vec<ObjectId>,
    /// Author timestamp, used to order history walks and break
    /// merge-base ties.
    pub timestamp_ms: i64,
}

/// Mirror of the commit DAG.
///
/// Registering a commit is idempotent: the graph is derived from
/// immutable commits, so an ID always maps to the same edges.
pub trait GraphStore: Send + Sync {
    /// Register a commit's edges. Parents need not be registered yet
    /// (bulk ingest runs in arbitrary order).
    fn register(
        &self,
        id: ObjectId,
        parents: &[ObjectId],
        timestamp_ms: i64,
    ) -> GraphResult<()>;

    fn contains(&self, id: &ObjectId) -> GraphResult<bool>;

    /// The node for `id`, or `GraphError::NotFound`.
    fn node(&self, id: &ObjectId) -> GraphResult<GraphNode>;

    /// Registered commits that list `id` as a parent, in unspecified
    /// order.
    fn children(&self, id: &ObjectId) -> GraphResult<Vec<ObjectId>>;

    /// Register from the commit itself.
    fn register_commit(&self, commit: &RevCommit) -> GraphResult<ObjectId> {
        let id = commit.id()?;
        self.register(id, &commit.parent_ids, commit.author.timestamp_ms)?;
        Ok(id)
    }
}
