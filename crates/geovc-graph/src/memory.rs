use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use geovc_types::ObjectId;

use crate::error::{GraphError, GraphResult};
use crate::traits::{GraphNode, GraphStore};

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<ObjectId, GraphNode>,
    children: HashMap<ObjectId, HashSet<ObjectId>>,
}

/// In-memory [`GraphStore`] for tests and ephemeral repositories.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphStore for InMemoryGraphStore {
    fn register(
        &self,
        id: ObjectId,
        parents: &[ObjectId],
        timestamp_ms: i64,
    ) -> GraphResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        for parent in parents {
            state.children.entry(*parent).or_default().insert(id);
        }
        state.nodes.insert(
            id,
            GraphNode {
                id,
                parents: parents.to_vec(),
                timestamp_ms,
            },
        );
        Ok(())
    }

    fn contains(&self, id: &ObjectId) -> GraphResult<bool> {
        Ok(self
            .state
            .read()
            .expect("lock poisoned")
            .nodes
            .contains_key(id))
    }

    fn node(&self, id: &ObjectId) -> GraphResult<GraphNode> {
        self.state
            .read()
            .expect("lock poisoned")
            .nodes
            .get(id)
            .cloned()
            .ok_or(GraphError::NotFound(*id))
    }

    fn children(&self, id: &ObjectId) -> GraphResult<Vec<ObjectId>> {
        Ok(self
            .state
            .read()
            .expect("lock poisoned")
            .children
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    #[test]
    fn register_and_query() {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(1), &[], 100).unwrap();
        graph.register(oid(2), &[oid(1)], 200).unwrap();

        assert!(graph.contains(&oid(1)).unwrap());
        assert!(!graph.contains(&oid(9)).unwrap());

        let node = graph.node(&oid(2)).unwrap();
        assert_eq!(node.parents, vec![oid(1)]);
        assert_eq!(node.timestamp_ms, 200);

        assert_eq!(graph.children(&oid(1)).unwrap(), vec![oid(2)]);
        assert!(graph.children(&oid(2)).unwrap().is_empty());
    }

    #[test]
    fn register_is_idempotent() {
        let graph = InMemoryGraphStore::new();
        graph.register(oid(2), &[oid(1)], 200).unwrap();
        graph.register(oid(2), &[oid(1)], 200).unwrap();
        assert_eq!(graph.children(&oid(1)).unwrap().len(), 1);
    }

    #[test]
    fn missing_node_is_an_error() {
        let graph = InMemoryGraphStore::new();
        assert!(matches!(
            graph.node(&oid(7)),
            Err(GraphError::NotFound(_))
        ));
    }
}
