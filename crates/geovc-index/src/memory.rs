use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use geovc_model::{empty_tree_id, Conflict};
use geovc_types::ObjectId;

use crate::error::IndexResult;
use crate::traits::StagingStore;

/// One namespace's staging state.
#[derive(Clone, Debug)]
struct NamespaceState {
    staged_tree: ObjectId,
    work_tree: ObjectId,
    conflicts: BTreeMap<String, Conflict>,
}

impl Default for NamespaceState {
    fn default() -> Self {
        Self {
            staged_tree: empty_tree_id(),
            work_tree: empty_tree_id(),
            conflicts: BTreeMap::new(),
        }
    }
}

/// In-memory [`StagingStore`] for tests and ephemeral repositories.
#[derive(Debug, Default)]
pub struct InMemoryStagingStore {
    namespaces: RwLock<HashMap<String, NamespaceState>>,
}

impl InMemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, namespace: &str, f: impl FnOnce(Option<&NamespaceState>) -> T) -> T {
        let namespaces = self.namespaces.read().expect("lock poisoned");
        f(namespaces.get(namespace))
    }

    fn write<T>(&self, namespace: &str, f: impl FnOnce(&mut NamespaceState) -> T) -> T {
        let mut namespaces = self.namespaces.write().expect("lock poisoned");
        f(namespaces.entry(namespace.to_string()).or_default())
    }
}

impl StagingStore for InMemoryStagingStore {
    fn staged_tree(&self, namespace: &str) -> IndexResult<ObjectId> {
        Ok(self.read(namespace, |s| {
            s.map(|s| s.staged_tree).unwrap_or_else(empty_tree_id)
        }))
    }

    fn set_staged_tree(&self, namespace: &str, tree_id: ObjectId) -> IndexResult<()> {
        self.write(namespace, |s| s.staged_tree = tree_id);
        Ok(())
    }

    fn work_tree(&self, namespace: &str) -> IndexResult<ObjectId> {
        Ok(self.read(namespace, |s| {
            s.map(|s| s.work_tree).unwrap_or_else(empty_tree_id)
        }))
    }

    fn set_work_tree(&self, namespace: &str, tree_id: ObjectId) -> IndexResult<()> {
        self.write(namespace, |s| s.work_tree = tree_id);
        Ok(())
    }

    fn add_conflict(&self, namespace: &str, conflict: Conflict) -> IndexResult<()> {
        self.write(namespace, |s| {
            s.conflicts.insert(conflict.path.clone(), conflict)
        });
        Ok(())
    }

    fn get_conflict(&self, namespace: &str, path: &str) -> IndexResult<Option<Conflict>> {
        Ok(self.read(namespace, |s| {
            s.and_then(|s| s.conflicts.get(path).cloned())
        }))
    }

    fn conflicts(&self, namespace: &str, prefix: Option<&str>) -> IndexResult<Vec<Conflict>> {
        Ok(self.read(namespace, |s| {
            let Some(state) = s else {
                return Vec::new();
            };
            state
                .conflicts
                .values()
                .filter(|c| match prefix {
                    Some(p) => {
                        c.path == p
                            || c.path
                                .strip_prefix(p)
                                .is_some_and(|rest| rest.starts_with('/'))
                    }
                    None => true,
                })
                .cloned()
                .collect()
        }))
    }

    fn remove_conflict(&self, namespace: &str, path: &str) -> IndexResult<()> {
        self.write(namespace, |s| s.conflicts.remove(path));
        Ok(())
    }

    fn remove_conflicts(&self, namespace: &str) -> IndexResult<()> {
        self.write(namespace, |s| s.conflicts.clear());
        Ok(())
    }

    fn has_conflicts(&self, namespace: &str) -> IndexResult<bool> {
        Ok(self.read(namespace, |s| s.is_some_and(|s| !s.conflicts.is_empty())))
    }

    fn conflict_count(&self, namespace: &str) -> IndexResult<u64> {
        Ok(self.read(namespace, |s| {
            s.map(|s| s.conflicts.len() as u64).unwrap_or(0)
        }))
    }

    fn remove_namespace(&self, namespace: &str) -> IndexResult<()> {
        self.namespaces
            .write()
            .expect("lock poisoned")
            .remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    fn conflict(path: &str) -> Conflict {
        Conflict {
            path: path.to_string(),
            ancestor: Some(oid(1)),
            ours: Some(oid(2)),
            theirs: Some(oid(3)),
        }
    }

    #[test]
    fn unset_namespace_reads_as_empty_tree() {
        let store = InMemoryStagingStore::new();
        assert_eq!(store.staged_tree("").unwrap(), empty_tree_id());
        assert_eq!(store.work_tree("tx-1").unwrap(), empty_tree_id());
        assert!(!store.has_conflicts("").unwrap());
    }

    #[test]
    fn namespaces_are_isolated() {
        let store = InMemoryStagingStore::new();
        store.set_staged_tree("", oid(1)).unwrap();
        store.set_staged_tree("tx-1", oid(2)).unwrap();
        store.add_conflict("tx-1", conflict("roads/1")).unwrap();

        assert_eq!(store.staged_tree("").unwrap(), oid(1));
        assert_eq!(store.staged_tree("tx-1").unwrap(), oid(2));
        assert!(!store.has_conflicts("").unwrap());
        assert!(store.has_conflicts("tx-1").unwrap());
    }

    #[test]
    fn conflicts_sorted_and_prefix_filtered() {
        let store = InMemoryStagingStore::new();
        store.add_conflict("", conflict("roads/2")).unwrap();
        store.add_conflict("", conflict("poi/1")).unwrap();
        store.add_conflict("", conflict("roads/1")).unwrap();

        let all = store.conflicts("", None).unwrap();
        let paths: Vec<&str> = all.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["poi/1", "roads/1", "roads/2"]);

        let roads = store.conflicts("", Some("roads")).unwrap();
        assert_eq!(roads.len(), 2);
        assert_eq!(store.conflict_count("").unwrap(), 3);

        // Prefix matching is per segment.
        assert!(store.conflicts("", Some("road")).unwrap().is_empty());
    }

    #[test]
    fn conflict_removal() {
        let store = InMemoryStagingStore::new();
        store.add_conflict("", conflict("a")).unwrap();
        store.add_conflict("", conflict("b")).unwrap();

        store.remove_conflict("", "a").unwrap();
        assert!(store.get_conflict("", "a").unwrap().is_none());
        assert!(store.get_conflict("", "b").unwrap().is_some());

        store.remove_conflicts("").unwrap();
        assert!(!store.has_conflicts("").unwrap());
    }

    #[test]
    fn remove_namespace_discards_everything() {
        let store = InMemoryStagingStore::new();
        store.set_work_tree("tx-1", oid(5)).unwrap();
        store.add_conflict("tx-1", conflict("roads/1")).unwrap();

        store.remove_namespace("tx-1").unwrap();
        assert_eq!(store.work_tree("tx-1").unwrap(), empty_tree_id());
        assert!(!store.has_conflicts("tx-1").unwrap());
    }
}
