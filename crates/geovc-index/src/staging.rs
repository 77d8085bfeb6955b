use tracing::debug;

use geovc_diff::{diff_count, DiffStats, PathFilter, TreeDiff};
use geovc_model::{empty_tree_id, Conflict, Node, RevTree};
use geovc_store::ObjectStore;
use geovc_tree::{find_node, TreeBuilder, TreeConfig};
use geovc_types::ObjectId;

use crate::error::IndexResult;
use crate::traits::StagingStore;

/// The staging pipeline of one namespace: working tree, staged tree, and
/// the conflict set.
///
/// Edits land in the working tree; [`stage`](StagingArea::stage) promotes
/// them to the staged tree, clearing any conflict at a staged path.
pub struct StagingArea<'a> {
    objects: &'a dyn ObjectStore,
    staging: &'a dyn StagingStore,
    namespace: String,
    config: TreeConfig,
}

impl<'a> StagingArea<'a> {
    /// The default namespace's staging area.
    pub fn new(objects: &'a dyn ObjectStore, staging: &'a dyn StagingStore) -> Self {
        Self {
            objects,
            staging,
            namespace: String::new(),
            config: TreeConfig::default(),
        }
    }

    /// Operate in an isolated transaction namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // The empty tree is well-known and not necessarily stored.
    fn load_tree(&self, id: ObjectId) -> IndexResult<RevTree> {
        if id == empty_tree_id() {
            return Ok(RevTree::empty());
        }
        Ok(self.objects.get_tree(&id)?)
    }

    /// The current working tree.
    pub fn work_tree(&self) -> IndexResult<RevTree> {
        let id = self.staging.work_tree(&self.namespace)?;
        self.load_tree(id)
    }

    /// The current staged tree.
    pub fn staged_tree(&self) -> IndexResult<RevTree> {
        let id = self.staging.staged_tree(&self.namespace)?;
        self.load_tree(id)
    }

    /// Upsert a feature node into the working tree.
    pub fn insert(&self, path: &str, node: Node) -> IndexResult<()> {
        self.apply(std::iter::once((path.to_string(), Some(node))))
    }

    /// Remove a path from the working tree.
    pub fn remove(&self, path: &str) -> IndexResult<()> {
        self.apply(std::iter::once((path.to_string(), None)))
    }

    /// Apply a batch of working-tree edits in one tree rebuild.
    pub fn apply(
        &self,
        edits: impl IntoIterator<Item = (String, Option<Node>)>,
    ) -> IndexResult<()> {
        let work = self.work_tree()?;
        let mut builder = TreeBuilder::for_tree(self.objects, work).with_config(self.config);
        for (path, edit) in edits {
            match edit {
                Some(node) => builder.put(&path, node)?,
                None => builder.delete(&path)?,
            }
        }
        let tree = builder.build()?;
        self.staging.set_work_tree(&self.namespace, tree.id()?)?;
        Ok(())
    }

    /// Look up a node in the working tree by full path.
    pub fn find(&self, path: &str) -> IndexResult<Option<Node>> {
        let mut tree = self.work_tree()?;
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let Some(node) = find_node(self.objects, &self.config, &tree, segment)? else {
                return Ok(None);
            };
            if segments.peek().is_none() {
                return Ok(Some(node));
            }
            if !node.is_tree() {
                return Ok(None);
            }
            tree = self.objects.get_tree(&node.object_id)?;
        }
        Ok(None)
    }

    /// Promote working-tree changes matching `filter` to the staged tree.
    /// Conflicts at staged paths are considered resolved and dropped.
    /// Returns the number of staged changes.
    pub fn stage(&self, filter: &PathFilter) -> IndexResult<u64> {
        let staged = self.staged_tree()?;
        let work = self.work_tree()?;

        let mut edits = Vec::new();
        for entry in
            TreeDiff::new(self.objects, staged.clone(), work).with_filter(filter.clone())
        {
            let entry = entry?;
            edits.push((entry.path, entry.new));
        }
        if edits.is_empty() {
            return Ok(0);
        }

        let mut builder = TreeBuilder::for_tree(self.objects, staged).with_config(self.config);
        for (path, edit) in &edits {
            match edit {
                Some(node) => builder.put(path, node.clone())?,
                None => builder.delete(path)?,
            }
            self.staging.remove_conflict(&self.namespace, path)?;
        }
        let tree = builder.build()?;
        self.staging.set_staged_tree(&self.namespace, tree.id()?)?;
        debug!(
            namespace = %self.namespace,
            count = edits.len(),
            "staged working-tree changes"
        );
        Ok(edits.len() as u64)
    }

    /// Counts of working-tree changes not yet staged.
    pub fn unstaged(&self, filter: &PathFilter) -> IndexResult<DiffStats> {
        let staged = self.staged_tree()?;
        let work = self.work_tree()?;
        Ok(diff_count(self.objects, &staged, &work, filter)?)
    }

    /// Counts of staged changes relative to a head tree.
    pub fn staged(&self, head: &RevTree, filter: &PathFilter) -> IndexResult<DiffStats> {
        let staged = self.staged_tree()?;
        Ok(diff_count(self.objects, head, &staged, filter)?)
    }

    /// Point the staged tree at `tree` (already stored), leaving the
    /// working tree alone.
    pub fn reset_staged_to(&self, tree: &RevTree) -> IndexResult<()> {
        self.staging.set_staged_tree(&self.namespace, tree.id()?)?;
        Ok(())
    }

    /// Point both trees at `tree` (checkout / hard reset).
    pub fn reset_to(&self, tree: &RevTree) -> IndexResult<()> {
        let id = tree.id()?;
        self.staging.set_staged_tree(&self.namespace, id)?;
        self.staging.set_work_tree(&self.namespace, id)?;
        Ok(())
    }

    /// Discard working-tree changes, restoring it to the staged tree.
    pub fn discard_work(&self) -> IndexResult<()> {
        let id = self.staging.staged_tree(&self.namespace)?;
        self.staging.set_work_tree(&self.namespace, id)?;
        Ok(())
    }

    // ---- conflicts ----

    pub fn add_conflict(&self, conflict: Conflict) -> IndexResult<()> {
        self.staging.add_conflict(&self.namespace, conflict)
    }

    pub fn conflict(&self, path: &str) -> IndexResult<Option<Conflict>> {
        self.staging.get_conflict(&self.namespace, path)
    }

    pub fn conflicts(&self, prefix: Option<&str>) -> IndexResult<Vec<Conflict>> {
        self.staging.conflicts(&self.namespace, prefix)
    }

    pub fn has_conflicts(&self) -> IndexResult<bool> {
        self.staging.has_conflicts(&self.namespace)
    }

    pub fn conflict_count(&self) -> IndexResult<u64> {
        self.staging.conflict_count(&self.namespace)
    }

    pub fn clear_conflicts(&self) -> IndexResult<()> {
        self.staging.remove_conflicts(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStagingStore;
    use geovc_store::InMemoryObjectStore;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    fn setup() -> (InMemoryObjectStore, InMemoryStagingStore) {
        (InMemoryObjectStore::new(), InMemoryStagingStore::new())
    }

    #[test]
    fn fresh_area_is_empty() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);
        assert!(area.work_tree().unwrap().is_empty());
        assert!(area.staged_tree().unwrap().is_empty());
        assert_eq!(area.unstaged(&PathFilter::all()).unwrap().total(), 0);
    }

    #[test]
    fn insert_then_stage_then_count() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.insert("roads/1", Node::feature("", oid(1))).unwrap();
        area.insert("roads/2", Node::feature("", oid(2))).unwrap();
        assert_eq!(area.unstaged(&PathFilter::all()).unwrap().added, 2);

        let staged = area.stage(&PathFilter::all()).unwrap();
        assert_eq!(staged, 2);
        assert_eq!(area.unstaged(&PathFilter::all()).unwrap().total(), 0);

        let head = RevTree::empty();
        assert_eq!(area.staged(&head, &PathFilter::all()).unwrap().added, 2);
    }

    #[test]
    fn partial_stage_with_filter() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.insert("roads/1", Node::feature("", oid(1))).unwrap();
        area.insert("poi/1", Node::feature("", oid(2))).unwrap();

        let staged = area.stage(&PathFilter::paths(["roads"])).unwrap();
        assert_eq!(staged, 1);

        let remaining = area.unstaged(&PathFilter::all()).unwrap();
        assert_eq!(remaining.added, 1);
        assert!(area.find("poi/1").unwrap().is_some());
    }

    #[test]
    fn staging_a_path_resolves_its_conflict() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.add_conflict(Conflict {
            path: "roads/1".to_string(),
            ancestor: Some(oid(1)),
            ours: Some(oid(2)),
            theirs: Some(oid(3)),
        })
        .unwrap();
        area.add_conflict(Conflict {
            path: "poi/1".to_string(),
            ancestor: None,
            ours: Some(oid(4)),
            theirs: Some(oid(5)),
        })
        .unwrap();

        area.insert("roads/1", Node::feature("", oid(2))).unwrap();
        area.stage(&PathFilter::all()).unwrap();

        assert!(area.conflict("roads/1").unwrap().is_none());
        assert!(area.conflict("poi/1").unwrap().is_some());
        assert_eq!(area.conflict_count().unwrap(), 1);
    }

    #[test]
    fn remove_propagates_through_stage() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.insert("roads/1", Node::feature("", oid(1))).unwrap();
        area.stage(&PathFilter::all()).unwrap();

        area.remove("roads/1").unwrap();
        assert_eq!(area.unstaged(&PathFilter::all()).unwrap().removed, 1);

        area.stage(&PathFilter::all()).unwrap();
        assert!(area.staged_tree().unwrap().is_empty());
    }

    #[test]
    fn discard_work_restores_staged_state() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.insert("roads/1", Node::feature("", oid(1))).unwrap();
        area.stage(&PathFilter::all()).unwrap();
        area.insert("roads/2", Node::feature("", oid(2))).unwrap();

        area.discard_work().unwrap();
        assert!(area.find("roads/2").unwrap().is_none());
        assert!(area.find("roads/1").unwrap().is_some());
        assert_eq!(area.unstaged(&PathFilter::all()).unwrap().total(), 0);
    }

    #[test]
    fn namespaced_areas_do_not_interfere() {
        let (objects, staging) = setup();
        let main = StagingArea::new(&objects, &staging);
        let tx = StagingArea::new(&objects, &staging).with_namespace("tx-1");

        main.insert("roads/1", Node::feature("", oid(1))).unwrap();
        tx.insert("roads/1", Node::feature("", oid(9))).unwrap();
        tx.insert("poi/1", Node::feature("", oid(2))).unwrap();

        assert_eq!(
            main.find("roads/1").unwrap().unwrap().object_id,
            oid(1)
        );
        assert_eq!(tx.find("roads/1").unwrap().unwrap().object_id, oid(9));
        assert!(main.find("poi/1").unwrap().is_none());
    }

    #[test]
    fn batch_apply_is_one_rebuild() {
        let (objects, staging) = setup();
        let area = StagingArea::new(&objects, &staging);

        area.apply(vec![
            ("roads/1".to_string(), Some(Node::feature("", oid(1)))),
            ("roads/2".to_string(), Some(Node::feature("", oid(2)))),
            ("poi/1".to_string(), Some(Node::feature("", oid(3)))),
        ])
        .unwrap();
        area.apply(vec![("roads/2".to_string(), None)]).unwrap();

        let work = area.work_tree().unwrap();
        assert_eq!(work.size, 2);
        assert!(area.find("roads/2").unwrap().is_none());
    }
}
