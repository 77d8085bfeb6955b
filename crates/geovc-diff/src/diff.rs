use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use geovc_model::{Node, RevTree};
use geovc_store::ObjectStore;
use geovc_types::ObjectId;

use crate::entry::{ChangeType, DiffEntry};
use crate::error::DiffResult;
use crate::filter::PathFilter;

/// Pending work for the lazy walk. Tasks on the stack are ordered so
/// that popping yields entries in ascending path order.
enum Task {
    Emit(DiffEntry),
    /// Both sides have a subtree here with different IDs.
    Compare {
        path: String,
        old_id: ObjectId,
        new_id: ObjectId,
    },
    /// A subtree present only on the old side: everything beneath it is
    /// removed.
    ExpandOld { path: String, tree_id: ObjectId },
    /// A subtree present only on the new side: everything beneath it is
    /// added.
    ExpandNew { path: String, tree_id: ObjectId },
}

/// Lazy comparison of two revision trees.
///
/// Yields one [`DiffEntry`] per changed feature in ascending full-path
/// order. Subtrees and shards whose ObjectIds match on both sides are
/// skipped without being read from the store. Within a bucketed level
/// only the entries of differing shards are materialized, so memory is
/// bounded by the size of the change at one level, not by the snapshots.
pub struct TreeDiff<'a> {
    store: &'a dyn ObjectStore,
    filter: PathFilter,
    roots: Option<(RevTree, RevTree)>,
    stack: Vec<Task>,
}

impl<'a> TreeDiff<'a> {
    pub fn new(store: &'a dyn ObjectStore, old: RevTree, new: RevTree) -> Self {
        Self {
            store,
            filter: PathFilter::all(),
            roots: Some((old, new)),
            stack: Vec::new(),
        }
    }

    /// Restrict the walk to paths matching `filter`. Non-matching
    /// subtrees are pruned before they are read.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Gather the possibly-changed entries of one namespace level into
    /// name-sorted maps. When both sides are bucketed, shards with equal
    /// IDs are omitted from both maps symmetrically; otherwise both
    /// sides are flattened in full.
    fn collect_changed(
        &self,
        old: &RevTree,
        new: &RevTree,
        old_map: &mut BTreeMap<String, Node>,
        new_map: &mut BTreeMap<String, Node>,
    ) -> DiffResult<()> {
        if old.is_bucketed() && new.is_bucketed() {
            let indices: BTreeSet<u32> = old
                .buckets
                .keys()
                .chain(new.buckets.keys())
                .copied()
                .collect();
            for idx in indices {
                match (old.buckets.get(&idx), new.buckets.get(&idx)) {
                    (Some(a), Some(b)) if a.tree_id == b.tree_id => {}
                    (a, b) => {
                        let old_shard = match a {
                            Some(bucket) => self.store.get_tree(&bucket.tree_id)?,
                            None => RevTree::empty(),
                        };
                        let new_shard = match b {
                            Some(bucket) => self.store.get_tree(&bucket.tree_id)?,
                            None => RevTree::empty(),
                        };
                        self.collect_changed(&old_shard, &new_shard, old_map, new_map)?;
                    }
                }
            }
            return Ok(());
        }
        self.collect_entries(old, old_map)?;
        self.collect_entries(new, new_map)?;
        Ok(())
    }

    /// All direct entries of a level, resolving through shards.
    fn collect_entries(&self, tree: &RevTree, out: &mut BTreeMap<String, Node>) -> DiffResult<()> {
        for node in &tree.entries {
            out.insert(node.name.clone(), node.clone());
        }
        for bucket in tree.buckets.values() {
            let shard = self.store.get_tree(&bucket.tree_id)?;
            self.collect_entries(&shard, out)?;
        }
        Ok(())
    }

    /// Merge-walk one level's changed entries into tasks.
    fn compare_level(&mut self, prefix: &str, old: &RevTree, new: &RevTree) -> DiffResult<()> {
        let mut old_map = BTreeMap::new();
        let mut new_map = BTreeMap::new();
        self.collect_changed(old, new, &mut old_map, &mut new_map)?;
        trace!(
            prefix,
            old_side = old_map.len(),
            new_side = new_map.len(),
            "comparing level"
        );

        let names: BTreeSet<String> = old_map.keys().chain(new_map.keys()).cloned().collect();
        let mut tasks = Vec::new();
        for name in names {
            let path = join(prefix, &name);
            match (old_map.remove(&name), new_map.remove(&name)) {
                (Some(o), Some(n)) => {
                    if o == n {
                        continue;
                    }
                    match (o.is_tree(), n.is_tree()) {
                        (true, true) => {
                            if o.object_id != n.object_id {
                                tasks.push(Task::Compare {
                                    path,
                                    old_id: o.object_id,
                                    new_id: n.object_id,
                                });
                            }
                        }
                        (true, false) => {
                            // A namespace became a feature: the feature's
                            // own path sorts before its former children.
                            tasks.push(Task::Emit(DiffEntry::added(path.clone(), n)));
                            tasks.push(Task::ExpandOld {
                                path,
                                tree_id: o.object_id,
                            });
                        }
                        (false, true) => {
                            tasks.push(Task::Emit(DiffEntry::removed(path.clone(), o)));
                            tasks.push(Task::ExpandNew {
                                path,
                                tree_id: n.object_id,
                            });
                        }
                        (false, false) => {
                            tasks.push(Task::Emit(DiffEntry::modified(path, o, n)));
                        }
                    }
                }
                (Some(o), None) => {
                    if o.is_tree() {
                        tasks.push(Task::ExpandOld {
                            path,
                            tree_id: o.object_id,
                        });
                    } else {
                        tasks.push(Task::Emit(DiffEntry::removed(path, o)));
                    }
                }
                (None, Some(n)) => {
                    if n.is_tree() {
                        tasks.push(Task::ExpandNew {
                            path,
                            tree_id: n.object_id,
                        });
                    } else {
                        tasks.push(Task::Emit(DiffEntry::added(path, n)));
                    }
                }
                (None, None) => unreachable!("name drawn from one of the maps"),
            }
        }
        self.stack.extend(tasks.into_iter().rev());
        Ok(())
    }

    fn process_compare(
        &mut self,
        path: &str,
        old_id: ObjectId,
        new_id: ObjectId,
    ) -> DiffResult<()> {
        if old_id == new_id || !self.filter.may_contain(path) {
            return Ok(());
        }
        let old = self.store.get_tree(&old_id)?;
        let new = self.store.get_tree(&new_id)?;
        self.compare_level(path, &old, &new)
    }

    /// One side's subtree with no counterpart: every leaf beneath it is
    /// an add (or a removal, for the old side).
    fn process_expand(&mut self, path: &str, tree_id: ObjectId, removed: bool) -> DiffResult<()> {
        if !self.filter.may_contain(path) {
            return Ok(());
        }
        let tree = self.store.get_tree(&tree_id)?;
        let mut entries = BTreeMap::new();
        self.collect_entries(&tree, &mut entries)?;

        let mut tasks = Vec::new();
        for (name, node) in entries {
            let child_path = join(path, &name);
            if node.is_tree() {
                tasks.push(if removed {
                    Task::ExpandOld {
                        path: child_path,
                        tree_id: node.object_id,
                    }
                } else {
                    Task::ExpandNew {
                        path: child_path,
                        tree_id: node.object_id,
                    }
                });
            } else {
                tasks.push(Task::Emit(if removed {
                    DiffEntry::removed(child_path, node)
                } else {
                    DiffEntry::added(child_path, node)
                }));
            }
        }
        self.stack.extend(tasks.into_iter().rev());
        Ok(())
    }
}

impl Iterator for TreeDiff<'_> {
    type Item = DiffResult<DiffEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((old, new)) = self.roots.take() {
            if let Err(e) = self.compare_level("", &old, &new) {
                return Some(Err(e));
            }
        }
        loop {
            match self.stack.pop()? {
                Task::Emit(entry) => {
                    if self.filter.matches(&entry.path) {
                        return Some(Ok(entry));
                    }
                }
                Task::Compare {
                    path,
                    old_id,
                    new_id,
                } => {
                    if let Err(e) = self.process_compare(&path, old_id, new_id) {
                        return Some(Err(e));
                    }
                }
                Task::ExpandOld { path, tree_id } => {
                    if let Err(e) = self.process_expand(&path, tree_id, true) {
                        return Some(Err(e));
                    }
                }
                Task::ExpandNew { path, tree_id } => {
                    if let Err(e) = self.process_expand(&path, tree_id, false) {
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Change totals between two snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: u64,
    pub removed: u64,
    pub modified: u64,
}

impl DiffStats {
    pub fn total(&self) -> u64 {
        self.added + self.removed + self.modified
    }
}

/// Count changed features without collecting the entries.
pub fn diff_count(
    store: &dyn ObjectStore,
    old: &RevTree,
    new: &RevTree,
    filter: &PathFilter,
) -> DiffResult<DiffStats> {
    let mut stats = DiffStats::default();
    for entry in TreeDiff::new(store, old.clone(), new.clone()).with_filter(filter.clone()) {
        match entry?.change_type() {
            ChangeType::Added => stats.added += 1,
            ChangeType::Removed => stats.removed += 1,
            ChangeType::Modified => stats.modified += 1,
        }
    }
    Ok(stats)
}
