use std::collections::BTreeMap;

use tracing::debug;

use geovc_diff::{DiffEntry, TreeDiff};
use geovc_model::{Conflict, Node, RevTree};
use geovc_store::ObjectStore;
use geovc_tree::{TreeBuilder, TreeConfig};

use crate::error::MergeResult;

/// Outcome of a three-way tree merge.
#[derive(Clone, Debug)]
pub struct MergeReport {
    /// The merged tree, already written to the store. At conflicted
    /// paths it carries the ancestor's value.
    pub tree: RevTree,
    /// Divergent changes needing manual resolution, in path order.
    pub conflicts: Vec<Conflict>,
    /// Changes applied from the "ours" side.
    pub ours_applied: u64,
    /// Changes applied from the "theirs" side (identical both-sides
    /// changes count here once, not under ours).
    pub theirs_applied: u64,
}

impl MergeReport {
    pub fn is_conflicted(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

fn index_changes(
    store: &dyn ObjectStore,
    ancestor: &RevTree,
    side: &RevTree,
) -> MergeResult<BTreeMap<String, DiffEntry>> {
    let mut changes = BTreeMap::new();
    for entry in TreeDiff::new(store, ancestor.clone(), side.clone()) {
        let entry = entry?;
        changes.insert(entry.path.clone(), entry);
    }
    Ok(changes)
}

fn target_id(entry: &DiffEntry) -> Option<(geovc_types::ObjectId, bool)> {
    entry.new.as_ref().map(|n| (n.object_id, n.is_tree()))
}

/// Merge `ours` and `theirs` against their common `ancestor`.
///
/// The result tree is built from the ancestor plus the applied changes
/// and written to the store. Two sides changing a path to the same
/// target ObjectId is not a conflict; an identical-on-both-sides delete
/// is not either.
pub fn merge_trees(
    store: &dyn ObjectStore,
    config: TreeConfig,
    ancestor: &RevTree,
    ours: &RevTree,
    theirs: &RevTree,
) -> MergeResult<MergeReport> {
    let our_changes = index_changes(store, ancestor, ours)?;
    let mut their_changes = index_changes(store, ancestor, theirs)?;

    let mut builder = TreeBuilder::for_tree(store, ancestor.clone()).with_config(config);
    let mut conflicts = Vec::new();
    let mut ours_applied = 0u64;
    let mut theirs_applied = 0u64;

    let apply = |builder: &mut TreeBuilder<'_>, path: &str, new: &Option<Node>| {
        match new {
            Some(node) => builder.put(path, node.clone()),
            None => builder.delete(path),
        }
    };

    for (path, our_entry) in &our_changes {
        match their_changes.remove(path) {
            None => {
                apply(&mut builder, path, &our_entry.new)?;
                ours_applied += 1;
            }
            Some(their_entry) => {
                if target_id(our_entry) == target_id(&their_entry) {
                    // Both sides converged on the same value (or both
                    // deleted); apply once.
                    apply(&mut builder, path, &their_entry.new)?;
                    theirs_applied += 1;
                } else {
                    conflicts.push(Conflict::new(
                        path.clone(),
                        our_entry.old.as_ref().map(|n| n.object_id),
                        our_entry.new.as_ref().map(|n| n.object_id),
                        their_entry.new.as_ref().map(|n| n.object_id),
                    ));
                }
            }
        }
    }
    for (path, their_entry) in &their_changes {
        apply(&mut builder, path, &their_entry.new)?;
        theirs_applied += 1;
    }

    let tree = builder.build()?;
    debug!(
        ours_applied,
        theirs_applied,
        conflicts = conflicts.len(),
        "three-way merge complete"
    );
    Ok(MergeReport {
        tree,
        conflicts,
        ours_applied,
        theirs_applied,
    })
}
