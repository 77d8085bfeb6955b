use std::collections::BTreeMap;

use tracing::{debug, trace};

use geovc_model::{Bucket, Node, RevObject, RevTree};
use geovc_store::ObjectStore;

use crate::error::{TreeError, TreeResult};
use crate::order::{bucket_index, MAX_SHARD_DEPTH};
use crate::progress::{ProgressListener, NOOP_PROGRESS};

/// Sharding parameters for tree normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum entries a level holds before it is bucket-sharded.
    pub normalization_threshold: usize,
    /// Maximum shards per bucketed level.
    pub bucket_fanout: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            normalization_threshold: 512,
            bucket_fanout: 32,
        }
    }
}

/// Builds a new, normalized [`RevTree`] from edits against a starting tree.
///
/// Edits are `(path, Option<Node>)` pairs: `put` upserts an entry, `delete`
/// removes one. Slash-separated paths materialize intermediate namespace
/// levels automatically, and levels that end up empty vanish from the
/// result. All new subtrees and shards are written to the store during
/// [`build`](TreeBuilder::build).
///
/// # Collapse policy
///
/// Incremental edits against a bucketed level keep it bucketed even when
/// deletions leave it under-filled (empty shards are dropped, a fully
/// empty level becomes the empty tree). Only a from-scratch build of a
/// level re-decides flat vs. sharded by entry count. This preserves
/// structural sharing across deletions; within any single build, edit
/// order never affects the output.
pub struct TreeBuilder<'a> {
    store: &'a dyn ObjectStore,
    config: TreeConfig,
    base: RevTree,
    root: LevelBuilder,
}

/// Pending edits for one namespace level.
///
/// A name can carry both a direct edit and nested edits beneath it (a
/// namespace replaced by a feature, or the reverse). A direct put wins
/// over nested edits; a direct delete makes the nested edits rebuild the
/// namespace from an empty base.
#[derive(Default)]
struct LevelBuilder {
    edits: BTreeMap<String, Option<Node>>,
    children: BTreeMap<String, LevelBuilder>,
}

impl<'a> TreeBuilder<'a> {
    /// A builder starting from the empty tree.
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self::for_tree(store, RevTree::empty())
    }

    /// A builder starting from an existing tree.
    pub fn for_tree(store: &'a dyn ObjectStore, base: RevTree) -> Self {
        Self {
            store,
            config: TreeConfig::default(),
            base,
            root: LevelBuilder::default(),
        }
    }

    /// Override the sharding parameters.
    pub fn with_config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// The sharding parameters in effect.
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Upsert an entry. The node's name is taken from the path's last
    /// segment.
    pub fn put(&mut self, path: &str, mut node: Node) -> TreeResult<()> {
        let (level, leaf) = self.level_for(path)?;
        node.name = leaf.clone();
        level.edits.insert(leaf, Some(node));
        Ok(())
    }

    /// Remove the entry at `path`, if present.
    pub fn delete(&mut self, path: &str) -> TreeResult<()> {
        let (level, leaf) = self.level_for(path)?;
        level.edits.insert(leaf, None);
        Ok(())
    }

    /// Build the result tree, writing new subtrees to the store. Drains
    /// the pending edits; the builder can be reused against the same base.
    pub fn build(&mut self) -> TreeResult<RevTree> {
        self.build_with_progress(&NOOP_PROGRESS)
    }

    /// Like [`build`](TreeBuilder::build), reporting progress at shard
    /// granularity and honoring cancellation.
    pub fn build_with_progress(
        &mut self,
        progress: &dyn ProgressListener,
    ) -> TreeResult<RevTree> {
        if progress.is_cancelled() {
            return Err(TreeError::Cancelled);
        }
        let root = std::mem::take(&mut self.root);
        let base = self.base.clone();
        let tree = self.build_level(root, base, progress)?;
        self.store.put(&RevObject::Tree(tree.clone()))?;
        debug!(
            size = tree.size,
            num_trees = tree.num_trees,
            bucketed = tree.is_bucketed(),
            "built revision tree"
        );
        Ok(tree)
    }

    fn level_for(&mut self, path: &str) -> TreeResult<(&mut LevelBuilder, String)> {
        let segments: Vec<&str> = path.split('/').collect();
        if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(TreeError::InvalidPath(path.to_string()));
        }
        let mut level = &mut self.root;
        for segment in &segments[..segments.len() - 1] {
            level = level.children.entry((*segment).to_string()).or_default();
        }
        Ok((level, segments[segments.len() - 1].to_string()))
    }

    fn build_level(
        &self,
        level: LevelBuilder,
        base: RevTree,
        progress: &dyn ProgressListener,
    ) -> TreeResult<RevTree> {
        let LevelBuilder {
            mut edits,
            children,
        } = level;

        // Resolve nested namespace builders into edits at this level.
        for (name, child) in children {
            let direct = edits.get(&name);
            if matches!(direct, Some(Some(_))) {
                // The whole entry is being replaced; nested edits are moot.
                continue;
            }
            let deleted = matches!(direct, Some(None));
            let base_node = find_node(self.store, &self.config, &base, &name)?;
            let (child_base, metadata_id) = match &base_node {
                Some(n) if n.is_tree() && !deleted => {
                    (self.store.get_tree(&n.object_id)?, n.metadata_id)
                }
                _ => (RevTree::empty(), None),
            };
            let child_tree = self.build_level(child, child_base, progress)?;
            if child_tree.is_empty() {
                edits.insert(name, None);
            } else {
                self.store.put(&RevObject::Tree(child_tree.clone()))?;
                let mut node = Node::tree(name.clone(), child_tree.id()?);
                node.metadata_id = metadata_id;
                node.envelope = child_tree.envelope();
                edits.insert(name, Some(node));
            }
        }

        self.apply_level(&base, edits, 0, progress)
    }

    fn apply_level(
        &self,
        base: &RevTree,
        edits: BTreeMap<String, Option<Node>>,
        depth: usize,
        progress: &dyn ProgressListener,
    ) -> TreeResult<RevTree> {
        if edits.is_empty() {
            return Ok(base.clone());
        }
        if progress.is_cancelled() {
            return Err(TreeError::Cancelled);
        }

        if !base.is_bucketed() {
            let mut merged: BTreeMap<String, Node> = base
                .entries
                .iter()
                .map(|n| (n.name.clone(), n.clone()))
                .collect();
            for (name, edit) in edits {
                match edit {
                    Some(node) => {
                        merged.insert(name, node);
                    }
                    None => {
                        merged.remove(&name);
                    }
                }
            }
            return self.build_from_entries(merged.into_values().collect(), depth, progress);
        }

        // Bucketed level: only shards hit by edits are loaded and rebuilt;
        // the rest are carried by ObjectId (structural sharing).
        let mut by_shard: BTreeMap<u32, BTreeMap<String, Option<Node>>> = BTreeMap::new();
        for (name, edit) in edits {
            let idx = bucket_index(&name, depth, self.config.bucket_fanout);
            by_shard.entry(idx).or_default().insert(name, edit);
        }

        let mut buckets = base.buckets.clone();
        let mut size = i128::from(base.size);
        let mut num_trees = i64::from(base.num_trees);

        for (idx, shard_edits) in by_shard {
            let shard_base = match buckets.get(&idx) {
                Some(bucket) => self.store.get_tree(&bucket.tree_id)?,
                None => RevTree::empty(),
            };
            let shard = self.apply_level(&shard_base, shard_edits, depth + 1, progress)?;

            size += i128::from(shard.size) - i128::from(shard_base.size);
            num_trees += i64::from(shard.num_trees) - i64::from(shard_base.num_trees);

            if shard.is_empty() {
                buckets.remove(&idx);
            } else {
                self.store.put(&RevObject::Tree(shard.clone()))?;
                let mut bucket = Bucket::new(shard.id()?, shard.size);
                bucket.envelope = shard.envelope();
                trace!(shard = idx, size = shard.size, "rebuilt shard");
                buckets.insert(idx, bucket);
            }

            progress.progress(1);
            if progress.is_cancelled() {
                return Err(TreeError::Cancelled);
            }
        }

        if buckets.is_empty() {
            return Ok(RevTree::empty());
        }
        Ok(RevTree::bucketed(buckets, size as u64, num_trees as u32))
    }

    /// Normalize a full entry set for one level: flat below the threshold,
    /// hash-sharded above it.
    fn build_from_entries(
        &self,
        entries: Vec<Node>,
        depth: usize,
        progress: &dyn ProgressListener,
    ) -> TreeResult<RevTree> {
        if entries.is_empty() {
            return Ok(RevTree::empty());
        }

        if entries.len() <= self.config.normalization_threshold || depth >= MAX_SHARD_DEPTH {
            let mut size = 0u64;
            let mut num_trees = 0u32;
            for node in &entries {
                if node.is_tree() {
                    num_trees += 1;
                    size += self.store.get_tree(&node.object_id)?.size;
                } else {
                    size += 1;
                }
            }
            return Ok(RevTree::flat(entries, size, num_trees));
        }

        let mut partitions: BTreeMap<u32, Vec<Node>> = BTreeMap::new();
        for node in entries {
            let idx = bucket_index(&node.name, depth, self.config.bucket_fanout);
            partitions.entry(idx).or_default().push(node);
        }

        let mut buckets = BTreeMap::new();
        let mut size = 0u64;
        let mut num_trees = 0u32;
        for (idx, group) in partitions {
            let shard = self.build_from_entries(group, depth + 1, progress)?;
            self.store.put(&RevObject::Tree(shard.clone()))?;
            size += shard.size;
            num_trees += shard.num_trees;
            let mut bucket = Bucket::new(shard.id()?, shard.size);
            bucket.envelope = shard.envelope();
            buckets.insert(idx, bucket);

            progress.progress(1);
            if progress.is_cancelled() {
                return Err(TreeError::Cancelled);
            }
        }
        Ok(RevTree::bucketed(buckets, size, num_trees))
    }
}

/// Look up a direct entry by name, resolving through shard levels.
pub fn find_node(
    store: &dyn ObjectStore,
    config: &TreeConfig,
    tree: &RevTree,
    name: &str,
) -> TreeResult<Option<Node>> {
    find_node_at(store, config, tree, name, 0)
}

fn find_node_at(
    store: &dyn ObjectStore,
    config: &TreeConfig,
    tree: &RevTree,
    name: &str,
    depth: usize,
) -> TreeResult<Option<Node>> {
    if !tree.is_bucketed() {
        return Ok(tree.entry(name).cloned());
    }
    let idx = bucket_index(name, depth, config.bucket_fanout);
    match tree.buckets.get(&idx) {
        Some(bucket) => {
            let shard = store.get_tree(&bucket.tree_id)?;
            find_node_at(store, config, &shard, name, depth + 1)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geovc_model::empty_tree_id;
    use geovc_store::InMemoryObjectStore;
    use geovc_types::ObjectId;
    use proptest::prelude::*;

    use crate::progress::CancelFlag;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    fn small_config() -> TreeConfig {
        TreeConfig {
            normalization_threshold: 2,
            bucket_fanout: 4,
        }
    }

    /// Find three names where the first and third share a shard at depth 0
    /// and the second lands elsewhere, for the structural-sharing scenario.
    fn colliding_names(fanout: u32) -> (String, String, String) {
        let names: Vec<String> = (0..64).map(|i| format!("f{i}")).collect();
        for a in 0..names.len() {
            for c in (a + 1)..names.len() {
                if bucket_index(&names[a], 0, fanout) != bucket_index(&names[c], 0, fanout) {
                    continue;
                }
                for b in 0..names.len() {
                    if b != a
                        && b != c
                        && bucket_index(&names[b], 0, fanout)
                            != bucket_index(&names[a], 0, fanout)
                    {
                        return (names[a].clone(), names[b].clone(), names[c].clone());
                    }
                }
            }
        }
        panic!("no colliding name triple found");
    }

    #[test]
    fn empty_build_is_the_empty_tree() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        let tree = builder.build().unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.id().unwrap(), empty_tree_id());
    }

    #[test]
    fn flat_tree_below_threshold() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store).with_config(TreeConfig {
            normalization_threshold: 4,
            bucket_fanout: 4,
        });
        for i in 0..3 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let tree = builder.build().unwrap();
        assert!(!tree.is_bucketed());
        assert_eq!(tree.entries.len(), 3);
        assert_eq!(tree.size, 3);
    }

    #[test]
    fn bucketed_tree_above_threshold() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store).with_config(TreeConfig {
            normalization_threshold: 4,
            bucket_fanout: 32,
        });
        for i in 0..16 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let tree = builder.build().unwrap();
        assert!(tree.is_bucketed());
        assert!(tree.buckets.len() >= 2);
        assert_eq!(tree.size, 16);
    }

    #[test]
    fn insertion_order_does_not_affect_id() {
        let store = InMemoryObjectStore::new();
        let config = TreeConfig {
            normalization_threshold: 3,
            bucket_fanout: 8,
        };

        let mut forward = TreeBuilder::new(&store).with_config(config);
        for i in 0..10 {
            forward
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let a = forward.build().unwrap();

        let mut reverse = TreeBuilder::new(&store).with_config(config);
        for i in (0..10).rev() {
            reverse
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let b = reverse.build().unwrap();

        assert_eq!(a.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn superseded_edits_do_not_affect_id() {
        let store = InMemoryObjectStore::new();

        let mut noisy = TreeBuilder::new(&store);
        noisy.put("a", Node::feature("", oid(1))).unwrap();
        noisy.put("a", Node::feature("", oid(9))).unwrap(); // overwritten below
        noisy.put("b", Node::feature("", oid(2))).unwrap();
        noisy.delete("b").unwrap();
        noisy.put("a", Node::feature("", oid(1))).unwrap();
        let a = noisy.build().unwrap();

        let mut clean = TreeBuilder::new(&store);
        clean.put("a", Node::feature("", oid(1))).unwrap();
        let b = clean.build().unwrap();

        assert_eq!(a.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn nested_paths_materialize_namespaces() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        builder.put("roads/way/1", Node::feature("", oid(1))).unwrap();
        builder.put("roads/way/2", Node::feature("", oid(2))).unwrap();
        builder.put("poi/3", Node::feature("", oid(3))).unwrap();
        let tree = builder.build().unwrap();

        // Two namespaces at the root, three features reachable.
        assert_eq!(tree.entries.len(), 2);
        assert_eq!(tree.num_trees, 2);
        assert_eq!(tree.size, 3);

        let config = TreeConfig::default();
        let roads = find_node(&store, &config, &tree, "roads").unwrap().unwrap();
        assert!(roads.is_tree());
        let roads_tree = store.get_tree(&roads.object_id).unwrap();
        assert_eq!(roads_tree.size, 2);
        assert_eq!(roads_tree.num_trees, 1); // the "way" level
    }

    #[test]
    fn deleting_last_entry_prunes_namespace() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        builder.put("roads/way/1", Node::feature("", oid(1))).unwrap();
        builder.put("poi/1", Node::feature("", oid(2))).unwrap();
        let tree = builder.build().unwrap();

        let mut second = TreeBuilder::for_tree(&store, tree);
        second.delete("roads/way/1").unwrap();
        let pruned = second.build().unwrap();

        assert_eq!(pruned.entries.len(), 1);
        assert_eq!(pruned.entries[0].name, "poi");
        assert_eq!(pruned.size, 1);
    }

    #[test]
    fn invalid_paths_are_rejected() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        assert!(matches!(
            builder.put("", Node::feature("", oid(1))),
            Err(TreeError::InvalidPath(_))
        ));
        assert!(matches!(
            builder.put("a//b", Node::feature("", oid(1))),
            Err(TreeError::InvalidPath(_))
        ));
        assert!(matches!(builder.delete("/a"), Err(TreeError::InvalidPath(_))));
    }

    #[test]
    fn structural_sharing_across_deletion() {
        // The T=2 scenario: {a, b, c} shards into buckets; deleting b must
        // leave the shard holding {a, c} byte-identical.
        let store = InMemoryObjectStore::new();
        let config = small_config();
        let (a, b, c) = colliding_names(config.bucket_fanout);

        let mut builder = TreeBuilder::new(&store).with_config(config);
        builder.put(&a, Node::feature("", oid(1))).unwrap();
        builder.put(&b, Node::feature("", oid(2))).unwrap();
        builder.put(&c, Node::feature("", oid(3))).unwrap();
        let tree = builder.build().unwrap();

        assert!(tree.is_bucketed());
        assert_eq!(tree.buckets.len(), 2);
        assert_eq!(tree.size, 3);

        let ac_idx = bucket_index(&a, 0, config.bucket_fanout);
        let b_idx = bucket_index(&b, 0, config.bucket_fanout);
        let ac_shard_id = tree.buckets[&ac_idx].tree_id;

        let mut second = TreeBuilder::for_tree(&store, tree).with_config(config);
        second.delete(&b).unwrap();
        let rebuilt = second.build().unwrap();

        // Lazy collapse: the level stays bucketed, b's shard is gone, and
        // the {a, c} shard is carried unchanged.
        assert!(rebuilt.is_bucketed());
        assert!(!rebuilt.buckets.contains_key(&b_idx));
        assert_eq!(rebuilt.buckets[&ac_idx].tree_id, ac_shard_id);
        assert_eq!(rebuilt.size, 2);
    }

    #[test]
    fn untouched_shards_are_not_rewritten() {
        let store = InMemoryObjectStore::new();
        let config = TreeConfig {
            normalization_threshold: 4,
            bucket_fanout: 8,
        };
        let mut builder = TreeBuilder::new(&store).with_config(config);
        for i in 0..32 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let tree = builder.build().unwrap();
        assert!(tree.is_bucketed());

        // Modify one entry; every shard except its own must keep its id.
        let target = "f0";
        let target_idx = bucket_index(target, 0, config.bucket_fanout);
        let before: BTreeMap<u32, ObjectId> = tree
            .buckets
            .iter()
            .map(|(idx, b)| (*idx, b.tree_id))
            .collect();

        let mut second = TreeBuilder::for_tree(&store, tree).with_config(config);
        second.put(target, Node::feature("", oid(200))).unwrap();
        let rebuilt = second.build().unwrap();

        for (idx, bucket) in &rebuilt.buckets {
            if *idx == target_idx {
                assert_ne!(bucket.tree_id, before[idx]);
            } else {
                assert_eq!(bucket.tree_id, before[idx]);
            }
        }
        assert_eq!(rebuilt.size, 32);
    }

    #[test]
    fn deleting_everything_yields_the_empty_tree() {
        let store = InMemoryObjectStore::new();
        let config = small_config();
        let mut builder = TreeBuilder::new(&store).with_config(config);
        for i in 0..6 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let tree = builder.build().unwrap();
        assert!(tree.is_bucketed());

        let mut second = TreeBuilder::for_tree(&store, tree).with_config(config);
        for i in 0..6 {
            second.delete(&format!("f{i}")).unwrap();
        }
        let emptied = second.build().unwrap();
        assert!(emptied.is_empty());
        assert_eq!(emptied.id().unwrap(), empty_tree_id());
    }

    #[test]
    fn metadata_id_preserved_across_namespace_rebuild() {
        let store = InMemoryObjectStore::new();
        let schema_id = oid(99);

        // Build a namespace, then attach a feature-type reference to its node.
        let mut builder = TreeBuilder::new(&store);
        builder.put("roads/1", Node::feature("", oid(1))).unwrap();
        let tree = builder.build().unwrap();

        let inner_id = tree.entries[0].object_id;
        let typed = RevTree::flat(
            vec![Node::tree("roads", inner_id).with_metadata(schema_id)],
            tree.size,
            1,
        );
        store.put(&RevObject::Tree(typed.clone())).unwrap();

        // Edit inside the namespace; the rebuilt node keeps its metadata.
        let mut second = TreeBuilder::for_tree(&store, typed);
        second.put("roads/2", Node::feature("", oid(2))).unwrap();
        let rebuilt = second.build().unwrap();

        let roads = rebuilt.entry("roads").unwrap();
        assert_eq!(roads.metadata_id, Some(schema_id));
        assert_eq!(rebuilt.size, 2);
    }

    #[test]
    fn feature_put_wins_over_nested_deletes() {
        // A namespace turning into a feature arrives as a put at the name
        // plus deletes beneath it; the put must win.
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        builder.put("roads/1", Node::feature("", oid(1))).unwrap();
        builder.put("roads/2", Node::feature("", oid(2))).unwrap();
        let tree = builder.build().unwrap();

        let mut second = TreeBuilder::for_tree(&store, tree);
        second.put("roads", Node::feature("", oid(9))).unwrap();
        second.delete("roads/1").unwrap();
        second.delete("roads/2").unwrap();
        let replaced = second.build().unwrap();

        let roads = replaced.entry("roads").unwrap();
        assert!(roads.is_feature());
        assert_eq!(roads.object_id, oid(9));
        assert_eq!(replaced.size, 1);
        assert_eq!(replaced.num_trees, 0);
    }

    #[test]
    fn delete_plus_nested_puts_rebuilds_namespace() {
        // The reverse: a feature turning into a namespace arrives as a
        // delete at the name plus puts beneath it.
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        builder.put("roads", Node::feature("", oid(1))).unwrap();
        let tree = builder.build().unwrap();

        let mut second = TreeBuilder::for_tree(&store, tree);
        second.delete("roads").unwrap();
        second.put("roads/1", Node::feature("", oid(2))).unwrap();
        let replaced = second.build().unwrap();

        let roads = replaced.entry("roads").unwrap();
        assert!(roads.is_tree());
        assert_eq!(replaced.size, 1);
        assert_eq!(replaced.num_trees, 1);
    }

    #[test]
    fn cancellation_stops_the_build() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store);
        builder.put("a", Node::feature("", oid(1))).unwrap();

        let flag = CancelFlag::new();
        flag.cancel();
        assert!(matches!(
            builder.build_with_progress(&flag),
            Err(TreeError::Cancelled)
        ));
    }

    #[test]
    fn progress_ticks_during_sharded_build() {
        let store = InMemoryObjectStore::new();
        let mut builder = TreeBuilder::new(&store).with_config(small_config());
        for i in 0..12 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let flag = CancelFlag::new();
        builder.build_with_progress(&flag).unwrap();
        assert!(flag.completed() > 0);
    }

    #[test]
    fn find_node_resolves_through_shards() {
        let store = InMemoryObjectStore::new();
        let config = small_config();
        let mut builder = TreeBuilder::new(&store).with_config(config);
        for i in 0..10 {
            builder
                .put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1)))
                .unwrap();
        }
        let tree = builder.build().unwrap();
        assert!(tree.is_bucketed());

        let node = find_node(&store, &config, &tree, "f7").unwrap().unwrap();
        assert_eq!(node.object_id, oid(8));
        assert!(find_node(&store, &config, &tree, "missing")
            .unwrap()
            .is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn build_is_order_independent(
            order in Just((0..20usize).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let store = InMemoryObjectStore::new();
            let config = TreeConfig { normalization_threshold: 4, bucket_fanout: 8 };

            let mut sorted = TreeBuilder::new(&store).with_config(config);
            for i in 0..20usize {
                sorted.put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1))).unwrap();
            }
            let expected = sorted.build().unwrap().id().unwrap();

            let mut shuffled = TreeBuilder::new(&store).with_config(config);
            for &i in &order {
                shuffled.put(&format!("f{i}"), Node::feature("", oid(i as u8 + 1))).unwrap();
            }
            prop_assert_eq!(shuffled.build().unwrap().id().unwrap(), expected);
        }
    }
}
