use tracing::{debug, info};

use geovc_diff::{DiffEntry, PathFilter, TreeDiff};
use geovc_graph::{history, merge_base, GraphStore, LogQuery};
use geovc_index::{StagingArea, StagingStore};
use geovc_merge::merge_trees;
use geovc_model::{
    empty_tree_id, Conflict, Node, RevCommit, RevObject, RevTag, RevTree, Signature,
};
use geovc_refs::{Ref, RefStore, HEAD, R_HEADS, R_TAGS};
use geovc_store::ObjectStore;
use geovc_tree::{find_node, TreeConfig};
use geovc_types::ObjectId;

use crate::error::{RepoError, RepoResult};

/// Branch `init` points HEAD at.
pub const DEFAULT_BRANCH: &str = "main";

/// Ref holding the other side of an in-progress conflicted merge.
const MERGE_HEAD: &str = "MERGE_HEAD";

/// How a merge concluded.
#[derive(Clone, Debug)]
pub enum MergeOutcome {
    /// Theirs was already reachable from ours; nothing to do.
    AlreadyUpToDate,
    /// Ours was an ancestor of theirs; the branch moved forward without
    /// a new commit.
    FastForward(ObjectId),
    /// A merge commit was created.
    Merged(ObjectId),
    /// Divergent changes need resolution; the merged tree sits in the
    /// working tree and these conflicts in the staging area.
    Conflicted { conflicts: Vec<Conflict> },
}

/// How to settle one conflicted path.
#[derive(Clone, Debug)]
pub enum Resolution {
    /// Keep our side's value.
    Ours,
    /// Take their side's value.
    Theirs,
    /// Substitute an explicit value, or `None` to delete the path.
    Custom(Option<Node>),
}

/// The porcelain-facing surface of one repository.
///
/// Holds no state of its own; everything lives in the four backing
/// stores, so any number of `Repository` values may wrap the same
/// stores concurrently. Branch advances go through compare-and-swap on
/// the ref store, which is what makes commits atomic: the commit object
/// is written first, and only then does the branch ref move — a failed
/// CAS leaves an unreferenced object, never a half-advanced branch.
pub struct Repository<'a> {
    objects: &'a dyn ObjectStore,
    staging: &'a dyn StagingStore,
    refs: &'a dyn RefStore,
    graph: &'a dyn GraphStore,
    config: TreeConfig,
    namespace: String,
}

impl<'a> Repository<'a> {
    pub fn new(
        objects: &'a dyn ObjectStore,
        staging: &'a dyn StagingStore,
        refs: &'a dyn RefStore,
        graph: &'a dyn GraphStore,
    ) -> Self {
        Self {
            objects,
            staging,
            refs,
            graph,
            config: TreeConfig::default(),
            namespace: String::new(),
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

    /// Point HEAD at the default branch if the repository is brand new.
    pub fn init(&self) -> RepoResult<()> {
        if self.refs.get(HEAD)?.is_none() {
            self.refs
                .put(Ref::symbolic(HEAD, format!("{R_HEADS}{DEFAULT_BRANCH}")))?;
            info!(branch = DEFAULT_BRANCH, "repository initialized");
        }
        Ok(())
    }

    /// This repository's staging area.
    pub fn staging(&self) -> StagingArea<'a> {
        StagingArea::new(self.objects, self.staging)
            .with_namespace(self.namespace.clone())
            .with_config(self.config)
    }

    // -----------------------------------------------------------------
    // Revision resolution
    // -----------------------------------------------------------------

    fn load_tree(&self, id: ObjectId) -> RepoResult<RevTree> {
        if id == empty_tree_id() {
            return Ok(RevTree::empty());
        }
        Ok(self.objects.get_tree(&id)?)
    }

    /// The branch HEAD points at, when it is symbolic.
    pub fn current_branch(&self) -> RepoResult<Option<String>> {
        Ok(self.refs.get(HEAD)?.and_then(|r| match r.value {
            geovc_refs::RefValue::Symbolic(target) => {
                target.strip_prefix(R_HEADS).map(str::to_string)
            }
            geovc_refs::RefValue::Direct(_) => None,
        }))
    }

    /// The commit HEAD resolves to; `None` before the first commit.
    pub fn head_commit_id(&self) -> RepoResult<Option<ObjectId>> {
        Ok(self.refs.resolve(HEAD)?.and_then(|r| r.id()))
    }

    /// Resolve a revision string: a full or short ref name (`HEAD`,
    /// `main`, `refs/tags/v1`) or a full ObjectId in hex. Tag objects
    /// are peeled to the commit they point at.
    pub fn rev_parse(&self, rev: &str) -> RepoResult<ObjectId> {
        for candidate in [
            rev.to_string(),
            format!("{R_HEADS}{rev}"),
            format!("{R_TAGS}{rev}"),
        ] {
            if let Some(r) = self.refs.resolve(&candidate)? {
                if let Some(id) = r.id() {
                    return self.peel(id);
                }
            }
        }
        if let Ok(id) = ObjectId::from_hex(rev) {
            if self.objects.exists(&id)? {
                return self.peel(id);
            }
        }
        Err(RepoError::RevNotFound(rev.to_string()))
    }

    fn peel(&self, id: ObjectId) -> RepoResult<ObjectId> {
        match self.objects.get_if_present(&id)? {
            Some(RevObject::Tag(tag)) => Ok(tag.commit_id),
            _ => Ok(id),
        }
    }

    /// The root tree a revision string denotes. Besides commit
    /// revisions, `WORK_HEAD` and `STAGE_HEAD` name this namespace's
    /// working and staged trees.
    pub fn tree_for(&self, rev: &str) -> RepoResult<RevTree> {
        match rev {
            "WORK_HEAD" => Ok(self.staging().work_tree()?),
            "STAGE_HEAD" => Ok(self.staging().staged_tree()?),
            _ => {
                let commit_id = self.rev_parse(rev)?;
                let commit = self.objects.get_commit(&commit_id)?;
                self.load_tree(commit.tree_id)
            }
        }
    }

    fn head_tree_id(&self) -> RepoResult<ObjectId> {
        match self.head_commit_id()? {
            Some(id) => Ok(self.objects.get_commit(&id)?.tree_id),
            None => Ok(empty_tree_id()),
        }
    }

    /// Look up a node by full path in an arbitrary root tree.
    fn node_at(&self, root: &RevTree, path: &str) -> RepoResult<Option<Node>> {
        let mut tree = root.clone();
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

    // -----------------------------------------------------------------
    // Porcelain operations
    // -----------------------------------------------------------------

    /// Promote working-tree changes under `filter` to the staged tree.
    pub fn stage(&self, filter: &PathFilter) -> RepoResult<u64> {
        Ok(self.staging().stage(filter)?)
    }

    /// Snapshot the staged tree as a new commit and advance the current
    /// branch. Fails with `ConflictsExist` while conflicts remain, with
    /// `NothingToCommit` when the staged tree matches the head and no
    /// merge is pending, and with a concurrent-modification error when
    /// another writer moved the branch first.
    pub fn commit(&self, message: &str, author: &Signature) -> RepoResult<(ObjectId, RevCommit)> {
        let staging = self.staging();
        let conflict_count = staging.conflict_count()?;
        if conflict_count > 0 {
            return Err(RepoError::ConflictsExist {
                count: conflict_count,
            });
        }

        let head_id = self.head_commit_id()?;
        let staged_tree_id = staging.staged_tree()?.id()?;
        let merge_head = self.refs.get(MERGE_HEAD)?.and_then(|r| r.id());
        if staged_tree_id == self.head_tree_id()? && merge_head.is_none() {
            return Err(RepoError::NothingToCommit);
        }

        let mut parents = Vec::new();
        parents.extend(head_id);
        parents.extend(merge_head);

        let commit = RevCommit::new(
            staged_tree_id,
            parents,
            author.clone(),
            author.clone(),
            message,
        );
        let commit_id = commit.id()?;
        self.objects.put(&RevObject::Commit(commit.clone()))?;
        self.graph.register_commit(&commit)?;

        self.advance_head(head_id, commit_id)?;
        if merge_head.is_some() {
            self.refs.delete(MERGE_HEAD)?;
        }
        debug!(commit = %commit_id.short_hex(), "created commit");
        Ok((commit_id, commit))
    }

    /// CAS the checked-out branch (or a detached HEAD) from `expected`
    /// to `new`.
    fn advance_head(&self, expected: Option<ObjectId>, new: ObjectId) -> RepoResult<()> {
        let target = match self.refs.get(HEAD)? {
            Some(r) => match r.value {
                geovc_refs::RefValue::Symbolic(target) => target,
                geovc_refs::RefValue::Direct(_) => HEAD.to_string(),
            },
            None => return Err(RepoError::RevNotFound(HEAD.to_string())),
        };
        self.refs.compare_and_swap(&target, expected, Some(new))?;
        Ok(())
    }

    /// Changed features between two revisions, in path order.
    pub fn diff(
        &self,
        old_rev: &str,
        new_rev: &str,
        filter: &PathFilter,
    ) -> RepoResult<Vec<DiffEntry>> {
        let old = self.tree_for(old_rev)?;
        let new = self.tree_for(new_rev)?;
        TreeDiff::new(self.objects, old, new)
            .with_filter(filter.clone())
            .map(|e| e.map_err(RepoError::from))
            .collect()
    }

    /// Three-way merge of `their_rev` into the current head.
    pub fn merge(
        &self,
        their_rev: &str,
        message: &str,
        author: &Signature,
    ) -> RepoResult<MergeOutcome> {
        let ours_id = self
            .head_commit_id()?
            .ok_or_else(|| RepoError::RevNotFound(HEAD.to_string()))?;
        let theirs_id = self.rev_parse(their_rev)?;
        if ours_id == theirs_id {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let base = merge_base(self.graph, &ours_id, &theirs_id)?;
        if base == Some(theirs_id) {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let theirs_tree = self.load_tree(self.objects.get_commit(&theirs_id)?.tree_id)?;
        if base == Some(ours_id) {
            self.advance_head(Some(ours_id), theirs_id)?;
            self.staging().reset_to(&theirs_tree)?;
            debug!(to = %theirs_id.short_hex(), "fast-forward merge");
            return Ok(MergeOutcome::FastForward(theirs_id));
        }

        // Disjoint histories merge against the empty tree.
        let ancestor_tree = match base {
            Some(base_id) => self.load_tree(self.objects.get_commit(&base_id)?.tree_id)?,
            None => RevTree::empty(),
        };
        let ours_tree = self.load_tree(self.objects.get_commit(&ours_id)?.tree_id)?;

        let report = merge_trees(
            self.objects,
            self.config,
            &ancestor_tree,
            &ours_tree,
            &theirs_tree,
        )?;

        if report.is_conflicted() {
            let staging = self.staging();
            self.staging
                .set_work_tree(&self.namespace, report.tree.id()?)?;
            for conflict in &report.conflicts {
                staging.add_conflict(conflict.clone())?;
            }
            self.refs.put(Ref::direct(MERGE_HEAD, theirs_id))?;
            info!(
                conflicts = report.conflicts.len(),
                "merge stopped on conflicts"
            );
            return Ok(MergeOutcome::Conflicted {
                conflicts: report.conflicts,
            });
        }

        let commit = RevCommit::new(
            report.tree.id()?,
            vec![ours_id, theirs_id],
            author.clone(),
            author.clone(),
            message,
        );
        let commit_id = commit.id()?;
        self.objects.put(&RevObject::Commit(commit.clone()))?;
        self.graph.register_commit(&commit)?;
        self.advance_head(Some(ours_id), commit_id)?;
        self.staging().reset_to(&report.tree)?;
        debug!(commit = %commit_id.short_hex(), "merge commit created");
        Ok(MergeOutcome::Merged(commit_id))
    }

    /// Settle one conflicted path, applying the chosen value to the
    /// working tree and dropping the conflict record. The change still
    /// has to be staged and committed.
    pub fn resolve_conflict(&self, path: &str, resolution: Resolution) -> RepoResult<()> {
        let staging = self.staging();
        let conflict = staging
            .conflict(path)?
            .ok_or_else(|| RepoError::NoConflictAt(path.to_string()))?;

        // The chosen node is looked up in that side's commit tree so its
        // kind, metadata link, and envelope survive resolution intact.
        let chosen = match resolution {
            Resolution::Ours => match conflict.ours {
                Some(_) => {
                    let tree = self.load_tree(self.head_tree_id()?)?;
                    self.node_at(&tree, path)?
                }
                None => None,
            },
            Resolution::Theirs => match conflict.theirs {
                Some(_) => {
                    let theirs_id = self
                        .refs
                        .get(MERGE_HEAD)?
                        .and_then(|r| r.id())
                        .ok_or_else(|| RepoError::RevNotFound(MERGE_HEAD.to_string()))?;
                    let tree = self.load_tree(self.objects.get_commit(&theirs_id)?.tree_id)?;
                    self.node_at(&tree, path)?
                }
                None => None,
            },
            Resolution::Custom(node) => node,
        };
        match chosen {
            Some(node) => staging.insert(path, node)?,
            None => staging.remove(path)?,
        }
        self.staging.remove_conflict(&self.namespace, path)?;
        Ok(())
    }

    /// Commits reachable from HEAD, most recent author timestamp first.
    pub fn log(&self, query: LogQuery) -> RepoResult<Vec<(ObjectId, RevCommit)>> {
        let Some(head) = self.head_commit_id()? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for id in history(self.graph, &head, query)? {
            let id = id?;
            out.push((id, self.objects.get_commit(&id)?));
        }
        Ok(out)
    }

    // -----------------------------------------------------------------
    // Branches and tags
    // -----------------------------------------------------------------

    /// Create a branch at the current head.
    pub fn branch(&self, name: &str) -> RepoResult<()> {
        let head = self
            .head_commit_id()?
            .ok_or_else(|| RepoError::RevNotFound(HEAD.to_string()))?;
        self.refs
            .compare_and_swap(&format!("{R_HEADS}{name}"), None, Some(head))?;
        Ok(())
    }

    /// Branch names with their tip commits, in name order.
    pub fn branches(&self) -> RepoResult<Vec<(String, ObjectId)>> {
        Ok(self
            .refs
            .all(Some(R_HEADS))?
            .into_iter()
            .filter_map(|r| {
                let id = r.id()?;
                Some((r.name.strip_prefix(R_HEADS)?.to_string(), id))
            })
            .collect())
    }

    pub fn delete_branch(&self, name: &str) -> RepoResult<()> {
        let full = format!("{R_HEADS}{name}");
        if self.refs.delete(&full)?.is_none() {
            return Err(RepoError::RevNotFound(full));
        }
        Ok(())
    }

    /// Point HEAD at `branch` and reset the staging pipeline to its
    /// tree (checkout).
    pub fn set_head(&self, branch: &str) -> RepoResult<()> {
        let full = format!("{R_HEADS}{branch}");
        let r = self
            .refs
            .get(&full)?
            .ok_or_else(|| RepoError::RevNotFound(full.clone()))?;
        self.refs.put(Ref::symbolic(HEAD, full))?;
        if let Some(id) = r.id() {
            let tree = self.load_tree(self.objects.get_commit(&id)?.tree_id)?;
            self.staging().reset_to(&tree)?;
        }
        Ok(())
    }

    /// Create an annotated tag object for a commit and the ref naming it.
    pub fn tag(
        &self,
        name: &str,
        rev: &str,
        message: &str,
        tagger: &Signature,
    ) -> RepoResult<ObjectId> {
        let commit_id = self.rev_parse(rev)?;
        let tag = RevTag::new(name, commit_id, message, tagger.clone());
        let tag_id = tag.id()?;
        self.objects.put(&RevObject::Tag(tag))?;
        self.refs
            .compare_and_swap(&format!("{R_TAGS}{name}"), None, Some(tag_id))?;
        Ok(tag_id)
    }
}
