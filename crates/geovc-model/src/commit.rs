use chrono::Utc;
use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::stored::{ObjectKind, StoredObject};

/// Who made a change and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Milliseconds since the Unix epoch, UTC.
    pub timestamp_ms: i64,
    /// Local timezone offset in minutes.
    pub tz_offset_mins: i32,
}

impl Signature {
    /// A signature stamped with the current wall-clock time.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp_ms: Utc::now().timestamp_millis(),
            tz_offset_mins: 0,
        }
    }

    /// A signature with an explicit timestamp.
    pub fn at(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp_ms: i64,
        tz_offset_mins: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp_ms,
            tz_offset_mins,
        }
    }
}

/// A commit: an immutable snapshot root plus ancestry and authorship.
///
/// More than one parent signals a merge commit. Commits form the
/// append-only history graph; once stored they are never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevCommit {
    /// Root revision tree of the snapshot.
    pub tree_id: ObjectId,
    /// Parent commit IDs, oldest-branch first. Empty for the root commit.
    pub parent_ids: Vec<ObjectId>,
    /// Who authored the change.
    pub author: Signature,
    /// Who recorded the commit.
    pub committer: Signature,
    /// Commit message.
    pub message: String,
}

impl RevCommit {
    pub fn new(
        tree_id: ObjectId,
        parent_ids: Vec<ObjectId>,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree_id,
            parent_ids,
            author,
            committer,
            message: message.into(),
        }
    }

    /// Returns `true` if this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    /// First parent, if any.
    pub fn first_parent(&self) -> Option<ObjectId> {
        self.parent_ids.first().copied()
    }

    /// The content-addressed ID of this commit.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(ModelError::TypeMismatch {
                expected: ObjectKind::Commit,
                found: obj.kind,
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| ModelError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    fn sig(ts: i64) -> Signature {
        Signature::at("Ada", "ada@example.com", ts, 0)
    }

    #[test]
    fn roundtrip() {
        let commit = RevCommit::new(oid(1), vec![oid(2)], sig(1000), sig(1001), "import roads");
        let stored = commit.to_stored_object().unwrap();
        let decoded = RevCommit::from_stored_object(&stored).unwrap();
        assert_eq!(commit, decoded);
        assert_eq!(stored.compute_id(), commit.id().unwrap());
    }

    #[test]
    fn merge_detection() {
        let root = RevCommit::new(oid(1), vec![], sig(1), sig(1), "root");
        assert!(!root.is_merge());
        assert_eq!(root.first_parent(), None);

        let merge = RevCommit::new(oid(1), vec![oid(2), oid(3)], sig(2), sig(2), "merge");
        assert!(merge.is_merge());
        assert_eq!(merge.first_parent(), Some(oid(2)));
    }

    #[test]
    fn identical_content_identical_id() {
        let a = RevCommit::new(oid(1), vec![oid(2)], sig(5), sig(5), "m");
        let b = RevCommit::new(oid(1), vec![oid(2)], sig(5), sig(5), "m");
        assert_eq!(a.id().unwrap(), b.id().unwrap());

        let c = RevCommit::new(oid(1), vec![oid(2)], sig(6), sig(5), "m");
        assert_ne!(a.id().unwrap(), c.id().unwrap());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let stored = StoredObject::new(ObjectKind::Tag, b"{}".to_vec());
        assert!(matches!(
            RevCommit::from_stored_object(&stored),
            Err(ModelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn signature_now_is_recent() {
        let sig = Signature::now("Ada", "ada@example.com");
        assert!(sig.timestamp_ms > 0);
    }
}
