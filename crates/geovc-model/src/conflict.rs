use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

/// An unresolved divergent change at one path, recorded by a three-way
/// merge that could not reconcile both sides automatically.
///
/// Conflicts live in the staging area, keyed by (namespace, path) — they
/// are never written to the permanent object store. A `None` side means
/// the path did not exist there (e.g. deleted by ours, modified by theirs).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Full slash-separated path of the conflicted entry.
    pub path: String,
    /// The object at this path in the common ancestor, if present.
    pub ancestor: Option<ObjectId>,
    /// The object our side changed it to, if present.
    pub ours: Option<ObjectId>,
    /// The object their side changed it to, if present.
    pub theirs: Option<ObjectId>,
}

impl Conflict {
    pub fn new(
        path: impl Into<String>,
        ancestor: Option<ObjectId>,
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    ) -> Self {
        Self {
            path: path.into(),
            ancestor,
            ours,
            theirs,
        }
    }

    /// Returns `true` if one side deleted the path while the other
    /// changed it.
    pub fn is_delete_conflict(&self) -> bool {
        self.ours.is_none() || self.theirs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(b: u8) -> ObjectId {
        ObjectId::from_raw([b; 20])
    }

    #[test]
    fn modify_modify_conflict() {
        let c = Conflict::new("node/1", Some(oid(1)), Some(oid(2)), Some(oid(3)));
        assert!(!c.is_delete_conflict());
        assert_eq!(c.path, "node/1");
    }

    #[test]
    fn delete_modify_conflict() {
        let c = Conflict::new("node/1", Some(oid(1)), None, Some(oid(3)));
        assert!(c.is_delete_conflict());
    }

    #[test]
    fn serde_roundtrip() {
        let c = Conflict::new("roads/way/7", Some(oid(1)), Some(oid(2)), None);
        let json = serde_json::to_string(&c).unwrap();
        let parsed: Conflict = serde_json::from_str(&json).unwrap();
        assert_eq!(c, parsed);
    }
}
