use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

use crate::commit::Signature;
use crate::error::{ModelError, ModelResult};
use crate::stored::{ObjectKind, StoredObject};

/// A named, immutable pointer to a commit.
///
/// Unlike branch refs, tags are content-addressed objects: moving a tag
/// means creating a new object, never mutating an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevTag {
    /// Tag name (e.g. "v1.0.0").
    pub name: String,
    /// The commit this tag points at.
    pub commit_id: ObjectId,
    /// Annotation message.
    pub message: String,
    /// Who created the tag.
    pub tagger: Signature,
}

impl RevTag {
    pub fn new(
        name: impl Into<String>,
        commit_id: ObjectId,
        message: impl Into<String>,
        tagger: Signature,
    ) -> Self {
        Self {
            name: name.into(),
            commit_id,
            message: message.into(),
            tagger,
        }
    }

    /// The content-addressed ID of this tag.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tag, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        if obj.kind != ObjectKind::Tag {
            return Err(ModelError::TypeMismatch {
                expected: ObjectKind::Tag,
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

    #[test]
    fn roundtrip() {
        let tag = RevTag::new(
            "v1.0.0",
            ObjectId::from_raw([3; 20]),
            "first release",
            Signature::at("Ada", "ada@example.com", 1000, 60),
        );
        let stored = tag.to_stored_object().unwrap();
        let decoded = RevTag::from_stored_object(&stored).unwrap();
        assert_eq!(tag, decoded);
        assert_eq!(stored.compute_id(), tag.id().unwrap());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let stored = StoredObject::new(ObjectKind::Commit, b"{}".to_vec());
        assert!(matches!(
            RevTag::from_stored_object(&stored),
            Err(ModelError::TypeMismatch { .. })
        ));
    }
}
