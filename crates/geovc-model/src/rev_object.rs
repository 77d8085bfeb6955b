use geovc_types::ObjectId;

use crate::commit::RevCommit;
use crate::error::{ModelError, ModelResult};
use crate::feature::RevFeature;
use crate::feature_type::RevFeatureType;
use crate::stored::{ObjectKind, StoredObject};
use crate::tag::RevTag;
use crate::tree::RevTree;

/// A closed, tagged variant over the five object kinds.
///
/// This is the type content stores traffic in. Typed access goes through
/// the `into_*` accessors, which fail with
/// [`TypeMismatch`](ModelError::TypeMismatch) against the wrong kind.
#[derive(Clone, Debug, PartialEq)]
pub enum RevObject {
    Tree(RevTree),
    Feature(RevFeature),
    FeatureType(RevFeatureType),
    Commit(RevCommit),
    Tag(RevTag),
}

impl RevObject {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Tree(_) => ObjectKind::Tree,
            Self::Feature(_) => ObjectKind::Feature,
            Self::FeatureType(_) => ObjectKind::FeatureType,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// The content-addressed ID, derived from canonical serialization.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Canonical storage envelope for this object.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        match self {
            Self::Tree(t) => t.to_stored_object(),
            Self::Feature(f) => f.to_stored_object(),
            Self::FeatureType(ft) => ft.to_stored_object(),
            Self::Commit(c) => c.to_stored_object(),
            Self::Tag(t) => t.to_stored_object(),
        }
    }

    /// Decode from a storage envelope, dispatching on the kind tag.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        Ok(match obj.kind {
            ObjectKind::Tree => Self::Tree(RevTree::from_stored_object(obj)?),
            ObjectKind::Feature => Self::Feature(RevFeature::from_stored_object(obj)?),
            ObjectKind::FeatureType => {
                Self::FeatureType(RevFeatureType::from_stored_object(obj)?)
            }
            ObjectKind::Commit => Self::Commit(RevCommit::from_stored_object(obj)?),
            ObjectKind::Tag => Self::Tag(RevTag::from_stored_object(obj)?),
        })
    }

    /// Extract a tree, failing with `TypeMismatch` otherwise.
    pub fn into_tree(self) -> ModelResult<RevTree> {
        match self {
            Self::Tree(t) => Ok(t),
            other => Err(mismatch(ObjectKind::Tree, &other)),
        }
    }

    /// Extract a feature, failing with `TypeMismatch` otherwise.
    pub fn into_feature(self) -> ModelResult<RevFeature> {
        match self {
            Self::Feature(f) => Ok(f),
            other => Err(mismatch(ObjectKind::Feature, &other)),
        }
    }

    /// Extract a feature type, failing with `TypeMismatch` otherwise.
    pub fn into_feature_type(self) -> ModelResult<RevFeatureType> {
        match self {
            Self::FeatureType(ft) => Ok(ft),
            other => Err(mismatch(ObjectKind::FeatureType, &other)),
        }
    }

    /// Extract a commit, failing with `TypeMismatch` otherwise.
    pub fn into_commit(self) -> ModelResult<RevCommit> {
        match self {
            Self::Commit(c) => Ok(c),
            other => Err(mismatch(ObjectKind::Commit, &other)),
        }
    }

    /// Extract a tag, failing with `TypeMismatch` otherwise.
    pub fn into_tag(self) -> ModelResult<RevTag> {
        match self {
            Self::Tag(t) => Ok(t),
            other => Err(mismatch(ObjectKind::Tag, &other)),
        }
    }
}

fn mismatch(expected: ObjectKind, found: &RevObject) -> ModelError {
    ModelError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl From<RevTree> for RevObject {
    fn from(t: RevTree) -> Self {
        Self::Tree(t)
    }
}

impl From<RevFeature> for RevObject {
    fn from(f: RevFeature) -> Self {
        Self::Feature(f)
    }
}

impl From<RevFeatureType> for RevObject {
    fn from(ft: RevFeatureType) -> Self {
        Self::FeatureType(ft)
    }
}

impl From<RevCommit> for RevObject {
    fn from(c: RevCommit) -> Self {
        Self::Commit(c)
    }
}

impl From<RevTag> for RevObject {
    fn from(t: RevTag) -> Self {
        Self::Tag(t)
    }
}
