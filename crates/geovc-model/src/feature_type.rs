use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::stored::{ObjectKind, StoredObject};

/// The kind of an attribute slot in a feature-type schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Bool,
    Int,
    Long,
    Double,
    String,
    Bytes,
    Point,
    LineString,
    Polygon,
}

impl AttributeKind {
    /// Returns `true` for the geometry attribute kinds.
    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Point | Self::LineString | Self::Polygon)
    }
}

/// One attribute slot descriptor in a feature-type schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name, unique within the schema.
    pub name: String,
    /// Value kind features must carry in this slot.
    pub kind: AttributeKind,
    /// Coordinate reference system identifier (e.g. "EPSG:4326"),
    /// only meaningful for geometry kinds.
    pub crs: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            crs: None,
        }
    }

    pub fn with_crs(name: impl Into<String>, kind: AttributeKind, crs: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            crs: Some(crs.into()),
        }
    }
}

/// A feature-type schema: named, ordered attribute descriptors.
///
/// Attribute order defines the positional layout of every
/// [`RevFeature`](crate::RevFeature) carrying this type. The schema is
/// itself a content-addressed object; tree nodes reference it through
/// their `metadata_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevFeatureType {
    /// Schema name (e.g. "roads").
    pub name: String,
    /// Ordered attribute slots.
    pub attributes: Vec<AttributeDescriptor>,
    /// Name of the default geometry attribute, if any.
    pub default_geometry: Option<String>,
}

impl RevFeatureType {
    /// Create a schema; the default geometry is the first geometry slot.
    pub fn new(name: impl Into<String>, attributes: Vec<AttributeDescriptor>) -> Self {
        let default_geometry = attributes
            .iter()
            .find(|a| a.kind.is_geometry())
            .map(|a| a.name.clone());
        Self {
            name: name.into(),
            attributes,
            default_geometry,
        }
    }

    /// Position of an attribute by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Number of attribute slots.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The content-addressed ID of this schema.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::FeatureType, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        if obj.kind != ObjectKind::FeatureType {
            return Err(ModelError::TypeMismatch {
                expected: ObjectKind::FeatureType,
                found: obj.kind,
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| ModelError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}
