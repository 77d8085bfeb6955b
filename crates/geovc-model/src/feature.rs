use serde::{Deserialize, Serialize};

use geovc_types::ObjectId;

use crate::error::{ModelError, ModelResult};
use crate::geometry::{envelope_of, Coord, Envelope};
use crate::stored::{ObjectKind, StoredObject};

/// One attribute value within a feature payload.
///
/// The variant set is closed: scalar kinds plus the geometry kinds a
/// feature can carry. Geometry coordinates are stored inline; coordinate
/// reference system information lives on the feature type, not the value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Point(Coord),
    LineString(Vec<Coord>),
    /// Outer ring followed by zero or more inner rings.
    Polygon(Vec<Vec<Coord>>),
}

impl AttributeValue {
    /// Returns `true` if this value is one of the geometry kinds.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Self::Point(_) | Self::LineString(_) | Self::Polygon(_)
        )
    }

    /// Bounding envelope of a geometry value, `None` for scalars.
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            Self::Point((x, y)) => Some(Envelope::point(*x, *y)),
            Self::LineString(coords) => Some(envelope_of(coords)),
            Self::Polygon(rings) => {
                let mut env = Envelope::EMPTY;
                for ring in rings {
                    env.expand_to_include(&envelope_of(ring));
                }
                Some(env)
            }
            _ => None,
        }
    }
}

/// A feature payload: an ordered list of optional attribute values.
///
/// Values are addressed by position; the positions are defined by the
/// feature's [`RevFeatureType`](crate::RevFeatureType), which is referenced
/// from the tree node pointing at this feature, not from the feature
/// itself. Two features with the same values are the same object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevFeature {
    /// Attribute values in schema order; `None` is an unset attribute.
    pub values: Vec<Option<AttributeValue>>,
}

impl RevFeature {
    /// Create a feature from its values.
    pub fn new(values: Vec<Option<AttributeValue>>) -> Self {
        Self { values }
    }

    /// Value at a schema position, flattened over absence.
    pub fn value(&self, index: usize) -> Option<&AttributeValue> {
        self.values.get(index).and_then(|v| v.as_ref())
    }

    /// Number of attribute slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the feature carries no attribute slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Union envelope over all geometry values.
    pub fn envelope(&self) -> Option<Envelope> {
        let mut result = None;
        for value in self.values.iter().flatten() {
            result = Envelope::union(result, value.envelope());
        }
        result
    }

    /// The content-addressed ID of this feature.
    pub fn id(&self) -> ModelResult<ObjectId> {
        Ok(self.to_stored_object()?.compute_id())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> ModelResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Feature, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> ModelResult<Self> {
        if obj.kind != ObjectKind::Feature {
            return Err(ModelError::TypeMismatch {
                expected: ObjectKind::Feature,
                found: obj.kind,
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| ModelError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}
