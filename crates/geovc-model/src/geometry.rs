use serde::{Deserialize, Serialize};

/// A single coordinate pair.
pub type Coord = (f64, f64);

/// A 2D bounding envelope.
///
/// Attached to tree nodes and buckets so spatial consumers can prune
/// traversals without decoding feature payloads. An envelope with
/// `min > max` on either axis is "empty" (nothing inside it); the
/// [`Envelope::EMPTY`] constant is the identity for
/// [`expand_to_include`](Envelope::expand_to_include).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    /// The empty envelope.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Create an envelope from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An envelope covering a single point.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Returns `true` if nothing lies inside this envelope.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow this envelope to cover `other`.
    pub fn expand_to_include(&mut self, other: &Envelope) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Returns `true` if the two envelopes overlap.
    pub fn intersects(&self, other: &Envelope) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Union of two optional envelopes.
    pub fn union(a: Option<Envelope>, b: Option<Envelope>) -> Option<Envelope> {
        match (a, b) {
            (None, None) => None,
            (Some(e), None) | (None, Some(e)) => Some(e),
            (Some(mut e), Some(other)) => {
                e.expand_to_include(&other);
                Some(e)
            }
        }
    }
}

/// Envelope over a coordinate sequence.
pub fn envelope_of(coords: &[Coord]) -> Envelope {
    let mut env = Envelope::EMPTY;
    for &(x, y) in coords {
        env.expand_to_include(&Envelope::point(x, y));
    }
    env
}
