use geovc_types::ObjectId;

use crate::error::{RefError, RefResult};
use crate::types::{Ref, RefValue};

/// Chain length past which symbolic resolution gives up.
const MAX_SYMBOLIC_DEPTH: usize = 10;

/// Storage for the repository's refs.
pub trait RefStore: Send + Sync {
    /// The ref itself, without following symbolic targets.
    fn get(&self, name: &str) -> RefResult<Option<Ref>>;

    /// Create or overwrite a ref unconditionally.
    fn put(&self, r: Ref) -> RefResult<()>;

    /// Remove a ref, returning its last value.
    fn delete(&self, name: &str) -> RefResult<Option<Ref>>;

    /// All refs in name order, optionally restricted to a name prefix.
    fn all(&self, prefix: Option<&str>) -> RefResult<Vec<Ref>>;

    /// Atomically update the direct ref `name` from `expected` to `new`.
    ///
    /// `expected: None` requires the ref to be absent (creation);
    /// `new: None` deletes it. On mismatch, fails with
    /// [`RefError::ConcurrentModification`] carrying the observed value.
    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: Option<ObjectId>,
    ) -> RefResult<()>;

    /// Follow symbolic refs from `name` to the direct ref at the end of
    /// the chain. `None` if the chain dangles into a missing ref.
    fn resolve(&self, name: &str) -> RefResult<Option<Ref>> {
        let mut current = name.to_string();
        for _ in 0..MAX_SYMBOLIC_DEPTH {
            match self.get(&current)? {
                None => return Ok(None),
                Some(r) => match &r.value {
                    RefValue::Direct(_) => return Ok(Some(r)),
                    RefValue::Symbolic(target) => current = target.clone(),
                },
            }
        }
        Err(RefError::CircularSymbolic(name.to_string()))
    }
}
