use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use geovc_types::ObjectId;

use crate::error::{RefError, RefResult};
use crate::traits::RefStore;
use crate::types::{is_valid_ref_name, Ref, RefValue};

/// In-memory [`RefStore`] for tests and ephemeral repositories.
///
/// A `BTreeMap` under one lock keeps name-ordered listing cheap and
/// makes compare-and-swap a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, RefValue>>,
}

impl InMemoryRefStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn get(&self, name: &str) -> RefResult<Option<Ref>> {
        Ok(self
            .refs
            .read()
            .expect("lock poisoned")
            .get(name)
            .map(|value| Ref {
                name: name.to_string(),
                value: value.clone(),
            }))
    }

    fn put(&self, r: Ref) -> RefResult<()> {
        if !is_valid_ref_name(&r.name) {
            return Err(RefError::InvalidName(r.name));
        }
        if let RefValue::Symbolic(target) = &r.value {
            if !is_valid_ref_name(target) {
                return Err(RefError::InvalidName(target.clone()));
            }
        }
        self.refs
            .write()
            .expect("lock poisoned")
            .insert(r.name, r.value);
        Ok(())
    }

    fn delete(&self, name: &str) -> RefResult<Option<Ref>> {
        Ok(self
            .refs
            .write()
            .expect("lock poisoned")
            .remove(name)
            .map(|value| Ref {
                name: name.to_string(),
                value,
            }))
    }

    fn all(&self, prefix: Option<&str>) -> RefResult<Vec<Ref>> {
        Ok(self
            .refs
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|(name, _)| prefix.map_or(true, |p| name.starts_with(p)))
            .map(|(name, value)| Ref {
                name: name.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: Option<ObjectId>,
    ) -> RefResult<()> {
        if !is_valid_ref_name(name) {
            return Err(RefError::InvalidName(name.to_string()));
        }
        let mut refs = self.refs.write().expect("lock poisoned");
        let found = match refs.get(name) {
            Some(RefValue::Direct(id)) => Some(*id),
            Some(RefValue::Symbolic(_)) | None => None,
        };
        if found != expected {
            return Err(RefError::ConcurrentModification {
                name: name.to_string(),
                expected,
                found,
            });
        }
        match new {
            Some(id) => {
                refs.insert(name.to_string(), RefValue::Direct(id));
            }
            None => {
                refs.remove(name);
            }
        }
        debug!(name, ?expected, ?new, "ref updated");
        Ok(())
    }
}
