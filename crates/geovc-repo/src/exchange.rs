use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use geovc_model::StoredObject;
use geovc_store::{BulkOpListener, ObjectStore};
use geovc_types::{ObjectId, OBJECT_ID_LEN};

use crate::error::RepoResult;

/// Errors from the object exchange framing.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Fewer bytes than an ObjectId header.
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// The payload did not hash to the framed ID.
    #[error("frame payload for {declared} hashes to {computed}")]
    PayloadMismatch {
        declared: ObjectId,
        computed: ObjectId,
    },

    /// The payload was not a valid serialized object.
    #[error("undecodable frame payload for {id}: {reason}")]
    BadPayload { id: ObjectId, reason: String },
}

/// One object on the wire: a fixed 20-byte binary ObjectId followed by
/// the object's canonical serialized payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectFrame {
    pub id: ObjectId,
    pub payload: Vec<u8>,
}

impl ObjectFrame {
    /// Frame a stored object for sending.
    pub fn for_object(object: &StoredObject) -> Result<Self, ExchangeError> {
        let id = object.compute_id();
        let payload = serde_json::to_vec(object).map_err(|e| ExchangeError::BadPayload {
            id,
            reason: e.to_string(),
        })?;
        Ok(Self { id, payload })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(OBJECT_ID_LEN + self.payload.len());
        bytes.extend_from_slice(self.id.as_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ExchangeError> {
        if bytes.len() < OBJECT_ID_LEN {
            return Err(ExchangeError::FrameTooShort(bytes.len()));
        }
        let id = ObjectId::try_from_slice(&bytes[..OBJECT_ID_LEN])
            .map_err(|_| ExchangeError::FrameTooShort(bytes.len()))?;
        Ok(Self {
            id,
            payload: bytes[OBJECT_ID_LEN..].to_vec(),
        })
    }
}

/// Provisional holding area for one client's pushed objects.
///
/// Ingested objects are hash-verified and parked here; nothing reaches
/// the permanent store until [`promote`](PushSession::promote). Each
/// transport connection owns its own session, so concurrent pushes
/// never see each other's in-flight objects.
pub struct PushSession<'a> {
    objects: &'a dyn ObjectStore,
    pending: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl<'a> PushSession<'a> {
    pub fn new(objects: &'a dyn ObjectStore) -> Self {
        Self {
            objects,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Verify and park one framed object.
    pub fn ingest(&self, frame: &ObjectFrame) -> Result<(), ExchangeError> {
        let decoded: StoredObject =
            serde_json::from_slice(&frame.payload).map_err(|e| ExchangeError::BadPayload {
                id: frame.id,
                reason: e.to_string(),
            })?;
        // Recompute the cached size rather than trusting the wire.
        let stored = StoredObject::new(decoded.kind, decoded.data);
        let computed = stored.compute_id();
        if computed != frame.id {
            return Err(ExchangeError::PayloadMismatch {
                declared: frame.id,
                computed,
            });
        }
        self.pending
            .write()
            .expect("lock poisoned")
            .insert(frame.id, stored);
        Ok(())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.read().expect("lock poisoned").len()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.pending.read().expect("lock poisoned").contains_key(id)
    }

    /// Move every parked object into the permanent store, reporting
    /// per-item outcomes to the listener. Returns the number of objects
    /// newly inserted.
    pub fn promote(self, listener: &dyn BulkOpListener) -> RepoResult<u64> {
        let pending = self.pending.into_inner().expect("lock poisoned");
        let mut inserted = 0u64;
        for (id, stored) in pending {
            if self.objects.put_stored(&stored)? {
                listener.inserted(&id, stored.size);
                inserted += 1;
            } else {
                listener.existed(&id);
            }
        }
        debug!(inserted, "push session promoted");
        Ok(inserted)
    }

    /// Drop every parked object without touching the permanent store.
    pub fn abort(self) {
        let count = self.pending_count();
        debug!(discarded = count, "push session aborted");
    }
}
