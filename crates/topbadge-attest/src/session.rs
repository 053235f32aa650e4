//! Per-session attestation storage.
//!
//! The store is an explicit value handed to whoever needs it; there is no
//! process-wide singleton. Records are stored behind `Arc` and never mutated,
//! so readers never contend with a later login beyond the map lock itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::record::AttestationRecord;
use crate::{AttestError, Result};

/// Opaque session identifier issued by the session transport (cookie).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Storage for one attestation record per session.
pub trait SessionStore: Send + Sync {
    /// Store `record` for `session`, replacing any earlier record.
    fn put(&self, session: &SessionId, record: AttestationRecord) -> Arc<AttestationRecord>;

    /// The current record for `session`.
    ///
    /// Fails with [`AttestError::NotFound`] before any successful login.
    fn get(&self, session: &SessionId) -> Result<Arc<AttestationRecord>>;

    /// Drop the record for `session`, if any (logout or session expiry).
    fn remove(&self, session: &SessionId) -> Option<Arc<AttestationRecord>>;
}

/// In-process session store.
#[derive(Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<SessionId, Arc<AttestationRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding a record.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, session: &SessionId, record: AttestationRecord) -> Arc<AttestationRecord> {
        let record = Arc::new(record);
        let previous = self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.clone(), Arc::clone(&record));

        if previous.is_some() {
            tracing::debug!(session = %session, "replaced attestation for session");
        } else {
            tracing::debug!(session = %session, "stored attestation for session");
        }
        record
    }

    fn get(&self, session: &SessionId) -> Result<Arc<AttestationRecord>> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session)
            .cloned()
            .ok_or_else(|| AttestError::NotFound(session.clone()))
    }

    fn remove(&self, session: &SessionId) -> Option<Arc<AttestationRecord>> {
        self.records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session)
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn put(&self, session: &SessionId, record: AttestationRecord) -> Arc<AttestationRecord> {
        (**self).put(session, record)
    }

    fn get(&self, session: &SessionId) -> Result<Arc<AttestationRecord>> {
        (**self).get(session)
    }

    fn remove(&self, session: &SessionId) -> Option<Arc<AttestationRecord>> {
        (**self).remove(session)
    }
}
