//! Durable client-side cache.
//!
//! Everything that would otherwise reach for a global key-value store goes
//! through [`KvStore`], so tests and the CLI can pick the backend.

use crate::error::CacheError;
use crate::types::{RequestKind, RequestRecord, Role};
use hl_events::{AppEvent, EventBus, EventSource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const APPLIED_JOBS_KEY: &str = "labour_applied_jobs";

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

pub fn profile_key(role: Role) -> String {
    format!("{}_profile", role.as_str())
}

pub fn cards_key(role: Role) -> String {
    format!("{}_cards", role.as_str())
}

/// Typed accessors over a [`KvStore`].
///
/// Writes publish [`AppEvent::StorageChanged`] when a bus is attached. The
/// notification is best effort; nothing coordinates concurrent writers.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KvStore>,
    bus: Option<EventBus>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store, bus: None }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    #[must_use]
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store.set(key, value)?;
        self.notify(key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)?;
        self.notify(key);
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| CacheError::Decode {
                key: key.to_string(),
                message: err.to_string(),
            })
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|err| CacheError::Encode {
            message: err.to_string(),
        })?;
        self.set_raw(key, &raw)
    }

    pub fn access_token(&self) -> Result<Option<String>, CacheError> {
        Ok(self
            .store
            .get(ACCESS_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, CacheError> {
        Ok(self
            .store
            .get(REFRESH_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn has_session(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), CacheError> {
        self.set_raw(ACCESS_TOKEN_KEY, access)?;
        if let Some(refresh) = refresh {
            self.set_raw(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Drops tokens and per-role profiles. Listing mirrors survive so the
    /// next anonymous visit still has something to show.
    pub fn clear_session(&self) -> Result<(), CacheError> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)?;
        for role in [Role::User, Role::Labour, Role::Contractor] {
            self.remove(&profile_key(role))?;
        }
        Ok(())
    }

    pub fn profile<T: DeserializeOwned>(&self, role: Role) -> Result<Option<T>, CacheError> {
        self.get_json(&profile_key(role))
    }

    pub fn set_profile<T: Serialize>(&self, role: Role, profile: &T) -> Result<(), CacheError> {
        self.set_json(&profile_key(role), profile)
    }

    pub fn cards<T: DeserializeOwned>(&self, role: Role) -> Result<Option<Vec<T>>, CacheError> {
        self.get_json(&cards_key(role))
    }

    pub fn set_cards<T: Serialize>(&self, role: Role, cards: &[T]) -> Result<(), CacheError> {
        self.set_json(&cards_key(role), cards)
    }

    pub fn sent_mirror(&self, kind: RequestKind) -> Result<Option<Vec<RequestRecord>>, CacheError> {
        self.get_json(&kind.mirror_key())
    }

    pub fn set_sent_mirror(
        &self,
        kind: RequestKind,
        records: &[RequestRecord],
    ) -> Result<(), CacheError> {
        self.set_json(&kind.mirror_key(), records)
    }

    pub fn applied_jobs(&self) -> Result<BTreeSet<String>, CacheError> {
        Ok(self.get_json(APPLIED_JOBS_KEY)?.unwrap_or_default())
    }

    /// Returns `false` when the job was already recorded.
    pub fn add_applied_job(&self, job_id: &str) -> Result<bool, CacheError> {
        let mut jobs = self.applied_jobs()?;
        let inserted = jobs.insert(job_id.to_string());
        if inserted {
            self.set_json(APPLIED_JOBS_KEY, &jobs)?;
        }
        Ok(inserted)
    }

    fn notify(&self, key: &str) {
        if let Some(bus) = &self.bus {
            bus.emit(
                EventSource::Storage,
                AppEvent::StorageChanged {
                    key: key.to_string(),
                },
            );
        }
    }
}
