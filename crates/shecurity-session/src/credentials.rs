//! Time-limited storage of the emergency contact.
//!
//! Each field is its own record `{value, expiresAtEpochMs}`. Expiry is lazy:
//! a read past the deadline deletes the record and reports it absent. There
//! is no background sweep.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shecurity_core::{Clock, Contact};

use crate::store::{KeyValueStore, StoreError};

const MS_PER_HOUR: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Phone,
    Email,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 2] = [CredentialKey::Phone, CredentialKey::Email];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKey::Phone => "phone",
            CredentialKey::Email => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCredential {
    pub value: String,
    pub expires_at_epoch_ms: i64,
}

pub struct CredentialCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CredentialCache {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Store `value` under `key` until `ttl_hours` from now, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be written.
    pub fn put(&self, key: CredentialKey, value: &str, ttl_hours: u64) -> Result<(), StoreError> {
        let ttl_ms = i64::try_from(ttl_hours)
            .unwrap_or(i64::MAX)
            .saturating_mul(MS_PER_HOUR);
        let record = CachedCredential {
            value: value.to_string(),
            expires_at_epoch_ms: self.clock.now_epoch_ms().saturating_add(ttl_ms),
        };
        self.store.set(key.as_str(), serde_json::to_value(&record)?)
    }

    /// Read `key`, deleting it if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read or the expired
    /// record cannot be removed.
    pub fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let Some(raw) = self.store.get(key.as_str())? else {
            return Ok(None);
        };
        let record: CachedCredential = match serde_json::from_value(raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(key = key.as_str(), error = %e, "dropping malformed credential record");
                self.store.remove(key.as_str())?;
                return Ok(None);
            }
        };
        if self.clock.now_epoch_ms() > record.expires_at_epoch_ms {
            tracing::debug!(key = key.as_str(), "credential expired");
            self.store.remove(key.as_str())?;
            return Ok(None);
        }
        Ok(Some(record.value))
    }

    /// Remove every cached credential.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }

    /// Store both contact fields with the same time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either record cannot be written.
    pub fn store_contact(&self, contact: &Contact, ttl_hours: u64) -> Result<(), StoreError> {
        self.put(CredentialKey::Phone, contact.phone.trim(), ttl_hours)?;
        self.put(CredentialKey::Email, contact.email.trim(), ttl_hours)
    }

    /// The cached contact, with absent fields left empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub fn load_contact(&self) -> Result<Contact, StoreError> {
        Ok(Contact {
            phone: self.get(CredentialKey::Phone)?.unwrap_or_default(),
            email: self.get(CredentialKey::Email)?.unwrap_or_default(),
        })
    }
}
