//! Session storage.
//!
//! `SessionStore` is the only way the service touches records, so a persistent
//! backend can replace `InMemorySessionStore` without changing the service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::error::SessionError;
use super::reaper::Reaper;
use super::session::SessionRecord;

pub trait SessionStore: Send + Sync {
    /// Insert by id and index by token. Last write wins on a duplicate id.
    fn create(&self, record: SessionRecord) -> Result<(), SessionError>;

    /// `NotFound` when absent, `Expired` when present but expired (not removed).
    fn get(&self, id: &str) -> Result<SessionRecord, SessionError>;

    fn get_by_token(&self, token: &str) -> Result<SessionRecord, SessionError>;

    /// Replace the record for a known, still-live id. `Expired` if the stored
    /// record has expired in the meantime.
    fn update(&self, record: SessionRecord) -> Result<(), SessionError>;

    fn delete(&self, id: &str) -> Result<(), SessionError>;

    /// All records that are not expired.
    fn list(&self) -> Result<Vec<SessionRecord>, SessionError>;

    /// Remove every expired record and return how many were removed.
    fn delete_expired(&self) -> Result<usize, SessionError>;
}

/// Both indexes live behind one lock so they can never disagree.
#[derive(Debug, Default)]
struct SessionTable {
    by_id: HashMap<String, SessionRecord>,
    /// token -> session id
    by_token: HashMap<String, String>,
}

impl SessionTable {
    fn live(record: &SessionRecord, now: DateTime<Utc>) -> Result<SessionRecord, SessionError> {
        if record.is_expired_at(now) {
            return Err(SessionError::Expired);
        }
        Ok(record.clone())
    }

    fn insert(&mut self, record: SessionRecord) {
        if let Some(prev) = self.by_id.get(&record.id) {
            if prev.token != record.token {
                let prev_token = prev.token.clone();
                self.unindex_token(&prev_token, &record.id);
            }
        }
        self.by_token.insert(record.token.clone(), record.id.clone());
        self.by_id.insert(record.id.clone(), record);
    }

    /// Drop `token` from the index only while it still points at `id`.
    fn unindex_token(&mut self, token: &str, id: &str) {
        if self.by_token.get(token).map(String::as_str) == Some(id) {
            self.by_token.remove(token);
        }
    }

    fn remove(&mut self, id: &str) -> Option<SessionRecord> {
        let record = self.by_id.remove(id)?;
        self.unindex_token(&record.token, id);
        Some(record)
    }

    fn delete_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .by_id
            .values()
            .filter(|r| r.is_expired_at(now))
            .map(|r| r.id.clone())
            .collect();
        for id in &expired {
            if let Some(r) = self.remove(id) {
                tracing::debug!(
                    id = %r.id,
                    username = %r.username,
                    created = %r.created_at.to_rfc3339(),
                    last_access = %r.last_access_at.to_rfc3339(),
                    "deleting expired session"
                );
            }
        }
        expired.len()
    }
}

/// Process-lifetime session store with a background reaper.
pub struct InMemorySessionStore {
    table: Arc<RwLock<SessionTable>>,
    reaper: Reaper,
}

impl InMemorySessionStore {
    /// Create the store and start sweeping expired sessions every `cleanup_interval`.
    pub fn new(cleanup_interval: Duration) -> Self {
        let table = Arc::new(RwLock::new(SessionTable::default()));
        let sweep_table = table.clone();
        let reaper = Reaper::start(cleanup_interval, move || {
            let removed = sweep_table.write().delete_expired(Utc::now());
            if removed > 0 {
                tracing::info!(removed = removed, "deleted expired sessions");
            }
            Ok(removed)
        });
        Self { table, reaper }
    }

    /// Stop the background reaper and wait for it to exit.
    pub fn stop(&self) {
        self.reaper.stop();
    }

    pub fn reaper_running(&self) -> bool {
        self.reaper.is_running()
    }

    /// Physically stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.table.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, record: SessionRecord) -> Result<(), SessionError> {
        self.table.write().insert(record);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<SessionRecord, SessionError> {
        let table = self.table.read();
        let record = table.by_id.get(id).ok_or(SessionError::NotFound)?;
        SessionTable::live(record, Utc::now())
    }

    fn get_by_token(&self, token: &str) -> Result<SessionRecord, SessionError> {
        let table = self.table.read();
        let id = table.by_token.get(token).ok_or(SessionError::NotFound)?;
        let record = table.by_id.get(id).ok_or(SessionError::NotFound)?;
        SessionTable::live(record, Utc::now())
    }

    fn update(&self, record: SessionRecord) -> Result<(), SessionError> {
        let mut table = self.table.write();
        let current = table.by_id.get(&record.id).ok_or(SessionError::NotFound)?;
        // Expiry is re-checked under the write lock so a touch never revives a dead record.
        if current.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }
        table.insert(record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.table.write().remove(id).map(|_| ()).ok_or(SessionError::NotFound)
    }

    fn list(&self) -> Result<Vec<SessionRecord>, SessionError> {
        let now = Utc::now();
        let table = self.table.read();
        Ok(table.by_id.values().filter(|r| !r.is_expired_at(now)).cloned().collect())
    }

    fn delete_expired(&self) -> Result<usize, SessionError> {
        Ok(self.table.write().delete_expired(Utc::now()))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
