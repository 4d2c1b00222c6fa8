use chrono::{DateTime, Duration, NaiveDate, Utc};
use contracts::enums::channel::Channel;
use contracts::projections::p900_canonical_orders::RawOrderRecord;
use std::collections::HashMap;
use std::sync::Arc;

use crate::shared::config::{CacheConfig, MAX_CACHE_TTL_SECONDS};

/// Date range a fetch was made for; `None` bounds are open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QueryWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl QueryWindow {
    /// Everything the source has
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }
}

pub type CacheKey = (Channel, QueryWindow);

#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Arc<Vec<RawOrderRecord>>,
    expires_at: DateTime<Utc>,
}

/// Raw fetch results owned by the caller, each entry valid until its
/// `expires_at`. The clock is always passed in.
#[derive(Debug, Clone)]
pub struct FetchCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// TTL clamped to `1..=MAX_CACHE_TTL_SECONDS` for configs that skipped
    /// validation
    pub fn from_config(config: &CacheConfig) -> Self {
        let seconds = config.ttl_seconds.clamp(1, MAX_CACHE_TTL_SECONDS);
        Self::new(Duration::seconds(seconds))
    }

    /// Rows for `key` if present and not expired at `now`
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<Vec<RawOrderRecord>>> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| Arc::clone(&entry.rows))
    }

    /// Store rows; returns the expiry time of the new entry
    pub fn insert(
        &mut self,
        key: CacheKey,
        rows: Vec<RawOrderRecord>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        self.store(key, Arc::new(rows), now)
    }

    fn store(
        &mut self,
        key: CacheKey,
        rows: Arc<Vec<RawOrderRecord>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, CacheEntry { rows, expires_at });
        expires_at
    }

    /// Cached rows, or the result of `load` stored under `key`
    pub fn get_or_load<F, E>(
        &mut self,
        key: CacheKey,
        now: DateTime<Utc>,
        load: F,
    ) -> Result<Arc<Vec<RawOrderRecord>>, E>
    where
        F: FnOnce() -> Result<Vec<RawOrderRecord>, E>,
    {
        if let Some(rows) = self.get(&key, now) {
            tracing::debug!("Cache hit for {} {:?}", key.0, key.1);
            return Ok(rows);
        }
        let rows = Arc::new(load()?);
        let expires_at = self.store(key, Arc::clone(&rows), now);
        tracing::debug!("Cached {} rows for {} until {}", rows.len(), key.0, expires_at);
        Ok(rows)
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
