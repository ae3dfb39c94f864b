// In-memory cache store keyed per repository.
// Pairs every cached value with the instant it was fetched and applies a single TTL.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{MetricsError, Result};

/// TTL shared by every data kind: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped at `now`.
    pub fn new(data: T, now: DateTime<Utc>) -> Self {
        Self {
            data,
            cached_at: now,
        }
    }

    /// Check if this cached data has expired based on TTL.
    ///
    /// An entry is valid while `now - cached_at < ttl`; a stamp in the future
    /// counts as expired.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        !self.is_expired(ttl, now)
    }
}

/// Map of cached values with one TTL for every key.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, CachedData<V>>,
    ttl: Duration,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl<K: Eq + Hash + Debug, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Whether the entry for `key` has outlived the TTL.
    ///
    /// Fails with `NotCached` when nothing was ever stored for `key`.
    pub fn is_expired(&self, key: &K, now: DateTime<Utc>) -> Result<bool> {
        self.entries
            .get(key)
            .map(|entry| entry.is_expired(self.ttl, now))
            .ok_or_else(|| MetricsError::NotCached(format!("{:?}", key)))
    }

    /// Whether a valid entry exists for `key`. Absent keys are not fresh.
    pub fn is_fresh(&self, key: &K, now: DateTime<Utc>) -> bool {
        matches!(self.is_expired(key, now), Ok(false))
    }

    /// Stored value for `key`, regardless of age.
    pub fn value(&self, key: &K) -> Result<&V> {
        self.entries
            .get(key)
            .map(|entry| &entry.data)
            .ok_or_else(|| MetricsError::NotCached(format!("{:?}", key)))
    }

    /// When the entry for `key` was last refreshed.
    pub fn cached_at(&self, key: &K) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|entry| entry.cached_at)
    }

    /// Replace the entry for `key` wholesale and stamp it at `now`.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) -> &V {
        let entry = CachedData::new(value, now);
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                &occupied.into_mut().data
            }
            Entry::Vacant(vacant) => &vacant.insert(entry).data,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
