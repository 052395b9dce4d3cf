//! Time-to-live memoization owned by a [`crate::NameService`].
//!
//! Last writer wins; concurrent refreshes of an expired key are not
//! deduplicated.

use crate::config::ClientConfig;
use crate::models::{NameId, TldId};
use core::borrow::Borrow;
use core::hash::Hash;
use core::time::Duration;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;

/// Map whose entries expire `ttl` after they were written.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Empty cache.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    /// Fresh value for `key` as of `now`.
    pub fn get_at<Q>(&self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entries = self.entries.lock();
        let (value, written) = entries.get(key)?;
        (now.saturating_duration_since(*written) < self.ttl).then(|| value.clone())
    }

    /// Store `value`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Store `value` as written at `now`.
    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        self.entries.lock().insert(key, (value, now));
    }

    /// Drop the entry for `key`.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.lock().remove(key);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Caches consulted by the facade.
#[derive(Debug)]
pub struct NameServiceCache {
    /// TLD (`hh`) to its V3 registry.
    pub tld_ids: TtlCache<String, TldId>,
    /// Normalized name (`foo.hh`) to its on-chain handle.
    pub name_ids: TtlCache<String, NameId>,
    /// USD per HBAR.
    pub exchange_rate: TtlCache<(), f64>,
}

impl NameServiceCache {
    /// Empty caches with the TTLs from `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            tld_ids: TtlCache::new(config.id_cache_ttl()),
            name_ids: TtlCache::new(config.id_cache_ttl()),
            exchange_rate: TtlCache::new(config.exchange_rate_ttl()),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.tld_ids.clear();
        self.name_ids.clear();
        self.exchange_rate.clear();
    }
}
