//! Resolved-read cache
//!
//! Memoizes unscoped `get` resolutions. Invalidation is coarse: any mutating
//! call discards every entry, trading precision for a guaranteed absence of
//! stale reads.

use crate::error::{Error, Result};
use crate::sync::RwLockExt;
use crate::value::ConfigValue;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::RwLock;

/// Cache strategy for resolved reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStrategy {
    /// Cache every resolved read (default)
    #[default]
    Full,
    /// LRU cache with maximum entries
    Lru(usize),
    /// No caching, every read re-resolves
    None,
}

impl CacheStrategy {
    /// Validate cache strategy configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the LRU size is 0.
    pub fn validate(&self) -> Result<()> {
        match self {
            CacheStrategy::Lru(size) if *size == 0 => Err(Error::Config(
                "LRU cache size must be greater than 0".into(),
            )),
            _ => Ok(()),
        }
    }
}

enum Entries {
    Full(HashMap<String, ConfigValue>),
    Lru(Box<LruCache<String, ConfigValue>>),
    Disabled,
}

/// Coarse-grained memoization of resolved reads
pub struct ResolveCache {
    entries: RwLock<Entries>,
}

impl ResolveCache {
    /// Create a cache with the given strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy is invalid (zero-sized LRU).
    pub fn new(strategy: CacheStrategy) -> Result<Self> {
        strategy.validate()?;
        let entries = match strategy {
            CacheStrategy::Full => Entries::Full(HashMap::new()),
            CacheStrategy::Lru(size) => {
                let capacity = NonZeroUsize::new(size)
                    .ok_or_else(|| Error::Config("LRU cache size must be greater than 0".into()))?;
                Entries::Lru(Box::new(LruCache::new(capacity)))
            }
            CacheStrategy::None => Entries::Disabled,
        };
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Look up a memoized resolution
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        {
            let guard = self.entries.read_recovered();
            match &*guard {
                Entries::Full(map) => return map.get(key).cloned(),
                Entries::Disabled => return None,
                Entries::Lru(_) => {}
            }
        }

        // LRU lookups touch recency, which needs the write lock. The read
        // guard above is released first.
        let mut guard = self.entries.write_recovered();
        match &mut *guard {
            Entries::Lru(lru) => lru.get(key).cloned(),
            _ => None,
        }
    }

    /// Memoize a resolved read
    pub fn insert(&self, key: &str, value: ConfigValue) {
        let mut guard = self.entries.write_recovered();
        match &mut *guard {
            Entries::Full(map) => {
                map.insert(key.to_string(), value);
            }
            Entries::Lru(lru) => {
                lru.put(key.to_string(), value);
            }
            Entries::Disabled => {}
        }
    }

    /// Discard every entry
    pub fn invalidate(&self) {
        let mut guard = self.entries.write_recovered();
        match &mut *guard {
            Entries::Full(map) => map.clear(),
            Entries::Lru(lru) => lru.clear(),
            Entries::Disabled => {}
        }
        log::debug!("Resolve cache invalidated");
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        match &*self.entries.read_recovered() {
            Entries::Full(map) => map.len(),
            Entries::Lru(lru) => lru.len(),
            Entries::Disabled => 0,
        }
    }

    /// True if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
