//! In-memory cache implementation.
//!
//! [`MemoryCache`] keeps entries in a process-local map shared by all bucket
//! handles. Buckets are namespaced by name, so two buckets never observe each
//! other's keys. There is no eviction: the map grows with the set of distinct
//! keys, which for sitemap presentation contexts is bounded by
//! records x locales x transformers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

type Store = Arc<RwLock<HashMap<(String, String), Entry>>>;

/// A stored value with the etag it was written under.
struct Entry {
    etag: String,
    data: Vec<u8>,
}

/// Process-local in-memory [`Cache`].
///
/// Cloning-free sharing: every bucket handle holds an [`Arc`] to the same
/// underlying map, so handles opened for the same name see each other's
/// writes.
#[derive(Default)]
pub struct MemoryCache {
    store: Store,
}

impl MemoryCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            store: Arc::clone(&self.store),
        })
    }
}

/// A single named bucket over the shared map.
struct MemoryCacheBucket {
    name: String,
    store: Store,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let store = self.store.read().ok()?;
        let entry = store.get(&(self.name.clone(), key.to_owned()))?;

        // An empty etag skips validation
        if !etag.is_empty() && entry.etag != etag {
            return None;
        }

        Some(entry.data.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        if let Ok(mut store) = self.store.write() {
            store.insert(
                (self.name.clone(), key.to_owned()),
                Entry {
                    etag: etag.to_owned(),
                    data: value.to_vec(),
                },
            );
        }
    }
}
