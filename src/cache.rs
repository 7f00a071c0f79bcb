//! Cache of table listings, keyed by database identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Storage for `list_sources` results, shared by every adapter pointed at the same database.
pub trait SourceCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<String>>;
    fn put(&self, key: &str, sources: Vec<String>);
    fn invalidate(&self, key: &str);
}

/// In-process `SourceCache`.
#[derive(Default)]
pub struct MemorySourceCache {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl MemorySourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<String>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl fmt::Debug for MemorySourceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySourceCache")
            .field("keys", &self.entries().len())
            .finish()
    }
}

impl SourceCache for MemorySourceCache {
    fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries().get(key).cloned()
    }

    fn put(&self, key: &str, sources: Vec<String>) {
        self.entries().insert(key.to_string(), sources);
    }

    fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_per_key() {
        let cache = MemorySourceCache::new();
        assert_eq!(cache.get("a"), None);
        cache.put("a", vec!["posts".into()]);
        cache.put("b", vec![]);
        assert_eq!(cache.get("a"), Some(vec!["posts".to_string()]));
        assert_eq!(cache.get("b"), Some(vec![]));
        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
    }
}
