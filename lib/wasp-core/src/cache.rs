use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::declaration::OperationId;
use crate::error::WaspError;
use crate::metadata::EndpointMetadata;

/// Values that may represent an absent input.
///
/// The cache rejects absent keys and values instead of storing them.
pub trait Presence {
    /// Returns `true` if the value stands for "nothing".
    fn is_absent(&self) -> bool;
}

impl Presence for OperationId {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Presence for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl Presence for &str {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Presence for Option<T> {
    fn is_absent(&self) -> bool {
        self.is_none()
    }
}

impl Presence for EndpointMetadata {
    fn is_absent(&self) -> bool {
        false
    }
}

impl<T: Presence + ?Sized> Presence for Arc<T> {
    fn is_absent(&self) -> bool {
        T::is_absent(self)
    }
}

/// Thread-safe memoized store with access-order recency.
///
/// Entries are ordered from least to most recently used: every `put` and
/// every successful `get` moves the entry to the most recent position.
/// There is no size bound.
///
/// All operations go through a single lock over the ordered map.
///
/// # Example
///
/// ```rust
/// use wasp_core::WaspCache;
///
/// # fn main() -> Result<(), wasp_core::WaspError> {
/// let cache = WaspCache::new();
/// cache.put("a".to_string(), 1_u32.to_string())?;
/// cache.put("b".to_string(), 2_u32.to_string())?;
/// cache.get(&"a".to_string())?;
///
/// assert_eq!(cache.least_recently_used(), Some("b".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WaspCache<K, V> {
    entries: Mutex<IndexMap<K, V>>,
}

impl<K, V> Default for WaspCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
        }
    }
}

impl<K, V> WaspCache<K, V>
where
    K: Presence + Hash + Eq + Clone,
    V: Presence + Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` as the most recent entry.
    ///
    /// An existing entry for `key` is replaced.
    ///
    /// # Errors
    ///
    /// Fails if `key` or `value` is absent.
    pub fn put(&self, key: K, value: V) -> Result<(), WaspError> {
        if key.is_absent() {
            return Err(WaspError::AbsentKey);
        }
        if value.is_absent() {
            return Err(WaspError::AbsentValue);
        }
        let mut entries = self.lock();
        entries.shift_remove(&key);
        entries.insert(key, value);
        Ok(())
    }

    /// Returns the value stored under `key`, promoting it to most recent.
    ///
    /// `Ok(None)` means the key is not cached.
    ///
    /// # Errors
    ///
    /// Fails if `key` is absent.
    pub fn get(&self, key: &K) -> Result<Option<V>, WaspError> {
        if key.is_absent() {
            return Err(WaspError::AbsentKey);
        }
        let mut entries = self.lock();
        let Some(index) = entries.get_index_of(key) else {
            return Ok(None);
        };
        let last = entries.len() - 1;
        entries.move_index(index, last);
        Ok(entries.get_index(last).map(|(_, value)| value.clone()))
    }

    /// Removes the entry for `key`, if any.
    ///
    /// # Errors
    ///
    /// Fails if `key` is absent.
    pub fn remove(&self, key: &K) -> Result<(), WaspError> {
        if key.is_absent() {
            return Err(WaspError::AbsentKey);
        }
        self.lock().shift_remove(key);
        Ok(())
    }

    /// The least recently used key, the first candidate for eviction.
    pub fn least_recently_used(&self) -> Option<K> {
        self.lock().first().map(|(key, _)| key.clone())
    }

    /// The keys from least to most recently used.
    pub fn keys(&self) -> Vec<K> {
        self.lock().keys().cloned().collect()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<K, V>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The cache of extracted endpoint metadata.
pub type MetadataCache = WaspCache<OperationId, Arc<EndpointMetadata>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn key(name: &str) -> OperationId {
        OperationId::new("Service", name)
    }

    #[test]
    fn test_put_and_get() {
        let cache = WaspCache::new();
        cache.put(key("a"), "first".to_string()).expect("valid entry");

        let value = cache.get(&key("a")).expect("valid key");

        assert_eq!(value.as_deref(), Some("first"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_is_not_an_error() {
        let cache = WaspCache::<OperationId, String>::new();

        let value = cache.get(&key("missing")).expect("valid key");

        assert!(value.is_none());
    }

    #[test]
    fn test_get_promotes_entry() {
        let cache = WaspCache::new();
        cache.put(key("a"), "A".to_string()).expect("valid entry");
        cache.put(key("b"), "B".to_string()).expect("valid entry");

        cache.get(&key("a")).expect("valid key");

        assert_eq!(cache.least_recently_used(), Some(key("b")));
        assert_eq!(cache.keys(), vec![key("b"), key("a")]);
    }

    #[test]
    fn test_put_overwrite_promotes_entry() {
        let cache = WaspCache::new();
        cache.put(key("a"), "A".to_string()).expect("valid entry");
        cache.put(key("b"), "B".to_string()).expect("valid entry");

        cache.put(key("a"), "A2".to_string()).expect("valid entry");

        assert_eq!(cache.keys(), vec![key("b"), key("a")]);
        assert_eq!(
            cache.get(&key("a")).expect("valid key").as_deref(),
            Some("A2")
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_remove() {
        let cache = WaspCache::new();
        cache.put(key("a"), "A".to_string()).expect("valid entry");

        cache.remove(&key("a")).expect("valid key");
        cache.remove(&key("a")).expect("removing twice is silent");

        assert!(cache.is_empty());
        assert_eq!(cache.least_recently_used(), None);
    }

    #[test]
    fn test_absent_inputs_are_rejected() {
        let cache = WaspCache::<OperationId, Option<String>>::new();
        let absent = OperationId::default();

        let error = cache
            .put(absent.clone(), Some("value".to_string()))
            .expect_err("absent key");
        assert_eq!(error.kind(), ErrorKind::Precondition);

        let error = cache.put(key("a"), None).expect_err("absent value");
        assert_eq!(error.kind(), ErrorKind::Precondition);

        let error = cache.get(&absent).expect_err("absent key");
        assert!(matches!(error, WaspError::AbsentKey));

        let error = cache.remove(&absent).expect_err("absent key");
        assert!(matches!(error, WaspError::AbsentKey));

        assert!(cache.is_empty());
    }
}
