//! Key/value cache for template lookups with optional per-entry expiry.
//!
//! # Design Decisions
//! - Eviction is lazy: an expired entry is removed when it is next read
//! - Expiry is absolute (`now + expires`), measured on the tokio clock
//! - Population through `fetch_or_store_with` is single-flight per key

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Options for [`TemplateCache::store`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Seconds until the entry expires; `0` means never.
    pub expires: u64,
}

impl StoreOptions {
    pub fn expires_in(secs: u64) -> Self {
        Self { expires: secs }
    }
}

/// Errors for operations a template cache does not offer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("template cache does not support `{0}`")]
    Unsupported(&'static str),
}

/// Thread-safe cache with lazily checked expirations.
pub struct TemplateCache<V> {
    values: DashMap<String, V>,
    expirations: DashMap<String, Instant>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl<V: Clone> TemplateCache<V> {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
            expirations: DashMap::new(),
            inflight: DashMap::new(),
        }
    }

    /// Store `value`, replacing any previous value and expiry for `key`.
    pub fn store(&self, key: &str, value: V, options: StoreOptions) {
        if options.expires > 0 {
            let deadline = Instant::now() + Duration::from_secs(options.expires);
            self.expirations.insert(key.to_string(), deadline);
        } else {
            self.expirations.remove(key);
        }
        self.values.insert(key.to_string(), value);
    }

    /// Cached value, unless missing or expired.
    pub fn load(&self, key: &str) -> Option<V> {
        let deadline = self.expirations.get(key).map(|entry| *entry.value());
        if let Some(deadline) = deadline {
            if Instant::now() > deadline {
                self.delete(key);
                return None;
            }
        }
        self.values.get(key).map(|entry| entry.value().clone())
    }

    /// Cached value or `default`.
    pub fn fetch(&self, key: &str, default: V) -> V {
        self.load(key).unwrap_or(default)
    }

    /// Cached value or the result of `f`. Nothing is stored.
    pub fn fetch_with(&self, key: &str, f: impl FnOnce() -> V) -> V {
        self.load(key).unwrap_or_else(f)
    }

    /// Cached value, or compute it with `f` and store it.
    ///
    /// Concurrent callers missing on the same key wait for the first one, so
    /// `f` runs once per miss.
    pub fn fetch_or_store_with(&self, key: &str, options: StoreOptions, f: impl FnOnce() -> V) -> V {
        if let Some(value) = self.load(key) {
            return value;
        }

        let gate = Arc::clone(self.inflight.entry(key.to_string()).or_default().value());
        let _lock = gate.lock().unwrap_or_else(PoisonError::into_inner);
        let _release = GateRelease {
            inflight: &self.inflight,
            key,
            gate: &gate,
        };

        if let Some(value) = self.load(key) {
            return value;
        }
        let value = f();
        self.store(key, value.clone(), options);
        value
    }

    pub fn delete(&self, key: &str) -> Option<V> {
        self.expirations.remove(key);
        self.values.remove(key).map(|(_, value)| value)
    }

    pub fn clear(&self) {
        self.values.clear();
        self.expirations.clear();
        self.inflight.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn create(&self, _key: &str, _value: V) -> Result<(), CacheError> {
        Err(CacheError::Unsupported("create"))
    }

    pub fn increment(&self, _key: &str, _by: i64) -> Result<i64, CacheError> {
        Err(CacheError::Unsupported("increment"))
    }

    pub fn decrement(&self, _key: &str, _by: i64) -> Result<i64, CacheError> {
        Err(CacheError::Unsupported("decrement"))
    }
}

/// Drops a key's gate from `inflight` on every exit path, unwinding included.
/// Runs before the gate's lock is released.
struct GateRelease<'a> {
    inflight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    gate: &'a Arc<Mutex<()>>,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        self.inflight
            .remove_if(self.key, |_, current| Arc::ptr_eq(current, self.gate));
    }
}

impl<V: Clone> Default for TemplateCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_zero_expiry_never_expires() {
        let cache = TemplateCache::new();
        cache.store("posts/show", "a", StoreOptions::expires_in(0));

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(cache.load("posts/show"), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let cache = TemplateCache::new();
        cache.store("posts/show", "a", StoreOptions::expires_in(2));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.load("posts/show"), Some("a"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.load("posts/show"), None);
        // Evicted from both maps.
        assert!(cache.is_empty());
        assert!(cache.expirations.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_without_expiry_clears_deadline() {
        let cache = TemplateCache::new();
        cache.store("k", 1, StoreOptions::expires_in(2));
        cache.store("k", 2, StoreOptions::default());

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.load("k"), Some(2));
    }

    #[test]
    fn test_fetch_defaults() {
        let cache: TemplateCache<i32> = TemplateCache::new();
        assert_eq!(cache.fetch("k", 5), 5);
        assert_eq!(cache.fetch_with("k", || 6), 6);
        // fetch does not populate
        assert!(cache.load("k").is_none());

        cache.store("k", 1, StoreOptions::default());
        assert_eq!(cache.fetch("k", 5), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = TemplateCache::new();
        cache.store("a", 1, StoreOptions::expires_in(30));
        cache.store("b", 2, StoreOptions::default());

        assert_eq!(cache.delete("a"), Some(1));
        assert_eq!(cache.load("a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unsupported_operations() {
        let cache: TemplateCache<i32> = TemplateCache::new();
        assert_eq!(cache.create("k", 1), Err(CacheError::Unsupported("create")));
        assert_eq!(cache.increment("k", 1), Err(CacheError::Unsupported("increment")));
        assert_eq!(cache.decrement("k", 1), Err(CacheError::Unsupported("decrement")));
    }

    #[test]
    fn test_single_flight_population() {
        let cache = Arc::new(TemplateCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache.fetch_or_store_with("k", StoreOptions::default(), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        42
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.inflight.is_empty());
    }

    #[test]
    fn test_gate_released_on_hit_after_wait() {
        let cache = Arc::new(TemplateCache::new());
        let gate = Arc::clone(cache.inflight.entry("k".to_string()).or_default().value());
        let held = gate.lock().unwrap();

        let waiter = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.fetch_or_store_with("k", StoreOptions::default(), || 0))
        };
        std::thread::sleep(std::time::Duration::from_millis(100));
        cache.store("k", 7, StoreOptions::default());
        drop(held);

        assert_eq!(waiter.join().unwrap(), 7);
        assert!(cache.inflight.is_empty());
    }

    #[test]
    fn test_gate_released_when_populate_panics() {
        let cache: TemplateCache<i32> = TemplateCache::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.fetch_or_store_with("k", StoreOptions::default(), || panic!("lookup failed"))
        }));

        assert!(result.is_err());
        assert!(cache.inflight.is_empty());
        assert_eq!(cache.fetch_or_store_with("k", StoreOptions::default(), || 3), 3);
    }

    #[test]
    fn test_clear_drops_gates() {
        let cache: TemplateCache<i32> = TemplateCache::new();
        cache.inflight.entry("k".to_string()).or_default();
        cache.clear();
        assert!(cache.inflight.is_empty());
    }
}
