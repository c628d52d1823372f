//! In-flight request coalescing for the Salonflow services
//!
//! Identical requests that arrive while an earlier one is still being served
//! share that request's result instead of issuing their own load. Entries are
//! keyed by HTTP verb and path (plus a viewer scope where responses differ per
//! caller) and are dropped as soon as the shared load resolves, so this is a
//! deduplication map, not a TTL cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Build a coalescing key from an HTTP verb, a path, and a viewer scope.
///
/// The scope keeps callers with different visibility (admin, owner, user)
/// from ever sharing a flight.
pub fn request_key(method: &str, path: &str, scope: &str) -> String {
    format!("{}:{}:{}", method, path, scope)
}

/// Map from request key to the in-flight load for that key
#[derive(Clone)]
pub struct RequestCache<V> {
    inflight: Arc<Mutex<HashMap<String, Arc<OnceCell<V>>>>>,
}

impl<V: Clone> RequestCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `load` for `key`, or join the load already in flight for it.
    ///
    /// The first caller for a key executes `load`; concurrent callers with the
    /// same key await the same result. Once the load resolves the entry is
    /// removed, so a later request starts a fresh flight. A failed load is
    /// reported to its caller and never cached.
    pub async fn coalesce<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell.get_or_try_init(load).await.cloned();

        let mut inflight = self.inflight.lock().await;
        if let Some(current) = inflight.get(key) {
            // A newer flight may already occupy the slot; only clear our own.
            if Arc::ptr_eq(current, &cell) {
                inflight.remove(key);
            }
        }

        result
    }

    /// Number of loads currently in flight
    pub async fn in_flight(&self) -> usize {
        self.inflight.lock().await.len()
    }
}

impl<V: Clone> Default for RequestCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let cache: RequestCache<u64> = RequestCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        let key = request_key("GET", "/appointments", "admin");
        let load = |counter: Arc<AtomicUsize>| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<u64, String>(42)
        };

        let (a, b) = tokio::join!(
            cache.coalesce(&key, || load(loads.clone())),
            cache.coalesce(&key, || load(loads.clone())),
        );

        assert_eq!(a.unwrap(), 42);
        assert_eq!(b.unwrap(), 42);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_sequential_callers_load_again() {
        let cache: RequestCache<u64> = RequestCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = loads.clone();
            let value = cache
                .coalesce("GET:/appointments:u1", || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<u64, String>(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_scopes_do_not_share() {
        let cache: RequestCache<&'static str> = RequestCache::new();

        let admin = cache
            .coalesce(&request_key("GET", "/appointments", "admin"), || async {
                Ok::<_, String>("all")
            })
            .await
            .unwrap();
        let user = cache
            .coalesce(&request_key("GET", "/appointments", "u1"), || async {
                Ok::<_, String>("own")
            })
            .await
            .unwrap();

        assert_eq!(admin, "all");
        assert_eq!(user, "own");
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: RequestCache<u64> = RequestCache::new();

        let failed = cache
            .coalesce("GET:/appointments:u1", || async {
                Err::<u64, String>("boom".to_string())
            })
            .await;
        assert_eq!(failed.unwrap_err(), "boom");
        assert_eq!(cache.in_flight().await, 0);

        let value = cache
            .coalesce("GET:/appointments:u1", || async { Ok::<u64, String>(1) })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }
}
