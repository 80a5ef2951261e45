use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keyed async locks for per-entity serialization.
///
/// Hands out one mutex per key, so operations on the same meter or order id
/// are mutually exclusive while unrelated entities proceed in parallel. The
/// registry itself is only locked long enough to look up or create the entry.
#[derive(Default)]
pub struct LockRegistry<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> LockRegistry<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `key`, creating it on first use. Callers hold the
    /// returned mutex for the duration of their critical section.
    pub async fn lock_for(&self, key: K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_same_key_serializes() {
        let registry = Arc::new(LockRegistry::new());
        let counter = Arc::new(AtomicU64::new(0));
        let peak = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let counter = counter.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let lock = registry.lock_for("meter-1").await;
                let _guard = lock.lock().await;
                let inside = counter.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(inside, Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let registry = LockRegistry::new();
        let a = registry.lock_for("a").await;
        let _guard_a = a.lock().await;
        // A different key must still be lockable while "a" is held.
        let b = registry.lock_for("b").await;
        assert!(b.try_lock().is_ok());
    }
}
