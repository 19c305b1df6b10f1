use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async mutual exclusion.
///
/// Two tasks locking the same key serialize; different keys proceed in
/// parallel. Used to give each ticket one workflow walk at a time and each
/// finding one link write at a time, since redelivered copies of the same
/// event can otherwise race on the remote ticket or the link row.
#[derive(Default)]
pub struct KeyedMutex {
    slots: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if another task holds it.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap();
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        slot.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_serializes() {
        let locks = Arc::new(KeyedMutex::new());
        let running = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let running = Arc::clone(&running);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("SEC-1").await;
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_run_concurrently() {
        let locks = Arc::new(KeyedMutex::new());

        let guard_a = locks.lock("SEC-1").await;
        // A different key must not block even while SEC-1 is held.
        let guard_b = tokio::time::timeout(Duration::from_millis(50), locks.lock("SEC-2"))
            .await
            .expect("different key should not block");
        drop(guard_a);
        drop(guard_b);
    }

    #[tokio::test]
    async fn lock_released_on_drop() {
        let locks = KeyedMutex::new();
        {
            let _guard = locks.lock("f-1").await;
        }
        // Re-acquiring after drop must not deadlock.
        let _guard = locks.lock("f-1").await;
    }
}
