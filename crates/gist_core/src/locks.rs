use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};

/// Async mutexes keyed by string, created on demand and dropped once nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<TokioMutex<()>>>>,
}

pub struct KeyGuard<'a> {
    registry: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.to_string()).or_default().clone()
        };

        let guard = mutex.lock_owned().await;
        KeyGuard {
            registry: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.registry.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mutex) = locks.get(&self.key) {
            // The map holds the only reference left: no holder, no waiter.
            if Arc::strong_count(mutex) == 1 {
                locks.remove(&self.key);
            }
        }
    }
}
