// In-memory key/value stores for user profiles and chat sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Key/value storage injected into the puzzle and chat flows.
///
/// Implementations must apply `update` atomically: the closure sees the
/// current value (or `V::default()` when the key is new) and its changes are
/// visible to the next caller.
pub trait Store<V: Clone + Default>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn put(&self, key: &str, value: V);
    /// Remove a value. Returns whether the key existed.
    fn delete(&self, key: &str) -> bool;
    /// Read-modify-write under the store's lock, creating the entry lazily.
    fn update(&self, key: &str, f: &mut dyn FnMut(&mut V));
    fn len(&self) -> usize;
    /// Snapshot of all `(key, value)` pairs, in no particular order.
    fn entries(&self) -> Vec<(String, V)>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe in-memory store. State is lost on restart.
#[derive(Debug, Clone)]
pub struct MemoryStore<V> {
    inner: Arc<Mutex<HashMap<String, V>>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, V>> {
        // Poisoning is ignored: entries stay usable after a panicking update.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Default + Send,
{
    fn get(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: &str, value: V) {
        self.lock().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    fn update(&self, key: &str, f: &mut dyn FnMut(&mut V)) {
        let mut map = self.lock();
        let value = map.entry(key.to_string()).or_default();
        f(value);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn entries(&self) -> Vec<(String, V)> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
