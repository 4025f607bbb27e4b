//! Registry of fetches that have started but not yet terminated

use crate::endpoint::Endpoint;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// One in-flight fetch
#[derive(Debug, Clone)]
pub struct InFlightEntry {
    pub id: Uuid,
    pub endpoint: Endpoint,
    pub started_at: DateTime<Utc>,
}

/// Shared set of in-flight fetches
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    entries: Arc<Mutex<HashMap<Uuid, InFlightEntry>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fetch and returns the guard that keeps it registered
    pub fn register(&self, endpoint: Endpoint) -> InFlightGuard {
        let entry = InFlightEntry {
            id: Uuid::new_v4(),
            endpoint,
            started_at: Utc::now(),
        };
        let id = entry.id;
        self.lock().insert(id, entry);

        InFlightGuard {
            id,
            registry: self.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    /// Copies the current entries, oldest first
    pub fn snapshot(&self) -> Vec<InFlightEntry> {
        let mut entries: Vec<_> = self.lock().values().cloned().collect();
        entries.sort_by_key(|e| e.started_at);
        entries
    }

    fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    // A poisoned lock still holds a consistent map; entries are independent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, InFlightEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// RAII registration for one fetch
///
/// Removes its entry exactly once, when dropped.
pub struct InFlightGuard {
    id: Uuid,
    registry: InFlightRegistry,
}

impl InFlightGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.registry.remove(self.id) {
            tracing::warn!(request_id = %self.id, "In-flight entry already removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_entry_on_drop() {
        let registry = InFlightRegistry::new();
        let guard = registry.register(Endpoint::tickers());
        let id = guard.id();

        assert!(registry.contains(id));
        assert_eq!(registry.len(), 1);

        drop(guard);
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entries_are_independent() {
        let registry = InFlightRegistry::new();
        let a = registry.register(Endpoint::ticker("BTC-USD"));
        let b = registry.register(Endpoint::ticker("BTC-USD"));
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);

        drop(a);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot()[0].id, b.id());
    }

    #[test]
    fn test_concurrent_register_and_drop() {
        let registry = InFlightRegistry::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let guard = registry.register(Endpoint::new(format!("tickers/{}", i)));
                        drop(guard);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
