//! Process-lifetime plan storage.
//!
//! Plans are written once under a freshly generated [`PlanId`] and read any
//! number of times afterwards. Nothing is evicted; the store is cleared when
//! the server that owns it shuts down.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

/// Opaque plan identifier: a random v4 UUID shown as 32 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanId(Uuid);

impl PlanId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PlanId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Shared map from [`PlanId`] to an immutable plan.
///
/// Readers share the lock; inserts take it exclusively. Lock poisoning is
/// recovered from, since a plan is fully built before it is inserted.
#[derive(Debug)]
pub struct PlanStore<P = crate::model::Plan> {
    plans: RwLock<HashMap<PlanId, Arc<P>>>,
}

impl<P> Default for PlanStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PlanStore<P> {
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
        }
    }

    /// Store `plan` under a new identifier and return it.
    pub fn insert(&self, plan: P) -> PlanId {
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        // A v4 collision is not expected, but an identifier must never be reused.
        let id = loop {
            let candidate = PlanId::new_random();
            if !plans.contains_key(&candidate) {
                break candidate;
            }
        };
        plans.insert(id, Arc::new(plan));
        tracing::info!(plan_id = %id, stored = plans.len(), "stored plan");
        id
    }

    pub fn get(&self, id: &PlanId) -> Option<Arc<P>> {
        self.plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Look up by the textual identifier used in URLs. Malformed
    /// identifiers are simply not found.
    pub fn get_str(&self, id: &str) -> Option<Arc<P>> {
        let id = id.parse::<PlanId>().ok()?;
        self.get(&id)
    }

    pub fn len(&self) -> usize {
        self.plans.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored plan. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        let removed = plans.len();
        plans.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn insert_then_get_returns_same_value() {
        let store: PlanStore<String> = PlanStore::new();
        let id = store.insert("plan".to_string());
        assert_eq!(store.get(&id).as_deref(), Some(&"plan".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let store: PlanStore<String> = PlanStore::new();
        store.insert("plan".to_string());
        assert!(store.get(&PlanId::new_random()).is_none());
        assert!(store.get_str("not-an-id").is_none());
    }

    #[test]
    fn ids_are_unique_and_hex() {
        let store: PlanStore<u32> = PlanStore::new();
        let a = store.insert(1);
        let b = store.insert(2);
        assert_ne!(a, b);
        let text = a.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(store.get_str(&text).as_deref(), Some(&1));
    }

    #[test]
    fn clear_empties_store() {
        let store: PlanStore<u32> = PlanStore::new();
        store.insert(1);
        store.insert(2);
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_inserts_and_reads() {
        let store: Arc<PlanStore<usize>> = Arc::new(PlanStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let id = store.insert(i);
                    assert_eq!(store.get(&id).as_deref(), Some(&i));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
