//! Per-origin robots policy cache
//!
//! Entries are populated lazily and never invalidated for the lifetime of the
//! process. Concurrent jobs may race to populate the same origin; the first
//! insert wins and later fetches are dropped.

use super::RobotsPolicy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutex-guarded map from origin (`scheme://host[:port]`) to policy
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, Arc<RobotsPolicy>>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for an origin, if any
    pub fn get(&self, origin: &str) -> Option<Arc<RobotsPolicy>> {
        self.lock().get(origin).cloned()
    }

    /// Inserts a policy unless one is already cached, returning the cached one
    pub fn insert(&self, policy: RobotsPolicy) -> Arc<RobotsPolicy> {
        let mut entries = self.lock();
        entries
            .entry(policy.origin().to_string())
            .or_insert_with(|| Arc::new(policy))
            .clone()
    }

    /// Number of cached origins
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<RobotsPolicy>>> {
        // The map is always left consistent, so a poisoned lock is still usable
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
