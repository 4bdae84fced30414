//! Bounded record of recently authenticated users

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Most recently verified user ids, oldest first, capped at a fixed capacity
///
/// The whole check-insert-evict sequence happens under one lock; the queue itself is
/// never handed out.
#[derive(Debug)]
pub struct ActiveUsers {
    capacity: usize,
    ids: Mutex<VecDeque<i64>>,
}

impl ActiveUsers {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ids: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mark_active(&self, id: i64) {
        let mut ids = self.lock();
        if !ids.contains(&id) {
            ids.push_back(id);
        }
        while ids.len() > self.capacity {
            ids.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<i64> {
        self.lock().iter().copied().collect()
    }

    // A panic while holding the lock cannot leave the queue half-updated, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<i64>> {
        self.ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
