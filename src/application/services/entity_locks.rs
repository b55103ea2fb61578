use crate::domain::entities::modification::EntityKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed lock table serializing tracking calls per entity.
///
/// Entries are created on demand and dropped again once nobody holds or waits
/// for them, so the table only grows with the number of entities in flight.
#[derive(Debug, Default)]
pub struct EntityLocks {
    slots: Mutex<HashMap<EntityKey, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(self: &Arc<Self>, key: EntityKey) -> EntityLockGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let guard = slot.lock_owned().await;
        EntityLockGuard {
            locks: Arc::clone(self),
            key,
            guard: Some(guard),
        }
    }

    /// Number of entities currently locked or awaited.
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn release(&self, key: &EntityKey) {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(slot) = slots.get(key) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(key);
            }
        }
    }
}

pub struct EntityLockGuard {
    locks: Arc<EntityLocks>,
    key: EntityKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntityLockGuard {
    fn drop(&mut self) {
        // the owned guard holds a reference to the slot; release it first
        self.guard.take();
        self.locks.release(&self.key);
    }
}
