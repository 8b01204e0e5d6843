use crate::domain_model::UserId;
use crate::domain_port::*;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Slot {
    generation: u64,
    cached: Option<(Instant, Vec<UserId>)>,
}

/// Per-process cache. Slots outlive their entries so the generation survives
/// expiry and invalidation.
pub struct MemoryConnectionCache {
    slots: DashMap<UserId, Slot>,
    ttl: Duration,
}

impl MemoryConnectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl ConnectionCache for MemoryConnectionCache {
    async fn get(&self, user_id: UserId) -> Result<CacheLookup, CacheError> {
        let Some(mut slot) = self.slots.get_mut(&user_id) else {
            return Ok(CacheLookup::Miss { generation: 0 });
        };

        let fresh = slot
            .cached
            .as_ref()
            .filter(|(cached_at, _)| cached_at.elapsed() < self.ttl)
            .map(|(_, connections)| connections.clone());
        if let Some(connections) = fresh {
            return Ok(CacheLookup::Hit(connections));
        }

        slot.cached = None;
        Ok(CacheLookup::Miss {
            generation: slot.generation,
        })
    }

    async fn put(
        &self,
        user_id: UserId,
        generation: u64,
        connections: &[UserId],
    ) -> Result<(), CacheError> {
        // entry() holds the shard lock across the compare and the write
        let mut slot = self.slots.entry(user_id).or_default();
        if slot.generation == generation {
            slot.cached = Some((Instant::now(), connections.to_vec()));
        }
        Ok(())
    }

    async fn invalidate(&self, users: &[UserId]) -> Result<(), CacheError> {
        for user in users {
            let mut slot = self.slots.entry(*user).or_default();
            slot.generation += 1;
            slot.cached = None;
        }
        Ok(())
    }
}

/// Cache backend "none": every lookup misses.
#[derive(Debug, Default)]
pub struct NoConnectionCache;

#[async_trait::async_trait]
impl ConnectionCache for NoConnectionCache {
    async fn get(&self, _user_id: UserId) -> Result<CacheLookup, CacheError> {
        Ok(CacheLookup::Miss { generation: 0 })
    }

    async fn put(
        &self,
        _user_id: UserId,
        _generation: u64,
        _connections: &[UserId],
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _users: &[UserId]) -> Result<(), CacheError> {
        Ok(())
    }
}
