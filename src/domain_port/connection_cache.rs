use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache codec error: {0}")]
    Codec(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Vec<UserId>),
    /// `generation` must be handed back to `put`; any `invalidate` in between voids the fill.
    Miss { generation: u64 },
}

/// Read-through cache of a user's connection list.
#[async_trait::async_trait]
pub trait ConnectionCache: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<CacheLookup, CacheError>;
    /// Stores `connections` only if no invalidation happened since the miss that produced `generation`.
    async fn put(
        &self,
        user_id: UserId,
        generation: u64,
        connections: &[UserId],
    ) -> Result<(), CacheError>;
    /// Drops the entries and bumps each user's generation.
    async fn invalidate(&self, users: &[UserId]) -> Result<(), CacheError>;
}
