use crate::domain_model::UserId;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const CONNECTION_FILL: &str = include_str!("connection_fill.lua");

/// Shared cache for all service instances. Values are JSON arrays of user ids;
/// a sibling `:gen` counter per user fences fills against invalidations.
pub struct RedisConnectionCache {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: u64,
    fill: Script,
}

impl RedisConnectionCache {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, ttl_secs: u64) -> Self {
        RedisConnectionCache {
            conn,
            prefix: prefix.into(),
            ttl_secs,
            fill: Script::new(CONNECTION_FILL),
        }
    }

    fn key(&self, user_id: UserId) -> String {
        format!("{}:connections:{}", self.prefix, user_id)
    }

    fn generation_key(&self, user_id: UserId) -> String {
        format!("{}:connections:{}:gen", self.prefix, user_id)
    }
}

#[async_trait::async_trait]
impl ConnectionCache for RedisConnectionCache {
    async fn get(&self, user_id: UserId) -> Result<CacheLookup, CacheError> {
        let mut conn = self.conn.clone();
        let (raw, generation): (Option<String>, Option<u64>) = conn
            .mget(vec![self.key(user_id), self.generation_key(user_id)])
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        match raw {
            Some(s) => serde_json::from_str::<Vec<UserId>>(&s)
                .map(CacheLookup::Hit)
                .map_err(|e| CacheError::Codec(e.to_string())),
            None => Ok(CacheLookup::Miss {
                generation: generation.unwrap_or(0),
            }),
        }
    }

    async fn put(
        &self,
        user_id: UserId,
        generation: u64,
        connections: &[UserId],
    ) -> Result<(), CacheError> {
        let value =
            serde_json::to_string(connections).map_err(|e| CacheError::Codec(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _stored: i64 = self
            .fill
            .key(self.key(user_id))
            .key(self.generation_key(user_id))
            .arg(generation)
            .arg(value)
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn invalidate(&self, users: &[UserId]) -> Result<(), CacheError> {
        if users.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for user in users {
            pipe.incr(self.generation_key(*user), 1).ignore();
            pipe.del(self.key(*user)).ignore();
        }

        let mut conn = self.conn.clone();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
