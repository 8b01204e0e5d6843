mod connection_cache_redis;

pub use connection_cache_redis::*;
