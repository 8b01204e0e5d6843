// cache

mod connection_cache;

pub use connection_cache::*;

// repo

mod connection_repo;
mod user_repo;

pub use connection_repo::*;
pub use user_repo::*;
