mod connection_cache_memory;
mod connection_repo_memory;
mod user_repo_memory;

pub use connection_cache_memory::*;
pub use connection_repo_memory::*;
pub use user_repo_memory::*;
