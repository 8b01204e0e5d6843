mod connection_repo_mysql;
mod schema;
mod user_repo_mysql;

pub use connection_repo_mysql::*;
pub use schema::*;
pub use user_repo_mysql::*;

mod util;
