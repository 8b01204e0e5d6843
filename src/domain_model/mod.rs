mod connection;
mod user;

pub use connection::*;
pub use user::*;
