mod connection_service;
mod identity_service;

pub use connection_service::*;
pub use identity_service::*;
