mod connection_service_impl;
mod identity_service_fake;
mod identity_service_jwt;

pub use connection_service_impl::*;
pub use identity_service_fake::*;
pub use identity_service_jwt::*;
