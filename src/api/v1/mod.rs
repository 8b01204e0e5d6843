mod error;
mod handler;
mod router;

pub use error::*;
pub use handler::{ApiResponse, ResolveBody, SendRequestBody};
pub use router::routes;
