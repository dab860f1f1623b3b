//! API Module
//!
//! Local HTTP surface through which an out-of-process UI shell reaches the
//! cache, library and theme services.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
