//! # Web Library
//!
//! HTTP surface of the service: router, middleware, request context,
//! handlers and the services they delegate to.

pub mod ctx;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod services;

pub use ctx::Ctx;
pub use server::{create_router, start_server, AppState, ServerConfig};
