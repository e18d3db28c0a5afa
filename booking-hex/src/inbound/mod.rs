//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

pub mod auth;
mod handlers;
pub mod jwt;
mod rate_limit;
mod server;

pub use auth::{ADMIN_TOKEN_HEADER, USER_TOKEN_HEADER};
pub use jwt::JwtService;
pub use rate_limit::DEFAULT_REQUESTS_PER_MINUTE;
pub use server::HttpServer;
