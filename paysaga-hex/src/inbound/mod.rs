//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod auth;
mod handlers;
mod rate_limit;
mod server;

pub use handlers::SIGNATURE_HEADER;
pub use rate_limit::RateLimiterState;
pub use server::{DEFAULT_PAYMENT_RATE_LIMIT, DEFAULT_WEBHOOK_RATE_LIMIT, HttpServer};
