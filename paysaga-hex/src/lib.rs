//! # Paysaga Hex
//!
//! Saga orchestration, application service and HTTP adapter for the payment
//! saga service.
//!
//! ## Architecture
//!
//! - `saga/` - Compensating-transaction engine and the payment saga steps
//! - `service` - Application service (validates input, one saga per request)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `G: PaymentGateway` and `S: StateStore`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod saga;
pub mod security;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use saga::{PaymentTransaction, Saga, SagaConfig, SagaStep};
pub use service::{PaymentService, ServiceConfig};
