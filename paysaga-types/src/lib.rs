//! # Paysaga Types
//!
//! Domain types and port traits for the payment saga service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Money, PaymentIntent, Refund, WebhookEvent)
//! - `ports/` - Trait definitions that gateway and store adapters implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Validation, gateway, store, saga and application errors

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CreateIntentRequest, Currency, IntentStatus, Money, PaymentIntent, PaymentIntentId, Refund,
    RefundRequest, WebhookEvent, WebhookEventKind,
};
pub use dto::*;
pub use error::{
    AppError, CompensationError, GatewayError, StepError, StoreError, TransactionError,
    ValidationError,
};
pub use ports::{OperationResult, PaymentGateway, StateStore};
