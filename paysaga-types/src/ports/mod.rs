//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The saga and the application layer depend on these traits, not on
//! concrete gateway or store implementations.

mod gateway;
mod store;

pub use gateway::{OperationResult, PaymentGateway};
pub use store::StateStore;
