//! Payment gateway port.
//!
//! Implementations can be HTTP clients for a real provider or in-memory
//! fakes used in development and tests.

use crate::domain::{CreateIntentRequest, PaymentIntent, PaymentIntentId, Refund, RefundRequest};
use crate::error::GatewayError;

/// Uniform success/failure shape of every gateway operation.
pub type OperationResult<T> = Result<T, GatewayError>;

/// Port trait for the external payment provider.
///
/// None of these calls are idempotent at the provider: calling
/// `create_intent` twice creates two distinct intents.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Creates a payment intent.
    async fn create_intent(&self, req: CreateIntentRequest) -> OperationResult<PaymentIntent>;

    /// Confirms a payment intent, attempting the charge.
    async fn confirm_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent>;

    /// Cancels a payment intent that has not succeeded.
    async fn cancel_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent>;

    /// Fetches the current state of a payment intent.
    async fn retrieve_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent>;

    /// Refunds a succeeded payment intent, fully or partially.
    async fn create_refund(&self, req: RefundRequest) -> OperationResult<Refund>;
}
