//! Gateway calls used by payment saga steps.

use std::sync::Arc;

use tracing::{error, instrument};

use paysaga_types::{
    CreateIntentRequest, Money, OperationResult, PaymentGateway, PaymentIntent, PaymentIntentId,
    Refund, RefundRequest, StateStore, StepError,
};

/// Expiry of the stored intent id used by compensation (one hour).
pub const INTENT_KEY_TTL_SECS: u64 = 3600;

/// Payment operations over a gateway and the state store.
///
/// Calls are not idempotent at the provider: calling `create_payment` twice
/// creates two intents.
pub struct PaymentOperations<G, S> {
    gateway: Arc<G>,
    store: Arc<S>,
}

impl<G, S> Clone for PaymentOperations<G, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
        }
    }
}

impl<G: PaymentGateway, S: StateStore> PaymentOperations<G, S> {
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self { gateway, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an unconfirmed intent and records its id under `key`.
    #[instrument(skip(self), fields(amount = money.amount(), currency = %money.currency()))]
    pub async fn create_payment(&self, money: Money, key: &str) -> Result<PaymentIntent, StepError> {
        let intent = self
            .gateway
            .create_intent(CreateIntentRequest::unconfirmed(money))
            .await?;

        self.store
            .set(key, intent.id.as_str(), INTENT_KEY_TTL_SECS)
            .await?;

        Ok(intent)
    }

    pub async fn confirm_payment(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        self.gateway.confirm_intent(id).await
    }

    /// Cancels the intent, then forgets the recorded id under `key`.
    pub async fn cancel_payment(
        &self,
        id: &PaymentIntentId,
        key: &str,
    ) -> Result<PaymentIntent, StepError> {
        let intent = self.cancel_intent(id).await?;
        self.store.del(key).await?;
        Ok(intent)
    }

    async fn cancel_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        self.gateway.cancel_intent(id).await.inspect_err(|e| {
            error!(intent_id = %id, error = %e, "Cancel payment failed");
        })
    }

    /// Refunds the full amount of the intent.
    pub async fn refund_payment(&self, id: &PaymentIntentId) -> OperationResult<Refund> {
        self.gateway
            .create_refund(RefundRequest::full(id.clone()))
            .await
            .inspect_err(|e| {
                error!(intent_id = %id, error = %e, "Refund payment failed");
            })
    }
}
