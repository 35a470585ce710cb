//! Payment saga: create and confirm steps with their compensations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use paysaga_types::{
    Money, PaymentGateway, PaymentIntent, PaymentIntentId, StateStore, StepError,
    TransactionError,
};

use super::operations::PaymentOperations;
use super::step::SagaStep;
use super::{Saga, SagaConfig};

/// Builds and runs one payment saga.
///
/// Each transaction gets its own correlation id; the id of a created intent
/// is stored under `payment_intent:<correlation id>` so that concurrent
/// transactions sharing one store never see each other's intents.
pub struct PaymentTransaction<G, S> {
    operations: PaymentOperations<G, S>,
    correlation_id: Uuid,
    compensation_key: String,
    saga: Saga<PaymentIntent>,
}

impl<G: PaymentGateway, S: StateStore> PaymentTransaction<G, S> {
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self::with_config(gateway, store, SagaConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, store: Arc<S>, config: SagaConfig) -> Self {
        let correlation_id = Uuid::new_v4();
        Self {
            operations: PaymentOperations::new(gateway, store),
            correlation_id,
            compensation_key: format!("payment_intent:{}", correlation_id),
            saga: Saga::new(config),
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Store key under which the created intent id is recorded.
    pub fn compensation_key(&self) -> &str {
        &self.compensation_key
    }

    pub fn len(&self) -> usize {
        self.saga.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saga.is_empty()
    }

    /// Appends a step creating an unconfirmed intent for `money`.
    ///
    /// Compensation cancels the intent recorded under the compensation key,
    /// if any.
    pub fn create_payment_intent(&mut self, money: Money) -> &mut Self {
        self.saga.add_step(CreateIntentStep {
            operations: self.operations.clone(),
            money,
            key: self.compensation_key.clone(),
        });
        self
    }

    /// Appends a step confirming `intent_id`.
    ///
    /// Compensation refunds the intent, falling back to a single cancel when
    /// the refund is refused. That cancel also clears the compensation key,
    /// so an earlier create step does not cancel the same intent again.
    pub fn confirm_payment(&mut self, intent_id: PaymentIntentId) -> &mut Self {
        self.saga.add_step(ConfirmIntentStep {
            operations: self.operations.clone(),
            intent_id,
            key: self.compensation_key.clone(),
        });
        self
    }

    /// Runs the saga; see [`Saga::execute`].
    #[tracing::instrument(skip(self), fields(correlation_id = %self.correlation_id, steps = self.saga.len()))]
    pub async fn execute(&mut self) -> Result<Option<PaymentIntent>, TransactionError> {
        self.saga.execute().await
    }
}

struct CreateIntentStep<G, S> {
    operations: PaymentOperations<G, S>,
    money: Money,
    key: String,
}

#[async_trait]
impl<G: PaymentGateway, S: StateStore> SagaStep<PaymentIntent> for CreateIntentStep<G, S> {
    fn name(&self) -> &'static str {
        "create_payment_intent"
    }

    async fn execute(&self) -> Result<PaymentIntent, StepError> {
        let intent = self.operations.create_payment(self.money, &self.key).await?;
        info!(intent_id = %intent.id, amount = intent.amount, "Payment intent created");
        Ok(intent)
    }

    async fn compensate(&self) -> Result<(), StepError> {
        let Some(id) = self.operations.store().get(&self.key).await? else {
            return Ok(());
        };

        let id = PaymentIntentId::new(id);
        self.operations.cancel_payment(&id, &self.key).await?;
        info!(intent_id = %id, "Payment intent canceled");
        Ok(())
    }
}

struct ConfirmIntentStep<G, S> {
    operations: PaymentOperations<G, S>,
    intent_id: PaymentIntentId,
    key: String,
}

#[async_trait]
impl<G: PaymentGateway, S: StateStore> SagaStep<PaymentIntent> for ConfirmIntentStep<G, S> {
    fn name(&self) -> &'static str {
        "confirm_payment"
    }

    async fn execute(&self) -> Result<PaymentIntent, StepError> {
        let intent = self.operations.confirm_payment(&self.intent_id).await?;
        info!(intent_id = %intent.id, status = %intent.status, "Payment intent confirmed");
        Ok(intent)
    }

    async fn compensate(&self) -> Result<(), StepError> {
        match self.operations.refund_payment(&self.intent_id).await {
            Ok(refund) => {
                info!(intent_id = %self.intent_id, refund_id = %refund.id, "Payment refunded");
                Ok(())
            }
            Err(refund_err) => {
                warn!(
                    intent_id = %self.intent_id,
                    error = %refund_err,
                    "Refund failed, attempting to cancel payment intent"
                );
                self.operations
                    .cancel_payment(&self.intent_id, &self.key)
                    .await?;
                info!(intent_id = %self.intent_id, "Payment intent canceled");
                Ok(())
            }
        }
    }
}
