//! In-process payment gateway.
//!
//! Keeps intents and refunds in memory and models the provider's status
//! machine closely enough to drive sagas in tests and local runs. Failures
//! can be injected per operation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{debug, info, warn};

use paysaga_types::{
    CreateIntentRequest, GatewayError, IntentStatus, OperationResult, PaymentGateway,
    PaymentIntent, PaymentIntentId, Refund, RefundRequest,
};

/// Operations that can be targeted by failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    CreateIntent,
    ConfirmIntent,
    CancelIntent,
    RetrieveIntent,
    CreateRefund,
}

/// One recorded gateway call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateIntent { amount: i64 },
    ConfirmIntent(PaymentIntentId),
    CancelIntent(PaymentIntentId),
    RetrieveIntent(PaymentIntentId),
    CreateRefund(PaymentIntentId),
}

#[derive(Default)]
struct State {
    intents: HashMap<PaymentIntentId, PaymentIntent>,
    refunds: Vec<Refund>,
    failures: HashMap<GatewayOperation, String>,
    calls: Vec<GatewayCall>,
    next_intent: u64,
    next_refund: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of `operation` fail with a provider rejection.
    pub fn fail_on(&self, operation: GatewayOperation, message: impl Into<String>) {
        self.lock().failures.insert(operation, message.into());
    }

    pub fn clear_failure(&self, operation: GatewayOperation) {
        self.lock().failures.remove(&operation);
    }

    /// Calls received so far, including rejected ones.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn intent(&self, id: &PaymentIntentId) -> Option<PaymentIntent> {
        self.lock().intents.get(id).cloned()
    }

    pub fn refunds(&self) -> Vec<Refund> {
        self.lock().refunds.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn record(&mut self, call: GatewayCall, operation: GatewayOperation) -> OperationResult<()> {
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(message) => {
                warn!(?operation, %message, "Injected gateway failure");
                Err(GatewayError::rejected(message.clone()))
            }
            None => Ok(()),
        }
    }

    fn intent_mut(&mut self, id: &PaymentIntentId) -> OperationResult<&mut PaymentIntent> {
        self.intents.get_mut(id).ok_or_else(|| no_such_intent(id))
    }

    fn refunded_total(&self, id: &PaymentIntentId) -> i64 {
        self.refunds
            .iter()
            .filter(|r| r.payment_intent.as_ref() == Some(id))
            .map(|r| r.amount)
            .sum()
    }
}

fn no_such_intent(id: &PaymentIntentId) -> GatewayError {
    GatewayError::Api {
        status: 404,
        code: Some("resource_missing".into()),
        message: format!("No such payment_intent: '{}'", id),
    }
}

fn invalid_state(message: String) -> GatewayError {
    GatewayError::Api {
        status: 400,
        code: Some("payment_intent_unexpected_state".into()),
        message,
    }
}

fn client_secret(id: &PaymentIntentId) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("{}_secret_{}", id, suffix)
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_intent(&self, req: CreateIntentRequest) -> OperationResult<PaymentIntent> {
        let mut state = self.lock();
        state.record(
            GatewayCall::CreateIntent { amount: req.amount },
            GatewayOperation::CreateIntent,
        )?;

        if req.amount <= 0 {
            return Err(GatewayError::Api {
                status: 400,
                code: Some("parameter_invalid_integer".into()),
                message: "Amount must be at least 1".into(),
            });
        }

        state.next_intent += 1;
        let id = PaymentIntentId::new(format!("pi_{:04}", state.next_intent));
        let intent = PaymentIntent {
            client_secret: Some(client_secret(&id)),
            id: id.clone(),
            amount: req.amount,
            currency: req.currency,
            status: if req.confirm {
                IntentStatus::Succeeded
            } else {
                IntentStatus::RequiresConfirmation
            },
            created: chrono::Utc::now().timestamp(),
            last_payment_error: None,
        };

        state.intents.insert(id.clone(), intent.clone());
        info!(intent_id = %id, amount = req.amount, "Created payment intent");
        Ok(intent)
    }

    async fn confirm_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        let mut state = self.lock();
        state.record(
            GatewayCall::ConfirmIntent(id.clone()),
            GatewayOperation::ConfirmIntent,
        )?;

        let intent = state.intent_mut(id)?;
        match intent.status {
            IntentStatus::Canceled | IntentStatus::Succeeded => Err(invalid_state(format!(
                "This PaymentIntent's status is {}, so it cannot be confirmed",
                intent.status
            ))),
            _ => {
                intent.status = IntentStatus::Succeeded;
                debug!(intent_id = %id, "Confirmed payment intent");
                Ok(intent.clone())
            }
        }
    }

    async fn cancel_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        let mut state = self.lock();
        state.record(
            GatewayCall::CancelIntent(id.clone()),
            GatewayOperation::CancelIntent,
        )?;

        let intent = state.intent_mut(id)?;
        match intent.status {
            IntentStatus::Succeeded | IntentStatus::Canceled => Err(invalid_state(format!(
                "You cannot cancel this PaymentIntent because it has a status of {}",
                intent.status
            ))),
            _ => {
                intent.status = IntentStatus::Canceled;
                debug!(intent_id = %id, "Canceled payment intent");
                Ok(intent.clone())
            }
        }
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        let mut state = self.lock();
        state.record(
            GatewayCall::RetrieveIntent(id.clone()),
            GatewayOperation::RetrieveIntent,
        )?;
        state.intent_mut(id).map(|intent| intent.clone())
    }

    async fn create_refund(&self, req: RefundRequest) -> OperationResult<Refund> {
        let mut state = self.lock();
        state.record(
            GatewayCall::CreateRefund(req.payment_intent.clone()),
            GatewayOperation::CreateRefund,
        )?;

        let already_refunded = state.refunded_total(&req.payment_intent);
        let intent = state.intent_mut(&req.payment_intent)?;
        if intent.status != IntentStatus::Succeeded {
            return Err(invalid_state(format!(
                "PaymentIntent {} has status {} and cannot be refunded",
                intent.id, intent.status
            )));
        }

        let remaining = intent.amount - already_refunded;
        let amount = req.amount.unwrap_or(remaining);
        if amount <= 0 || amount > remaining {
            return Err(GatewayError::Api {
                status: 400,
                code: Some("amount_too_large".into()),
                message: format!(
                    "Refund amount ({}) is greater than unrefunded amount on charge ({})",
                    amount, remaining
                ),
            });
        }

        state.next_refund += 1;
        let refund = Refund {
            id: format!("re_{:04}", state.next_refund),
            payment_intent: Some(req.payment_intent.clone()),
            amount,
            status: "succeeded".into(),
        };
        state.refunds.push(refund.clone());
        info!(intent_id = %req.payment_intent, amount, "Refunded payment intent");
        Ok(refund)
    }
}
