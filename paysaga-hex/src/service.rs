//! Payment Application Service
//!
//! Validates caller input, builds one saga per request and runs it.
//! Contains NO infrastructure logic - the gateway and store are injected.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use paysaga_types::domain::to_minor_units;
use paysaga_types::{
    AppError, CreatePaymentRequest, Currency, Money, PaymentGateway, PaymentIntent,
    PaymentIntentId, Refund, RefundPaymentRequest, RefundRequest, StateStore, ValidationError,
    WebhookEvent, WebhookEventKind,
};

use crate::saga::{PaymentTransaction, SagaConfig};

/// Default lifetime of a cached status response.
pub const DEFAULT_STATUS_CACHE_TTL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    pub saga: SagaConfig,
    /// Seconds a status lookup stays cached; 0 disables the cache.
    pub status_cache_ttl: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            saga: SagaConfig::default(),
            status_cache_ttl: DEFAULT_STATUS_CACHE_TTL_SECS,
        }
    }
}

/// Application service for payment operations.
///
/// Generic over the gateway and store ports; both are shared with every saga
/// this service builds.
pub struct PaymentService<G: PaymentGateway, S: StateStore> {
    gateway: Arc<G>,
    store: Arc<S>,
    config: ServiceConfig,
}

impl<G: PaymentGateway, S: StateStore> PaymentService<G, S> {
    /// Creates a new payment service with default configuration.
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self::with_config(gateway, store, ServiceConfig::default())
    }

    pub fn with_config(gateway: Arc<G>, store: Arc<S>, config: ServiceConfig) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn transaction(&self) -> PaymentTransaction<G, S> {
        PaymentTransaction::with_config(self.gateway.clone(), self.store.clone(), self.config.saga)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Saga-backed operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates an unconfirmed payment intent.
    #[instrument(skip(self))]
    pub async fn create_payment(&self, req: CreatePaymentRequest) -> Result<PaymentIntent, AppError> {
        let amount = req.amount.ok_or(ValidationError::MissingAmount)?;
        let currency: Currency = req
            .currency
            .as_deref()
            .ok_or(ValidationError::MissingCurrency)?
            .parse()?;
        let money = Money::from_major(amount, currency)?;

        let mut tx = self.transaction();
        let intent = tx.create_payment_intent(money).execute().await?;

        intent.ok_or_else(|| AppError::Internal("Payment saga produced no intent".into()))
    }

    /// Confirms a previously created intent.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, id: &str) -> Result<PaymentIntent, AppError> {
        let id = PaymentIntentId::parse(id)?;

        let mut tx = self.transaction();
        let intent = tx.confirm_payment(id.clone()).execute().await?;
        self.invalidate_status(&id).await;

        intent.ok_or_else(|| AppError::Internal("Payment saga produced no intent".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Direct gateway operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Looks up an intent, serving from the status cache when possible.
    ///
    /// Store failures never fail the lookup; the cache is skipped instead.
    #[instrument(skip(self))]
    pub async fn get_payment_status(&self, id: &str) -> Result<PaymentIntent, AppError> {
        let id = PaymentIntentId::parse(id)?;
        let key = status_key(&id);

        if self.config.status_cache_ttl > 0 {
            match self.store.get(&key).await {
                Ok(Some(cached)) => match serde_json::from_str::<PaymentIntent>(&cached) {
                    Ok(intent) => {
                        debug!(intent_id = %id, "Status cache hit");
                        return Ok(intent);
                    }
                    Err(e) => warn!(intent_id = %id, error = %e, "Discarding unreadable cache entry"),
                },
                Ok(None) => {}
                Err(e) => warn!(intent_id = %id, error = %e, "Status cache unavailable"),
            }
        }

        let intent = self.gateway.retrieve_intent(&id).await?;

        if self.config.status_cache_ttl > 0 {
            match serde_json::to_string(&intent) {
                Ok(json) => {
                    if let Err(e) = self
                        .store
                        .set(&key, &json, self.config.status_cache_ttl)
                        .await
                    {
                        warn!(intent_id = %id, error = %e, "Failed to cache payment status");
                    }
                }
                Err(e) => warn!(intent_id = %id, error = %e, "Failed to encode payment status"),
            }
        }

        Ok(intent)
    }

    /// Refunds a confirmed payment, fully or partially.
    #[instrument(skip(self, req), fields(amount = ?req.amount))]
    pub async fn refund_payment(
        &self,
        id: &str,
        req: RefundPaymentRequest,
    ) -> Result<Refund, AppError> {
        let id = PaymentIntentId::parse(id)?;
        // Every supported currency has two decimal places.
        let amount = req.amount.map(|a| to_minor_units(a, 2)).transpose()?;

        if let Some(reason) = req.reason.as_deref() {
            info!(intent_id = %id, reason, "Refund requested");
        }

        let refund = self
            .gateway
            .create_refund(RefundRequest {
                payment_intent: id.clone(),
                amount,
            })
            .await?;
        self.invalidate_status(&id).await;

        Ok(refund)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Webhooks & health
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reacts to a verified provider event.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn handle_webhook_event(&self, event: &WebhookEvent) {
        match event.kind() {
            WebhookEventKind::PaymentIntentSucceeded => {
                info!(intent_id = ?event.payment_intent_id(), amount = ?event.amount(), "Payment succeeded");
            }
            WebhookEventKind::PaymentIntentFailed => {
                warn!(
                    intent_id = ?event.payment_intent_id(),
                    reason = event.last_payment_error().unwrap_or("unknown"),
                    "Payment failed"
                );
            }
            WebhookEventKind::PaymentMethodAttached => {
                info!("Payment method attached");
            }
            WebhookEventKind::Other(event_type) => {
                info!(%event_type, "Unhandled event type");
            }
        }

        if let Some(id) = event.payment_intent_id() {
            self.invalidate_status(&id).await;
        }
    }

    /// Whether the state store is reachable.
    pub async fn store_connected(&self) -> bool {
        self.store.is_connected().await
    }

    async fn invalidate_status(&self, id: &PaymentIntentId) {
        if let Err(e) = self.store.del(&status_key(id)).await {
            warn!(intent_id = %id, error = %e, "Failed to invalidate cached status");
        }
    }
}

fn status_key(id: &PaymentIntentId) -> String {
    format!("payment_status:{}", id)
}
