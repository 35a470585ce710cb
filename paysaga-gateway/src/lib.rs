//! # Paysaga Gateway
//!
//! Payment provider adapters implementing the `PaymentGateway` port:
//!
//! - [`StripeGateway`]: REST client for a Stripe-compatible API
//! - [`InMemoryGateway`]: in-process provider for tests and local runs

use std::time::Duration;

use async_trait::async_trait;
use paysaga_types::{
    CreateIntentRequest, OperationResult, PaymentGateway, PaymentIntent, PaymentIntentId, Refund,
    RefundRequest,
};

pub mod memory;
pub mod stripe;

pub use memory::{GatewayCall, GatewayOperation, InMemoryGateway};
pub use stripe::{DEFAULT_API_BASE, StripeGateway};

/// Which provider adapter to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    Stripe,
    Memory,
}

impl std::str::FromStr for GatewayKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unsupported gateway: {}. Supported: stripe, memory", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    pub secret_key: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

/// Unified gateway handle over the supported adapters.
pub enum Gateway {
    Stripe(StripeGateway),
    Memory(InMemoryGateway),
}

/// Build a gateway from configuration.
///
/// The Stripe adapter requires a secret key.
pub fn build_gateway(config: &GatewayConfig) -> anyhow::Result<Gateway> {
    match config.kind {
        GatewayKind::Stripe => {
            let secret_key = config
                .secret_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| anyhow::anyhow!("STRIPE_SECRET_KEY is required for the stripe gateway"))?;

            let gateway = StripeGateway::new(secret_key, config.timeout)?
                .with_base_url(config.api_base.clone());
            tracing::info!(api_base = %config.api_base, "Using Stripe gateway");
            Ok(Gateway::Stripe(gateway))
        }
        GatewayKind::Memory => {
            tracing::warn!("Using in-memory gateway; no real charges will be made");
            Ok(Gateway::Memory(InMemoryGateway::new()))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement PaymentGateway for Gateway (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentGateway for Gateway {
    async fn create_intent(&self, req: CreateIntentRequest) -> OperationResult<PaymentIntent> {
        match self {
            Gateway::Stripe(g) => g.create_intent(req).await,
            Gateway::Memory(g) => g.create_intent(req).await,
        }
    }

    async fn confirm_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        match self {
            Gateway::Stripe(g) => g.confirm_intent(id).await,
            Gateway::Memory(g) => g.confirm_intent(id).await,
        }
    }

    async fn cancel_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        match self {
            Gateway::Stripe(g) => g.cancel_intent(id).await,
            Gateway::Memory(g) => g.cancel_intent(id).await,
        }
    }

    async fn retrieve_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        match self {
            Gateway::Stripe(g) => g.retrieve_intent(id).await,
            Gateway::Memory(g) => g.retrieve_intent(id).await,
        }
    }

    async fn create_refund(&self, req: RefundRequest) -> OperationResult<Refund> {
        match self {
            Gateway::Stripe(g) => g.create_refund(req).await,
            Gateway::Memory(g) => g.create_refund(req).await,
        }
    }
}
