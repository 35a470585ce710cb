//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Currency, IntentStatus, PaymentIntent, PaymentIntentId, Refund};

// ─────────────────────────────────────────────────────────────────────────────
// Request DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment intent.
///
/// Both fields are optional on the wire so that missing values surface as
/// validation errors rather than decoding failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Amount in major currency units (e.g. dollars)
    #[schema(example = 10.5)]
    #[serde(default)]
    pub amount: Option<f64>,
    /// One of USD, EUR, GBP (case-insensitive)
    #[schema(example = "USD")]
    #[serde(default)]
    pub currency: Option<String>,
}

/// Request to refund a confirmed payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefundPaymentRequest {
    /// Partial refund amount in major units; refunds everything when absent
    #[schema(example = 5.0)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Free-form reason, recorded in logs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome marker carried by every successful response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
}

/// Public view of a payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentData {
    #[schema(value_type = String, example = "pi_3MtwBwLkdIwHu7ix28a3tqPa")]
    pub id: PaymentIntentId,
    pub status: IntentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Amount in smallest currency unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 1050)]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl PaymentData {
    /// The creation/confirmation view: identifier, status and client secret.
    pub fn summary(intent: &PaymentIntent) -> Self {
        Self {
            id: intent.id.clone(),
            status: intent.status,
            client_secret: intent.client_secret.clone(),
            amount: None,
            currency: None,
        }
    }

    /// The status view: identifier, status, amount and currency.
    pub fn status(intent: &PaymentIntent) -> Self {
        Self {
            id: intent.id.clone(),
            status: intent.status,
            client_secret: None,
            amount: Some(intent.amount),
            currency: Some(intent.currency),
        }
    }
}

/// Response envelope for payment intent operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub status: ResponseStatus,
    pub data: PaymentData,
}

impl PaymentResponse {
    pub fn success(data: PaymentData) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// Public view of a refund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RefundData {
    #[schema(example = "re_1Nispe2eZvKYlo2Cd31jOCgZ")]
    pub id: String,
    #[schema(value_type = Option<String>)]
    pub payment_intent: Option<PaymentIntentId>,
    /// Refunded amount in smallest currency unit
    pub amount: i64,
    #[schema(example = "succeeded")]
    pub status: String,
}

impl From<Refund> for RefundData {
    fn from(refund: Refund) -> Self {
        Self {
            id: refund.id,
            payment_intent: refund.payment_intent,
            amount: refund.amount,
            status: refund.status,
        }
    }
}

/// Response envelope for refunds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RefundResponse {
    pub status: ResponseStatus,
    pub data: RefundData,
}

impl RefundResponse {
    pub fn success(data: RefundData) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// Acknowledgement returned to the provider for a processed webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}
