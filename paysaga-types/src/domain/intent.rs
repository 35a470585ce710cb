//! Payment intent and refund domain models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money::{Currency, Money};
use crate::error::ValidationError;

/// Provider-assigned identifier of a payment intent (e.g. `pi_3Mtw...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentIntentId(String);

impl PaymentIntentId {
    /// Wraps an identifier without validation (provider responses).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses caller input. Identifiers are embedded in provider URLs, so
    /// only ASCII alphanumerics, `_` and `-` are accepted.
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingPaymentId);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::InvalidPaymentId(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentIntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PaymentIntentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lifecycle status of a payment intent as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// Any status this service does not know about yet
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error the provider attached to the last failed payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPaymentError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A pending (or settled) charge held by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    /// Amount in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
    pub status: IntentStatus,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
}

/// A refund of a confirmed payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentId>,
    pub amount: i64,
    pub status: String,
}

/// Parameters for creating a payment intent.
///
/// Serializes to the provider's form encoding:
/// `amount=1000&currency=usd&confirm=false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: Currency,
    pub confirm: bool,
}

impl CreateIntentRequest {
    /// An unconfirmed intent for the given money value.
    pub fn unconfirmed(money: Money) -> Self {
        Self {
            amount: money.amount(),
            currency: money.currency(),
            confirm: false,
        }
    }
}

/// Parameters for refunding a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefundRequest {
    pub payment_intent: PaymentIntentId,
    /// Partial refund amount in minor units; the whole charge when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl RefundRequest {
    pub fn full(payment_intent: PaymentIntentId) -> Self {
        Self {
            payment_intent,
            amount: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_id_parse_rejects_blank() {
        assert!(matches!(
            PaymentIntentId::parse("   "),
            Err(ValidationError::MissingPaymentId)
        ));
        assert_eq!(PaymentIntentId::parse(" pi_1 ").unwrap().as_str(), "pi_1");
    }

    #[test]
    fn test_intent_id_parse_rejects_path_characters() {
        assert!(matches!(
            PaymentIntentId::parse("pi_1/../refunds"),
            Err(ValidationError::InvalidPaymentId(_))
        ));
    }

    #[test]
    fn test_unconfirmed_create_request() {
        let money = Money::from_major(10.0, Currency::USD).unwrap();
        let req = CreateIntentRequest::unconfirmed(money);

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"amount": 1000, "currency": "usd", "confirm": false})
        );
    }

    #[test]
    fn test_intent_decodes_provider_payload() {
        let intent: PaymentIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 1000,
            "currency": "usd",
            "status": "requires_confirmation",
            "client_secret": "pi_123_secret_abc",
            "created": 1_700_000_000
        }))
        .unwrap();

        assert_eq!(intent.id.as_str(), "pi_123");
        assert_eq!(intent.status, IntentStatus::RequiresConfirmation);
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: IntentStatus = serde_json::from_str("\"requires_reauthorization\"").unwrap();
        assert_eq!(status, IntentStatus::Unknown);
    }
}
