//! Provider webhook events.

use serde::{Deserialize, Serialize};

use super::intent::PaymentIntentId;

/// Event types this service reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    PaymentIntentSucceeded,
    PaymentIntentFailed,
    PaymentMethodAttached,
    Other(String),
}

impl WebhookEventKind {
    fn parse(event_type: &str) -> Self {
        match event_type {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "payment_method.attached" => Self::PaymentMethodAttached,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

/// A verified event delivered by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
    #[serde(default)]
    pub created: i64,
}

impl WebhookEvent {
    pub fn kind(&self) -> WebhookEventKind {
        WebhookEventKind::parse(&self.event_type)
    }

    /// The payment intent this event is about, for `payment_intent.*` events.
    pub fn payment_intent_id(&self) -> Option<PaymentIntentId> {
        if !self.event_type.starts_with("payment_intent.") {
            return None;
        }
        self.data
            .object
            .get("id")
            .and_then(|v| v.as_str())
            .map(PaymentIntentId::new)
    }

    pub fn amount(&self) -> Option<i64> {
        self.data.object.get("amount").and_then(|v| v.as_i64())
    }

    /// Message of the provider's `last_payment_error`, if any.
    pub fn last_payment_error(&self) -> Option<&str> {
        self.data
            .object
            .get("last_payment_error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    }
}
