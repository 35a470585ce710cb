//! Domain models for the payment saga service.

pub mod intent;
pub mod money;
pub mod webhook;

pub use intent::{
    CreateIntentRequest, IntentStatus, LastPaymentError, PaymentIntent, PaymentIntentId, Refund,
    RefundRequest,
};
pub use money::{Currency, Money, to_minor_units};
pub use webhook::{WebhookEvent, WebhookEventData, WebhookEventKind};
