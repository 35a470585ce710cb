//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use paysaga_types::domain::{Currency, IntentStatus};
use paysaga_types::dto::{
    CreatePaymentRequest, PaymentData, PaymentResponse, RefundData, RefundPaymentRequest,
    RefundResponse, ResponseStatus, WebhookAck,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy", "store": true}))
    )
)]
async fn health() {}

/// Create an unconfirmed payment intent
#[utoipa::path(
    post,
    path = "/api/payments/create",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Payment intent created", body = PaymentResponse),
        (status = 400, description = "Invalid amount or currency, or the payment saga failed"),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Too many payment requests")
    )
)]
async fn create_payment() {}

/// Confirm a payment intent
///
/// A failed confirmation is compensated: the intent is refunded, or canceled
/// when the refund is refused.
#[utoipa::path(
    post,
    path = "/api/payments/confirm/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentResponse),
        (status = 400, description = "Confirmation failed and was rolled back"),
        (status = 401, description = "Unauthorized"),
        (status = 429, description = "Too many payment requests")
    )
)]
async fn confirm_payment() {}

/// Get the status of a payment intent (cached briefly)
#[utoipa::path(
    get,
    path = "/api/payments/status/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    responses(
        (status = 200, description = "Payment status", body = PaymentResponse),
        (status = 404, description = "Payment intent not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn payment_status() {}

/// Refund a confirmed payment
#[utoipa::path(
    post,
    path = "/api/payments/refund/{id}",
    tag = "payments",
    request_body(content = RefundPaymentRequest, description = "Optional; refunds the whole amount when omitted"),
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    responses(
        (status = 200, description = "Refund created", body = RefundResponse),
        (status = 400, description = "Invalid amount or payment cannot be refunded"),
        (status = 404, description = "Payment intent not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn refund_payment() {}

/// Receive a signed payment provider event
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    tag = "webhooks",
    params(
        ("stripe-signature" = String, Header, description = "t=<unix time>,v1=<hex HMAC-SHA256 of \"t.body\">")
    ),
    responses(
        (status = 200, description = "Event received", body = WebhookAck),
        (status = 400, description = "Missing or invalid signature"),
        (status = 429, description = "Too many webhook requests"),
        (status = 500, description = "Webhook secret not configured")
    )
)]
async fn webhook() {}

/// OpenAPI documentation for the payment saga API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paysaga Payment API",
        version = "1.0.0",
        description = "Payment intents orchestrated as compensating transactions: a failed step is rolled back by refunding or canceling what earlier steps created.\n\n## Authentication\n\nPayment endpoints require the service API key in the `Authorization` header:\n\n```\nAuthorization: Bearer <api key>\n```\n\nThe webhook endpoint is authenticated by its signature header instead.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_payment,
        confirm_payment,
        payment_status,
        refund_payment,
        webhook,
    ),
    components(
        schemas(
            CreatePaymentRequest,
            RefundPaymentRequest,
            PaymentResponse,
            PaymentData,
            RefundResponse,
            RefundData,
            ResponseStatus,
            WebhookAck,
            Currency,
            IntentStatus,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Payment intent operations"),
        (name = "webhooks", description = "Payment provider callbacks"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
