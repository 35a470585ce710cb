//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use paysaga_types::{
    AppError, CreatePaymentRequest, PaymentData, PaymentGateway, PaymentResponse, RefundData,
    RefundPaymentRequest, RefundResponse, StateStore, WebhookAck, WebhookEvent,
};

use crate::PaymentService;
use crate::security::{DEFAULT_WEBHOOK_TOLERANCE_SECS, verify_webhook_signature};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Application state shared across handlers.
pub struct AppState<G: PaymentGateway, S: StateStore> {
    pub service: PaymentService<G, S>,
    /// SHA-256 hash of the API key clients must present.
    pub api_key_hash: String,
    /// Secret used to verify webhook signatures; webhooks are refused without it.
    pub webhook_secret: Option<String>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PaymentFailed(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
) -> impl IntoResponse {
    let store = state.service.store_connected().await;
    Json(serde_json::json!({ "status": "healthy", "store": store }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Create an unconfirmed payment intent.
#[tracing::instrument(skip(state))]
pub async fn create_payment<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let intent = state.service.create_payment(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse::success(PaymentData::summary(&intent))),
    ))
}

/// Confirm a payment intent.
#[tracing::instrument(skip(state), fields(intent_id = %id))]
pub async fn confirm_payment<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let intent = state.service.confirm_payment(&id).await?;
    Ok(Json(PaymentResponse::success(PaymentData::summary(&intent))))
}

/// Get the status of a payment intent.
#[tracing::instrument(skip(state), fields(intent_id = %id))]
pub async fn payment_status<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let intent = state.service.get_payment_status(&id).await?;
    Ok(Json(PaymentResponse::success(PaymentData::status(&intent))))
}

/// Refund a confirmed payment.
#[tracing::instrument(skip(state, body), fields(intent_id = %id))]
pub async fn refund_payment<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // The body is optional: an empty request refunds the whole amount.
    let req: RefundPaymentRequest = if body.is_empty() {
        RefundPaymentRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };
    let refund = state.service.refund_payment(&id, req).await?;
    Ok(Json(RefundResponse::success(RefundData::from(refund))))
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

/// Receive a signed provider event.
///
/// The signature covers the raw body, so the payload is only decoded after
/// verification.
#[tracing::instrument(skip_all)]
pub async fn webhook<G: PaymentGateway, S: StateStore>(
    State(state): State<Arc<AppState<G, S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Some(secret) = state.webhook_secret.as_deref() else {
        return Err(AppError::Internal("Webhook secret is not configured".into()).into());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".into()))?;

    verify_webhook_signature(
        &body,
        signature,
        secret,
        chrono::Utc::now().timestamp(),
        DEFAULT_WEBHOOK_TOLERANCE_SECS,
    )
    .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: {}", e)))?;

    state.service.handle_webhook_event(&event).await;
    Ok(Json(WebhookAck { received: true }))
}
