//! Stripe-compatible REST adapter for the `PaymentGateway` port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use paysaga_types::{
    CreateIntentRequest, GatewayError, OperationResult, PaymentGateway, PaymentIntent,
    PaymentIntentId, Refund, RefundRequest,
};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Error body returned by the provider on non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Payment provider client speaking the Stripe REST dialect:
/// bearer secret key, form-encoded request bodies, JSON responses.
pub struct StripeGateway {
    base_url: String,
    secret_key: String,
    http: Client,
}

impl StripeGateway {
    /// Creates a client against the public API with the given request timeout.
    pub fn new(secret_key: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: DEFAULT_API_BASE.to_string(),
            secret_key: secret_key.into(),
            http,
        })
    }

    /// Points the client at another API base (test doubles, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> OperationResult<T> {
        let resp = req
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> OperationResult<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
        } else {
            Err(parse_error_body(status.as_u16(), &body))
        }
    }
}

/// Maps a non-2xx provider response onto [`GatewayError::Api`].
fn parse_error_body(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::Api {
            status,
            code: envelope.error.code,
            message: envelope
                .error
                .message
                .unwrap_or_else(|| format!("Gateway returned HTTP {status}")),
        },
        Err(_) => GatewayError::Api {
            status,
            code: None,
            message: if body.trim().is_empty() {
                format!("Gateway returned HTTP {status}")
            } else {
                body.to_string()
            },
        },
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, req), fields(amount = req.amount, currency = %req.currency))]
    async fn create_intent(&self, req: CreateIntentRequest) -> OperationResult<PaymentIntent> {
        debug!("Creating payment intent");
        self.send(self.http.post(self.url("/v1/payment_intents")).form(&req))
            .await
    }

    #[instrument(skip(self), fields(intent_id = %id))]
    async fn confirm_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        debug!("Confirming payment intent");
        self.send(
            self.http
                .post(self.url(&format!("/v1/payment_intents/{}/confirm", id))),
        )
        .await
    }

    #[instrument(skip(self), fields(intent_id = %id))]
    async fn cancel_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        debug!("Canceling payment intent");
        self.send(
            self.http
                .post(self.url(&format!("/v1/payment_intents/{}/cancel", id))),
        )
        .await
    }

    #[instrument(skip(self), fields(intent_id = %id))]
    async fn retrieve_intent(&self, id: &PaymentIntentId) -> OperationResult<PaymentIntent> {
        self.send(
            self.http
                .get(self.url(&format!("/v1/payment_intents/{}", id))),
        )
        .await
    }

    #[instrument(skip(self, req), fields(intent_id = %req.payment_intent, amount = ?req.amount))]
    async fn create_refund(&self, req: RefundRequest) -> OperationResult<Refund> {
        debug!("Creating refund");
        self.send(self.http.post(self.url("/v1/refunds")).form(&req))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = StripeGateway::new("sk_test_1", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:12111/");
        assert_eq!(
            gateway.url("/v1/refunds"),
            "http://localhost:12111/v1/refunds"
        );
    }

    #[test]
    fn test_default_base_url() {
        let gateway = StripeGateway::new("sk_test_1", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_provider_error_body_is_parsed() {
        let err = parse_error_body(
            404,
            r#"{"error":{"code":"resource_missing","message":"No such payment_intent: 'pi_x'","type":"invalid_request_error"}}"#,
        );

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No such payment_intent: 'pi_x'");
    }

    #[test]
    fn test_unstructured_error_body_is_kept() {
        let err = parse_error_body(502, "Bad Gateway");
        assert!(matches!(err, GatewayError::Api { status: 502, ref message, .. } if message == "Bad Gateway"));

        let err = parse_error_body(500, "");
        assert_eq!(err.to_string(), "Gateway returned HTTP 500");
    }
}
