//! # Paysaga Client SDK
//!
//! A typed Rust client for the Paysaga payment API.

use paysaga_types::{
    CreatePaymentRequest, PaymentData, PaymentResponse, RefundData, RefundPaymentRequest,
    RefundResponse,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paysaga API client.
pub struct PaysagaClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl PaysagaClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http: Client::new(),
        }
    }

    /// Sets the API key for authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates an unconfirmed payment intent for `amount` major units.
    pub async fn create_payment(
        &self,
        amount: f64,
        currency: &str,
    ) -> Result<PaymentData, ClientError> {
        let req = CreatePaymentRequest {
            amount: Some(amount),
            currency: Some(currency.to_string()),
        };
        let resp: PaymentResponse = self
            .send(self.http.post(self.url("/api/payments/create")).json(&req))
            .await?;
        Ok(resp.data)
    }

    /// Confirms a payment intent.
    pub async fn confirm_payment(&self, id: &str) -> Result<PaymentData, ClientError> {
        let resp: PaymentResponse = self
            .send(
                self.http
                    .post(self.url(&format!("/api/payments/confirm/{}", id))),
            )
            .await?;
        Ok(resp.data)
    }

    /// Gets the status of a payment intent.
    pub async fn payment_status(&self, id: &str) -> Result<PaymentData, ClientError> {
        let resp: PaymentResponse = self
            .send(
                self.http
                    .get(self.url(&format!("/api/payments/status/{}", id))),
            )
            .await?;
        Ok(resp.data)
    }

    /// Refunds a payment; the whole amount when `amount` is `None`.
    pub async fn refund_payment(
        &self,
        id: &str,
        amount: Option<f64>,
        reason: Option<String>,
    ) -> Result<RefundData, ClientError> {
        let req = RefundPaymentRequest { amount, reason };
        let resp: RefundResponse = self
            .send(
                self.http
                    .post(self.url(&format!("/api/payments/refund/{}", id)))
                    .json(&req),
            )
            .await?;
        Ok(resp.data)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, mut req: RequestBuilder) -> Result<T, ClientError> {
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PaysagaClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = PaysagaClient::new("http://localhost:3000/");
        assert_eq!(client.url("/health"), "http://localhost:3000/health");
    }

    #[test]
    fn test_client_with_api_key() {
        let client = PaysagaClient::new("http://localhost:3000").with_api_key("test-key");
        assert_eq!(client.api_key, Some("test-key".to_string()));
    }
}
