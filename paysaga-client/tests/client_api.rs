//! Client SDK against a live in-process server.

use std::sync::Arc;

use paysaga_client::{ClientError, PaysagaClient};
use paysaga_gateway::InMemoryGateway;
use paysaga_hex::{PaymentService, inbound::HttpServer};
use paysaga_store::MemoryStore;
use paysaga_types::IntentStatus;

const API_KEY: &str = "sk_test_client";

async fn spawn_server() -> String {
    let service = PaymentService::new(
        Arc::new(InMemoryGateway::new()),
        Arc::new(MemoryStore::new()),
    );
    let app = HttpServer::new(service, API_KEY).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_payment_lifecycle_through_client() {
    let base = spawn_server().await;
    let client = PaysagaClient::new(&base).with_api_key(API_KEY);

    assert!(client.health().await.unwrap());

    let created = client.create_payment(12.34, "EUR").await.unwrap();
    assert_eq!(created.status, IntentStatus::RequiresConfirmation);
    assert!(created.client_secret.is_some());

    let confirmed = client.confirm_payment(created.id.as_str()).await.unwrap();
    assert_eq!(confirmed.status, IntentStatus::Succeeded);

    let status = client.payment_status(created.id.as_str()).await.unwrap();
    assert_eq!(status.amount, Some(1234));

    let refund = client
        .refund_payment(created.id.as_str(), None, None)
        .await
        .unwrap();
    assert_eq!(refund.amount, 1234);
}

#[tokio::test]
async fn test_api_errors_carry_status_and_message() {
    let base = spawn_server().await;
    let client = PaysagaClient::new(&base).with_api_key(API_KEY);

    let err = client.create_payment(-1.0, "USD").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Api { status: 400, ref message } if message == "Amount must be greater than 0"
    ));

    let err = client.payment_status("pi_unknown").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_missing_api_key_is_rejected() {
    let base = spawn_server().await;
    let client = PaysagaClient::new(&base);

    let err = client.create_payment(1.0, "USD").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}
