//! Client example demonstrating payment flows against an in-process server.
//!
//! Run with: cargo run -p paysaga-app --example client_example

use std::net::SocketAddr;
use std::sync::Arc;

use paysaga_client::PaysagaClient;
use paysaga_gateway::{GatewayOperation, InMemoryGateway};
use paysaga_hex::{PaymentService, inbound::HttpServer};
use paysaga_store::MemoryStore;
use tokio::net::TcpListener;

const API_KEY: &str = "sk_example";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    println!("🚀 Starting server on {addr}...");

    // The gateway handle is shared, so failures can be injected after start-up
    let gateway = InMemoryGateway::new();
    let service = PaymentService::new(Arc::new(gateway.clone()), Arc::new(MemoryStore::new()));
    let router = HttpServer::new(service, API_KEY).router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    let base_url = format!("http://{addr}");
    let client = PaysagaClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: Full payment flow
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let response = client.create_payment(10.0, "USD").await;
    assert!(response.is_err());
    println!("✅ Unauthorized without key: {}", response.unwrap_err());

    let client = client.with_api_key(API_KEY);

    let created = client.create_payment(42.50, "USD").await?;
    println!("✅ Created intent {} ({:?})", created.id, created.status);

    let confirmed = client.confirm_payment(created.id.as_str()).await?;
    println!("✅ Confirmed intent {} ({:?})", confirmed.id, confirmed.status);

    let refund = client
        .refund_payment(created.id.as_str(), Some(10.0), Some("damaged".into()))
        .await?;
    println!("✅ Refunded {} minor units (refund={})", refund.amount, refund.id);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: Compensation after a failed confirmation
    // ─────────────────────────────────────────────────────────────────────────

    let pending = client.create_payment(15.0, "EUR").await?;
    gateway.fail_on(GatewayOperation::ConfirmIntent, "Your card was declined.");

    let failed = client.confirm_payment(pending.id.as_str()).await;
    println!("✅ Confirmation failed: {}", failed.unwrap_err());

    let status = client.payment_status(pending.id.as_str()).await?;
    println!("   Intent {} is now {:?}", status.id, status.status);

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
