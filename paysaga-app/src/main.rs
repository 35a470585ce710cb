//! # Paysaga Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the state store and payment gateway adapters
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paysaga_gateway::build_gateway;
use paysaga_hex::{PaymentService, SagaConfig, ServiceConfig, inbound::HttpServer};
use paysaga_store::build_store;
use paysaga_types::StateStore;

const STORE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("paysaga-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paysaga_app=debug,paysaga_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting paysaga server on port {}", config.port);
    tracing::info!("Using store: {}", config.store_url);

    // Build the state store and verify it answers before taking traffic
    let store = build_store(&config.store_url)?;
    if !store.is_connected().await {
        anyhow::bail!("State store at {} is not reachable", config.store_url);
    }
    store.spawn_sweeper(STORE_SWEEP_INTERVAL);

    let gateway = build_gateway(&config.gateway)?;

    // Create the payment service
    let saga = match config.step_timeout {
        Some(timeout) => SagaConfig::with_step_timeout(timeout),
        None => SagaConfig::default(),
    };
    let service = PaymentService::with_config(
        Arc::new(gateway),
        Arc::new(store),
        ServiceConfig {
            saga,
            status_cache_ttl: config.status_cache_ttl,
        },
    );

    // Create and run the HTTP server
    let mut server =
        HttpServer::new(service, &config.api_key).with_rate_limit(config.payment_rate_limit);
    match config.webhook_secret {
        Some(secret) => server = server.with_webhook_secret(secret),
        None => tracing::warn!("STRIPE_WEBHOOK_SECRET not set; webhook deliveries will be rejected"),
    }
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
