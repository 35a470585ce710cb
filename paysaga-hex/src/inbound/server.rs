//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use paysaga_types::{PaymentGateway, StateStore};

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::PaymentService;
use crate::openapi::ApiDoc;
use crate::security::hash_api_key;

/// Default payment requests per minute per caller.
pub const DEFAULT_PAYMENT_RATE_LIMIT: u32 = 10;
/// Default webhook deliveries per second.
pub const DEFAULT_WEBHOOK_RATE_LIMIT: u32 = 10;

/// HTTP Server for the payment saga API.
pub struct HttpServer<G: PaymentGateway, S: StateStore> {
    state: Arc<AppState<G, S>>,
    payment_limiter: Arc<RateLimiterState>,
    webhook_limiter: Arc<RateLimiterState>,
}

impl<G: PaymentGateway, S: StateStore> HttpServer<G, S> {
    /// Creates a new HTTP server accepting `api_key`.
    pub fn new(service: PaymentService<G, S>, api_key: &str) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                api_key_hash: hash_api_key(api_key),
                webhook_secret: None,
            }),
            payment_limiter: Arc::new(RateLimiterState::payments(DEFAULT_PAYMENT_RATE_LIMIT)),
            webhook_limiter: Arc::new(RateLimiterState::webhooks(DEFAULT_WEBHOOK_RATE_LIMIT)),
        }
    }

    /// Enables the webhook route with the given signing secret.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.webhook_secret = Some(secret.into());
        }
        self
    }

    /// Overrides the payment rate limit (requests per minute per caller).
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.payment_limiter = Arc::new(RateLimiterState::payments(requests_per_minute));
        self
    }

    /// Overrides the webhook rate limit (deliveries per second).
    pub fn with_webhook_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.webhook_limiter = Arc::new(RateLimiterState::webhooks(requests_per_second));
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let limited_payments = Router::new()
            .route("/api/payments/create", post(handlers::create_payment::<G, S>))
            .route(
                "/api/payments/confirm/{id}",
                post(handlers::confirm_payment::<G, S>),
            )
            .route_layer(middleware::from_fn_with_state(
                self.payment_limiter.clone(),
                rate_limit_middleware,
            ));

        let webhooks = Router::new()
            .route("/api/payments/webhook", post(handlers::webhook::<G, S>))
            .route_layer(middleware::from_fn_with_state(
                self.webhook_limiter.clone(),
                rate_limit_middleware,
            ));

        Router::new()
            .route("/health", get(handlers::health::<G, S>))
            .route(
                "/api/payments/status/{id}",
                get(handlers::payment_status::<G, S>),
            )
            .route(
                "/api/payments/refund/{id}",
                post(handlers::refund_payment::<G, S>),
            )
            .merge(limited_payments)
            .merge(webhooks)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<G, S>,
            ))
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
