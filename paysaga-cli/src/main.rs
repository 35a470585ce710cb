//! Paysaga CLI
//!
//! Command-line interface for the Paysaga payment API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use paysaga_client::PaysagaClient;

#[derive(Parser)]
#[command(name = "paysaga")]
#[command(author, version, about = "Paysaga payment API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Paysaga API
    #[arg(
        long,
        env = "PAYSAGA_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// API key for authentication
    #[arg(long, env = "PAYSAGA_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment intent operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Webhook operations
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create an unconfirmed payment intent
    Create {
        /// Amount in major units (e.g. 10.50)
        #[arg(long)]
        amount: f64,
        /// Currency (USD, EUR, GBP)
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Confirm a payment intent
    Confirm {
        /// Payment intent ID
        id: String,
    },
    /// Show the status of a payment intent
    Status {
        /// Payment intent ID
        id: String,
    },
    /// Refund a confirmed payment
    Refund {
        /// Payment intent ID
        id: String,
        /// Partial amount in major units; full refund when omitted
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Start a local webhook listener
    Listen {
        /// Port to listen on
        #[arg(long, default_value = "4242")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = PaysagaClient::new(&cli.api_url);
    if let Some(key) = cli.api_key {
        client = client.with_api_key(key);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create { amount, currency } => {
                let payment = client.create_payment(amount, &currency).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Confirm { id } => {
                let payment = client.confirm_payment(&id).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Status { id } => {
                let payment = client.payment_status(&id).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Refund { id, amount, reason } => {
                let refund = client.refund_payment(&id, amount, reason).await?;
                println!("{}", serde_json::to_string_pretty(&refund)?);
            }
        },

        Commands::Webhook { action } => match action {
            WebhookCommands::Listen { port } => {
                let app =
                    axum::Router::new().route("/webhook", axum::routing::post(handle_webhook));
                let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
                println!("Listening for webhooks on {}", addr);
                let listener = tokio::net::TcpListener::bind(&addr).await?;
                axum::serve(listener, app).await?;
            }
        },
    }

    Ok(())
}

async fn handle_webhook(
    headers: axum::http::HeaderMap,
    body: String,
) -> impl axum::response::IntoResponse {
    println!("POST /webhook HTTP/1.1");
    for (name, value) in &headers {
        println!("{}: {:?}", name, value);
    }
    println!();
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(event) => println!(
            "{}",
            serde_json::to_string_pretty(&event).unwrap_or(body.clone())
        ),
        Err(_) => println!("{}", body),
    }
    println!("----------------------------------------");
    axum::Json(serde_json::json!({ "received": true }))
}
