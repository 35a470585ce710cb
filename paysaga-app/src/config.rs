//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use paysaga_gateway::{DEFAULT_API_BASE, GatewayConfig, GatewayKind};
use paysaga_hex::inbound::DEFAULT_PAYMENT_RATE_LIMIT;
use paysaga_hex::service::DEFAULT_STATUS_CACHE_TTL_SECS;

const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub gateway: GatewayConfig,
    pub webhook_secret: Option<String>,
    pub store_url: String,
    pub step_timeout: Option<Duration>,
    pub payment_rate_limit: u32,
    pub status_cache_ttl: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let port = var("PORT").unwrap_or_else(|| "3000".to_string()).parse()?;

        let api_key = var("API_KEY")
            .ok_or_else(|| anyhow::anyhow!("API_KEY environment variable is required"))?;

        let kind: GatewayKind = var("GATEWAY")
            .unwrap_or_else(|| "stripe".to_string())
            .parse()?;
        let secret_key = var("STRIPE_SECRET_KEY");
        if kind == GatewayKind::Stripe && secret_key.is_none() {
            anyhow::bail!("STRIPE_SECRET_KEY environment variable is required when GATEWAY=stripe");
        }
        let gateway = GatewayConfig {
            kind,
            secret_key,
            api_base: var("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(parse_or(
                var("GATEWAY_TIMEOUT_SECS"),
                "GATEWAY_TIMEOUT_SECS",
                DEFAULT_GATEWAY_TIMEOUT_SECS,
            )?),
        };

        let step_timeout = match var("STEP_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(secs.parse().map_err(|e| {
                anyhow::anyhow!("STEP_TIMEOUT_SECS must be a whole number of seconds: {}", e)
            })?)),
            None => None,
        };

        Ok(Self {
            port,
            api_key,
            gateway,
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            store_url: var("STORE_URL").unwrap_or_else(|| "memory://".to_string()),
            step_timeout,
            payment_rate_limit: parse_or(
                var("PAYMENT_RATE_LIMIT"),
                "PAYMENT_RATE_LIMIT",
                DEFAULT_PAYMENT_RATE_LIMIT,
            )?,
            status_cache_ttl: parse_or(
                var("STATUS_CACHE_TTL_SECS"),
                "STATUS_CACHE_TTL_SECS",
                DEFAULT_STATUS_CACHE_TTL_SECS,
            )?,
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("API_KEY", "sk_app"), ("STRIPE_SECRET_KEY", "sk_test_1")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.gateway.kind, GatewayKind::Stripe);
        assert_eq!(config.gateway.api_base, DEFAULT_API_BASE);
        assert_eq!(config.gateway.timeout, Duration::from_secs(30));
        assert_eq!(config.store_url, "memory://");
        assert_eq!(config.step_timeout, None);
        assert_eq!(config.payment_rate_limit, 10);
        assert_eq!(config.status_cache_ttl, 30);
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn test_api_key_is_required() {
        let err = load(&[("GATEWAY", "memory")]).err().unwrap();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_stripe_requires_secret_key() {
        let err = load(&[("API_KEY", "sk_app")]).err().unwrap();
        assert!(err.to_string().contains("STRIPE_SECRET_KEY"));
    }

    #[test]
    fn test_memory_gateway_needs_no_secret() {
        let config = load(&[
            ("API_KEY", "sk_app"),
            ("GATEWAY", "memory"),
            ("STEP_TIMEOUT_SECS", "5"),
            ("PAYMENT_RATE_LIMIT", "20"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_1"),
        ])
        .unwrap();

        assert_eq!(config.gateway.kind, GatewayKind::Memory);
        assert_eq!(config.step_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.payment_rate_limit, 20);
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_1"));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = load(&[
            ("API_KEY", "sk_app"),
            ("GATEWAY", "memory"),
            ("PAYMENT_RATE_LIMIT", "lots"),
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("PAYMENT_RATE_LIMIT is invalid"));
    }
}
