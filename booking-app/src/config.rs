//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use booking_types::ReceiptStrategy;
use razorpay_gateway::DEFAULT_BASE_URL;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RATE_LIMIT: u32 = 100;

/// Which payment gateway adapter to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Live,
    /// In-process gateway; no provider account needed.
    Sandbox,
}

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    pub razorpay_timeout: Duration,
    pub gateway_mode: GatewayMode,
    pub jwt_secret: String,
    pub admin_email: String,
    pub rate_limit_per_minute: u32,
    pub receipt_strategy: ReceiptStrategy,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let port = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number: {}", e))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("RAZORPAY_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("RAZORPAY_TIMEOUT_SECS must be whole seconds: {}", e))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let rate_limit_per_minute = match get("RATE_LIMIT_PER_MINUTE") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow::anyhow!("RATE_LIMIT_PER_MINUTE must be a number: {}", e))?,
            None => DEFAULT_RATE_LIMIT,
        };

        let receipt_strategy = match get("RECEIPT_STRATEGY") {
            Some(v) => v.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            None => ReceiptStrategy::default(),
        };

        let gateway_mode = match get("RAZORPAY_MODE").as_deref().map(str::to_lowercase) {
            None => GatewayMode::Live,
            Some(mode) if mode == "live" => GatewayMode::Live,
            Some(mode) if mode == "sandbox" => GatewayMode::Sandbox,
            Some(other) => anyhow::bail!("RAZORPAY_MODE must be live or sandbox, got {}", other),
        };

        Ok(Self {
            port,
            database_url: required("DATABASE_URL")?,
            razorpay_key_id: required("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: required("RAZORPAY_KEY_SECRET")?,
            razorpay_base_url: get("RAZORPAY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            razorpay_timeout: Duration::from_secs(timeout_secs),
            gateway_mode,
            jwt_secret: required("JWT_SECRET")?,
            admin_email: required("ADMIN_EMAIL")?,
            rate_limit_per_minute,
            receipt_strategy,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}
