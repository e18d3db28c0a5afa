//! HTTP client for the provider's orders API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use booking_types::{Currency, GatewayError, Order, OrderRequest, PaymentGateway};

use crate::signature;

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Credentials and transport settings for the provider.
#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Live provider adapter.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    http: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(mut config: RazorpayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { config, http })
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
}

impl RazorpayOrder {
    fn into_domain(self) -> Result<Order, GatewayError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: booking_types::DomainError| GatewayError::Decode(e.to_string()))?;

        Ok(Order {
            id: self.id,
            amount: self.amount,
            currency,
            receipt: self.receipt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    #[tracing::instrument(skip(self, req), fields(amount = req.amount, receipt = %req.receipt))]
    async fn create_order(&self, req: OrderRequest) -> Result<Option<Order>, GatewayError> {
        let resp = self
            .http
            .post(format!("{}/v1/orders", self.config.base_url))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&req)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RazorpayErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.description)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let order: Option<RazorpayOrder> =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        tracing::debug!(order_id = ?order.as_ref().map(|o| &o.id), "provider order created");
        order.map(RazorpayOrder::into_domain).transpose()
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify_payment_signature(
            order_id,
            payment_id,
            signature,
            &self.config.key_secret,
        )
    }
}
