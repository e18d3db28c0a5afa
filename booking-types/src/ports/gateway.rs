//! Payment provider port.
//!
//! Implementations talk to the real provider over HTTP or simulate it
//! in-process for development and tests.

use crate::domain::{Order, OrderRequest};

/// Error type for payment provider operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Http(String),

    #[error("Provider rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

/// Port trait for the payment provider.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Public key id the client checkout widget needs.
    fn key_id(&self) -> &str;

    /// Creates an order. `Ok(None)` means the provider answered without an order.
    ///
    /// Called exactly once per request; implementations must not retry.
    async fn create_order(&self, req: OrderRequest) -> Result<Option<Order>, GatewayError>;

    /// Checks the signature the provider handed to the client after checkout.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
