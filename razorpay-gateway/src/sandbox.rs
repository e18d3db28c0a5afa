//! In-process stand-in for the provider.
//!
//! Issues provider-shaped order ids and signs simulated checkouts with the
//! same scheme the live provider uses, so the verification path is exercised
//! end to end without network access.

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;

use booking_types::{GatewayError, Order, OrderRequest, PaymentGateway};

use crate::signature;

const ID_LEN: usize = 14;

pub struct SandboxGateway {
    key_id: String,
    key_secret: String,
}

impl SandboxGateway {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Simulates a completed checkout for `order_id`.
    ///
    /// Returns the `(payment_id, signature)` pair the client would receive.
    pub fn complete_checkout(&self, order_id: &str) -> (String, String) {
        let payment_id = format!("pay_{}", random_id());
        let signature = signature::sign_payment(order_id, &payment_id, &self.key_secret);
        (payment_id, signature)
    }
}

fn random_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, req: OrderRequest) -> Result<Option<Order>, GatewayError> {
        let order = Order {
            id: format!("order_{}", random_id()),
            amount: req.amount,
            currency: req.currency,
            receipt: Some(req.receipt),
        };
        tracing::info!(order_id = %order.id, amount = order.amount, "sandbox order created");
        Ok(Some(order))
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify_payment_signature(order_id, payment_id, signature, &self.key_secret)
    }
}
