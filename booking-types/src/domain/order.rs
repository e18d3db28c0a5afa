//! Provider-side payment orders.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::{Currency, Money};

/// What we ask the payment provider to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Amount in minor units
    pub amount: i64,
    pub currency: Currency,
    pub receipt: String,
}

impl OrderRequest {
    pub fn new(amount: Money, receipt: String) -> Self {
        Self {
            amount: amount.amount(),
            currency: amount.currency(),
            receipt,
        }
    }
}

/// An order handle returned by the provider. Never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    /// Opaque provider order id
    #[schema(example = "order_OZ8f2L1kq3S9aB")]
    pub id: String,
    /// Amount in minor units
    #[schema(example = 50000)]
    pub amount: i64,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

/// How order receipts are generated.
///
/// Receipts only need to be unique enough for the provider dashboard; the
/// timestamp form can collide for orders created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiptStrategy {
    #[default]
    Timestamp,
    Uuid,
}

impl ReceiptStrategy {
    pub fn next_receipt(&self) -> String {
        match self {
            ReceiptStrategy::Timestamp => format!("receipt_{}", Utc::now().timestamp_millis()),
            // 8 + 32 chars keeps within the provider's 40 character receipt limit
            ReceiptStrategy::Uuid => format!("receipt_{}", Uuid::new_v4().simple()),
        }
    }
}

impl std::str::FromStr for ReceiptStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" => Ok(ReceiptStrategy::Timestamp),
            "uuid" => Ok(ReceiptStrategy::Uuid),
            other => Err(format!("Unknown receipt strategy: {}", other)),
        }
    }
}
