//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Field names follow the browser client (`docId`, `razorpay_order_id`, ...).

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{Appointment, DoctorId, Order, PaymentRecord, Slot, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment order for a consultation fee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Fee in major currency units (rupees). Numeric strings are accepted.
    #[serde(default, deserialize_with = "deserialize_amount")]
    #[schema(example = 500)]
    pub amount: Option<f64>,
}

/// Response after creating an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: Order,
    /// Public key id for the checkout widget
    #[schema(example = "rzp_test_1DP5mmOlF5G5ag")]
    pub key: String,
}

/// Checkout result posted back by the client for verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "razorpay_order_id", default)]
    pub order_id: Option<String>,
    #[serde(rename = "razorpay_payment_id", default)]
    pub payment_id: Option<String>,
    #[serde(rename = "razorpay_signature", default)]
    pub signature: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(rename = "doctorId", default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<DoctorId>,
}

/// Generic `{success, message}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Ledger listing for administrators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentsResponse {
    pub success: bool,
    pub payments: Vec<PaymentRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Appointment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to book a slot with a doctor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    #[serde(default)]
    #[schema(example = "doc_42")]
    pub doc_id: String,
    #[serde(default)]
    #[schema(example = "18_10_2026")]
    pub slot_date: String,
    #[serde(default)]
    #[schema(example = "10:30 AM")]
    pub slot_time: String,
}

/// Request that targets one appointment (cancel, mark paid).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentActionRequest {
    #[serde(default)]
    #[schema(example = "123e4567-e89b-12d3-a456-426614174000")]
    pub appointment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<Appointment>,
}

/// Free slots, one bucket per day starting today.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotsResponse {
    pub success: bool,
    pub slots: Vec<Vec<Slot>>,
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
