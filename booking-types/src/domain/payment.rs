//! Verified payment ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::appointment::{DoctorId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentRecordId(Uuid);

impl PaymentRecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentRecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Success,
}

impl AsRef<str> for PaymentStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// One row per successfully verified payment signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub user_id: Option<UserId>,
    pub doctor_id: Option<DoctorId>,
    pub order_id: String,
    pub payment_id: String,
    pub status: PaymentStatus,
    /// Whether an appointment was found and flagged as paid
    pub appointment_matched: bool,
    #[schema(value_type = String, example = "2026-10-18T09:12:00Z")]
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn success(
        user_id: Option<UserId>,
        doctor_id: Option<DoctorId>,
        order_id: impl Into<String>,
        payment_id: impl Into<String>,
        appointment_matched: bool,
    ) -> Self {
        Self {
            id: PaymentRecordId::new(),
            user_id,
            doctor_id,
            order_id: order_id.into(),
            payment_id: payment_id.into(),
            status: PaymentStatus::Success,
            appointment_matched,
            created_at: Utc::now(),
        }
    }
}
