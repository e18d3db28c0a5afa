//! Database row types shared by the SQLite and PostgreSQL adapters.
//!
//! Identifiers are stored as TEXT in both databases, so one row struct serves
//! both backends.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use booking_types::{
    Appointment, AppointmentId, DoctorId, PaymentRecord, PaymentRecordId, PaymentStatus,
    RepoError, UserId,
};

pub(crate) const APPOINTMENT_COLUMNS: &str =
    "id, user_id, doc_id, slot_date, slot_time, payment, cancelled, is_completed, created_at";

pub(crate) const PAYMENT_COLUMNS: &str =
    "id, user_id, doctor_id, order_id, payment_id, status, appointment_matched, created_at";

/// Appointment row from database.
#[derive(FromRow)]
pub struct DbAppointment {
    pub id: String,
    pub user_id: String,
    pub doc_id: String,
    pub slot_date: String,
    pub slot_time: String,
    pub payment: bool,
    pub cancelled: bool,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl DbAppointment {
    pub fn into_domain(self) -> Result<Appointment, RepoError> {
        let id: AppointmentId = self
            .id
            .parse()
            .map_err(|e: uuid::Error| RepoError::Database(e.to_string()))?;

        Ok(Appointment::from_parts(
            id,
            UserId::new(self.user_id),
            DoctorId::new(self.doc_id),
            self.slot_date,
            self.slot_time,
            self.payment,
            self.cancelled,
            self.is_completed,
            self.created_at,
        ))
    }
}

/// Payment ledger row from database.
#[derive(FromRow)]
pub struct DbPaymentRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub doctor_id: Option<String>,
    pub order_id: String,
    pub payment_id: String,
    pub status: String,
    pub appointment_matched: bool,
    pub created_at: DateTime<Utc>,
}

impl DbPaymentRecord {
    pub fn into_domain(self) -> Result<PaymentRecord, RepoError> {
        let id: PaymentRecordId = self
            .id
            .parse()
            .map_err(|e: uuid::Error| RepoError::Database(e.to_string()))?;

        let status = match self.status.as_str() {
            "SUCCESS" => PaymentStatus::Success,
            other => {
                return Err(RepoError::Database(format!(
                    "Unknown payment status: {}",
                    other
                )));
            }
        };

        Ok(PaymentRecord {
            id,
            user_id: self.user_id.map(UserId::new),
            doctor_id: self.doctor_id.map(DoctorId::new),
            order_id: self.order_id,
            payment_id: self.payment_id,
            status,
            appointment_matched: self.appointment_matched,
            created_at: self.created_at,
        })
    }
}

/// Maps an appointment insert failure, turning the active-slot unique index
/// into a conflict.
pub(crate) fn map_booking_error(e: sqlx::Error) -> RepoError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepoError::Conflict("Slot not available".into()),
        _ => RepoError::Database(e.to_string()),
    }
}

pub(crate) fn db_error(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}
