//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory) implement this trait.

use crate::domain::{Appointment, AppointmentId, DoctorId, PaymentRecord, UserId};
use crate::error::RepoError;

/// The appointment store.
#[async_trait::async_trait]
pub trait AppointmentRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Appointments
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists a new appointment.
    ///
    /// Fails with `RepoError::Conflict` when a non-cancelled appointment
    /// already holds the same doctor, date and time.
    async fn create_appointment(&self, appointment: Appointment)
    -> Result<Appointment, RepoError>;

    /// Gets an appointment by ID.
    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError>;

    /// Lists a user's appointments, newest first.
    async fn list_appointments_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Appointment>, RepoError>;

    /// `(slot_date, slot_time)` of every non-cancelled appointment for a doctor.
    async fn booked_slots(&self, doc_id: &DoctorId) -> Result<Vec<(String, String)>, RepoError>;

    /// Marks an appointment as cancelled. `None` if it does not exist.
    async fn cancel_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepoError>;

    /// Sets the payment flag on an appointment. `None` if it does not exist.
    async fn set_paid(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError>;

    /// Sets the payment flag on the newest non-cancelled appointment of
    /// `user_id` with `doc_id`. `None` if there is no such appointment.
    async fn mark_paid_for(
        &self,
        user_id: &UserId,
        doc_id: &DoctorId,
    ) -> Result<Option<Appointment>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment ledger
    // ─────────────────────────────────────────────────────────────────────────────

    /// Appends a verified payment to the ledger.
    async fn record_payment(&self, record: PaymentRecord) -> Result<PaymentRecord, RepoError>;

    /// Lists ledger entries, newest first.
    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, RepoError>;
}
