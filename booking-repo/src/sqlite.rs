//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use booking_types::{
    Appointment, AppointmentId, AppointmentRepository, DoctorId, PaymentRecord, RepoError, UserId,
};

use crate::migration_statements;
use crate::types::{
    APPOINTMENT_COLUMNS, DbAppointment, DbPaymentRecord, PAYMENT_COLUMNS, db_error,
    map_booking_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

const MIGRATIONS: [(&str, &str); 2] = [
    ("0001", include_str!("../migrations/0001_create_appointments.sql")),
    ("0002", include_str!("../migrations/0002_create_payments.sql")),
];

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database,
        // so keep exactly one connection alive for the pool's lifetime.
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Creates the database schema (for testing with existing pool).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for (name, sql) in MIGRATIONS {
            for statement in migration_statements(sql) {
                sqlx::query(statement)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| RepoError::Database(format!("Migration {} failed: {}", name, e)))?;
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AppointmentRepository for SqliteRepo {
    async fn create_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, RepoError> {
        sqlx::query(
            r#"INSERT INTO appointments (id, user_id, doc_id, slot_date, slot_time, payment, cancelled, is_completed, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(appointment.id.to_string())
        .bind(appointment.user_id.as_str())
        .bind(appointment.doc_id.as_str())
        .bind(&appointment.slot_date)
        .bind(&appointment.slot_time)
        .bind(appointment.payment)
        .bind(appointment.cancelled)
        .bind(appointment.is_completed)
        .bind(appointment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_booking_error)?;

        Ok(appointment)
    }

    async fn get_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError> {
        let sql = format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS);
        let row: Option<DbAppointment> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbAppointment::into_domain).transpose()
    }

    async fn list_appointments_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Appointment>, RepoError> {
        let sql = format!(
            "SELECT {} FROM appointments WHERE user_id = ? ORDER BY created_at DESC",
            APPOINTMENT_COLUMNS
        );
        let rows: Vec<DbAppointment> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(DbAppointment::into_domain).collect()
    }

    async fn booked_slots(&self, doc_id: &DoctorId) -> Result<Vec<(String, String)>, RepoError> {
        sqlx::query_as(
            r#"SELECT slot_date, slot_time FROM appointments WHERE doc_id = ? AND cancelled = 0"#,
        )
        .bind(doc_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn cancel_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, RepoError> {
        let sql = format!(
            "UPDATE appointments SET cancelled = 1 WHERE id = ? RETURNING {}",
            APPOINTMENT_COLUMNS
        );
        let row: Option<DbAppointment> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbAppointment::into_domain).transpose()
    }

    async fn set_paid(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError> {
        let sql = format!(
            "UPDATE appointments SET payment = 1 WHERE id = ? RETURNING {}",
            APPOINTMENT_COLUMNS
        );
        let row: Option<DbAppointment> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbAppointment::into_domain).transpose()
    }

    async fn mark_paid_for(
        &self,
        user_id: &UserId,
        doc_id: &DoctorId,
    ) -> Result<Option<Appointment>, RepoError> {
        let sql = format!(
            r#"UPDATE appointments SET payment = 1
               WHERE id = (
                   SELECT id FROM appointments
                   WHERE user_id = ? AND doc_id = ? AND cancelled = 0
                   ORDER BY created_at DESC
                   LIMIT 1
               )
               RETURNING {}"#,
            APPOINTMENT_COLUMNS
        );
        let row: Option<DbAppointment> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .bind(doc_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(DbAppointment::into_domain).transpose()
    }

    async fn record_payment(&self, record: PaymentRecord) -> Result<PaymentRecord, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, user_id, doctor_id, order_id, payment_id, status, appointment_matched, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_ref().map(UserId::as_str))
        .bind(record.doctor_id.as_ref().map(DoctorId::as_str))
        .bind(&record.order_id)
        .bind(&record.payment_id)
        .bind(record.status.as_ref())
        .bind(record.appointment_matched)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(record)
    }

    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, RepoError> {
        let sql = format!(
            "SELECT {} FROM payments ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        );
        let rows: Vec<DbPaymentRecord> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(DbPaymentRecord::into_domain).collect()
    }
}
