//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;

use booking_types::{
    Appointment, AppointmentId, AppointmentRepository, DoctorId, PaymentRecord, RepoError, UserId,
};

use crate::migration_statements;
use crate::types::{
    APPOINTMENT_COLUMNS, DbAppointment, DbPaymentRecord, PAYMENT_COLUMNS, db_error,
    map_booking_error,
};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository. Slot uniqueness is enforced by a partial unique index.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    let migrations = [
        ("0001", include_str!("../migrations/0001_create_appointments_pg.sql")),
        ("0002", include_str!("../migrations/0002_create_payments_pg.sql")),
    ];

    for (name, sql) in migrations {
        for statement in migration_statements(sql) {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("postgres migrations applied");
        Ok(Self { pool })
    }

    async fn fetch_one_appointment(
        &self,
        sql: &str,
        binds: &[&str],
    ) -> Result<Option<Appointment>, RepoError> {
        let mut query = sqlx::query_as::<_, DbAppointment>(sql);
        for value in binds {
            query = query.bind(*value);
        }
        let row = query.fetch_optional(&self.pool).await.map_err(db_error)?;
        row.map(DbAppointment::into_domain).transpose()
    }
}

#[async_trait]
impl AppointmentRepository for PostgresRepo {
    async fn create_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, RepoError> {
        sqlx::query(
            r#"INSERT INTO appointments (id, user_id, doc_id, slot_date, slot_time, payment, cancelled, is_completed, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
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
        let sql = format!("SELECT {} FROM appointments WHERE id = $1", APPOINTMENT_COLUMNS);
        self.fetch_one_appointment(&sql, &[id.to_string().as_str()]).await
    }

    async fn list_appointments_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Appointment>, RepoError> {
        let sql = format!(
            "SELECT {} FROM appointments WHERE user_id = $1 ORDER BY created_at DESC",
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
            r#"SELECT slot_date, slot_time FROM appointments WHERE doc_id = $1 AND cancelled = FALSE"#,
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
            "UPDATE appointments SET cancelled = TRUE WHERE id = $1 RETURNING {}",
            APPOINTMENT_COLUMNS
        );
        self.fetch_one_appointment(&sql, &[id.to_string().as_str()]).await
    }

    async fn set_paid(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError> {
        let sql = format!(
            "UPDATE appointments SET payment = TRUE WHERE id = $1 RETURNING {}",
            APPOINTMENT_COLUMNS
        );
        self.fetch_one_appointment(&sql, &[id.to_string().as_str()]).await
    }

    async fn mark_paid_for(
        &self,
        user_id: &UserId,
        doc_id: &DoctorId,
    ) -> Result<Option<Appointment>, RepoError> {
        // FOR UPDATE serialises concurrent verifications for the same pair.
        let sql = format!(
            r#"UPDATE appointments SET payment = TRUE
               WHERE id = (
                   SELECT id FROM appointments
                   WHERE user_id = $1 AND doc_id = $2 AND cancelled = FALSE
                   ORDER BY created_at DESC
                   LIMIT 1
                   FOR UPDATE
               )
               RETURNING {}"#,
            APPOINTMENT_COLUMNS
        );
        self.fetch_one_appointment(&sql, &[user_id.as_str(), doc_id.as_str()])
            .await
    }

    async fn record_payment(&self, record: PaymentRecord) -> Result<PaymentRecord, RepoError> {
        sqlx::query(
            r#"INSERT INTO payments (id, user_id, doctor_id, order_id, payment_id, status, appointment_matched, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
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
