//! Booking Application Service
//!
//! Orchestrates the payment flow and the appointment collaborators through
//! the repository and gateway ports. Contains NO infrastructure logic.

use chrono::NaiveDateTime;

use booking_types::domain::slot::{BookedSlots, weekly_slots};
use booking_types::{
    AppError, Appointment, AppointmentId, AppointmentRepository, BookAppointmentRequest, Currency,
    DoctorId, DomainError, Money, Order, OrderRequest, PaymentGateway, PaymentRecord,
    ReceiptStrategy, Slot, UserId, VerifyPaymentRequest,
};

/// A provider order plus the public key the checkout widget needs.
#[derive(Debug, Clone)]
pub struct OrderCreated {
    pub order: Order,
    pub key: String,
}

/// Result of a successful signature check.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    /// The appointment flagged as paid, if one matched.
    pub appointment: Option<Appointment>,
    pub record: PaymentRecord,
}

/// Application service for booking and payment operations.
///
/// Generic over the repository and the payment gateway; both adapters are
/// injected at construction.
pub struct BookingService<R: AppointmentRepository, G: PaymentGateway> {
    repo: R,
    gateway: G,
    receipts: ReceiptStrategy,
}

impl<R: AppointmentRepository, G: PaymentGateway> BookingService<R, G> {
    pub fn new(repo: R, gateway: G) -> Self {
        Self {
            repo,
            gateway,
            receipts: ReceiptStrategy::default(),
        }
    }

    pub fn with_receipts(mut self, receipts: ReceiptStrategy) -> Self {
        self.receipts = receipts;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a provider order for a fee given in rupees.
    ///
    /// The gateway is called at most once and never when the amount is
    /// missing or invalid.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, amount: Option<f64>) -> Result<OrderCreated, AppError> {
        let amount = amount.ok_or(DomainError::MissingAmount)?;
        let money = Money::from_major(amount, Currency::INR)?;
        let req = OrderRequest::new(money, self.receipts.next_receipt());

        let order = self
            .gateway
            .create_order(req)
            .await?
            .ok_or_else(|| AppError::Gateway("Failed to create Razorpay order".into()))?;

        tracing::info!(order_id = %order.id, amount = order.amount, "order created");
        Ok(OrderCreated {
            order,
            key: self.gateway.key_id().to_string(),
        })
    }

    /// Verifies a checkout signature and flags the matching appointment paid.
    ///
    /// A verified payment with no matching appointment still succeeds; the
    /// ledger row records `appointment_matched = false`.
    #[tracing::instrument(skip(self, req), fields(order_id = ?req.order_id))]
    pub async fn verify_payment(
        &self,
        req: VerifyPaymentRequest,
    ) -> Result<VerificationOutcome, AppError> {
        let (Some(order_id), Some(payment_id), Some(signature)) = (
            non_empty(&req.order_id),
            non_empty(&req.payment_id),
            non_empty(&req.signature),
        ) else {
            return Err(AppError::Validation("Missing payment details".into()));
        };

        if !self
            .gateway
            .verify_signature(order_id, payment_id, signature)
        {
            tracing::warn!(order_id, payment_id, "payment signature mismatch");
            return Err(AppError::Verification("Payment verification failed".into()));
        }

        let appointment = match (&req.user_id, &req.doctor_id) {
            (Some(user), Some(doctor)) if !user.is_blank() && !doctor.is_blank() => {
                self.repo.mark_paid_for(user, doctor).await?
            }
            _ => None,
        };

        if appointment.is_none() {
            tracing::warn!(
                order_id,
                user_id = ?req.user_id,
                doctor_id = ?req.doctor_id,
                "verified payment matched no appointment"
            );
        }

        let record = PaymentRecord::success(
            req.user_id.clone(),
            req.doctor_id.clone(),
            order_id,
            payment_id,
            appointment.is_some(),
        );
        let record = self.repo.record_payment(record).await?;

        Ok(VerificationOutcome {
            appointment,
            record,
        })
    }

    /// Lists the payment ledger, newest first.
    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, AppError> {
        self.repo.list_payments().await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Appointment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    #[tracing::instrument(skip(self, req), fields(user_id = %user, doc_id = %req.doc_id))]
    pub async fn book_appointment(
        &self,
        user: &UserId,
        req: BookAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let appointment = Appointment::new(
            user.clone(),
            DoctorId::new(req.doc_id),
            req.slot_date,
            req.slot_time,
        )?;

        self.repo
            .create_appointment(appointment)
            .await
            .map_err(Into::into)
    }

    pub async fn list_appointments(&self, user: &UserId) -> Result<Vec<Appointment>, AppError> {
        self.repo
            .list_appointments_for_user(user)
            .await
            .map_err(Into::into)
    }

    /// Cancels one of the caller's appointments.
    pub async fn cancel_appointment(
        &self,
        user: &UserId,
        id: AppointmentId,
    ) -> Result<Appointment, AppError> {
        self.owned_appointment(user, id).await?;
        self.repo
            .cancel_appointment(id)
            .await?
            .ok_or_else(appointment_not_found)
    }

    /// Flags one of the caller's appointments as paid.
    pub async fn mark_paid(
        &self,
        user: &UserId,
        id: AppointmentId,
    ) -> Result<Appointment, AppError> {
        self.owned_appointment(user, id).await?;
        self.repo
            .set_paid(id)
            .await?
            .ok_or_else(appointment_not_found)
    }

    /// Free slots for a doctor over the booking window starting at `now`.
    pub async fn available_slots(
        &self,
        doc_id: &DoctorId,
        now: NaiveDateTime,
    ) -> Result<Vec<Vec<Slot>>, AppError> {
        if doc_id.is_blank() {
            return Err(AppError::Validation("Missing Details".into()));
        }

        let booked: BookedSlots = self.repo.booked_slots(doc_id).await?.into_iter().collect();
        Ok(weekly_slots(now, &booked))
    }

    async fn owned_appointment(
        &self,
        user: &UserId,
        id: AppointmentId,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .repo
            .get_appointment(id)
            .await?
            .ok_or_else(appointment_not_found)?;

        if !appointment.is_owned_by(user) {
            tracing::warn!(%id, user_id = %user, "appointment action by non-owner");
            return Err(AppError::Validation("Unauthorized action".into()));
        }
        Ok(appointment)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn appointment_not_found() -> AppError {
    AppError::NotFound("Appointment not found".into())
}
