//! BookingService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use booking_types::{
        AppError, Appointment, AppointmentId, AppointmentRepository, BookAppointmentRequest,
        Currency, DoctorId, GatewayError, Order, OrderRequest, PaymentGateway, PaymentRecord,
        ReceiptStrategy, RepoError, UserId, VerifyPaymentRequest,
    };

    use crate::BookingService;

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        appointments: Mutex<Vec<Appointment>>,
        payments: Mutex<Vec<PaymentRecord>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                appointments: Mutex::new(Vec::new()),
                payments: Mutex::new(Vec::new()),
            }
        }

        fn update(
            &self,
            id: AppointmentId,
            f: impl FnOnce(&mut Appointment),
        ) -> Option<Appointment> {
            let mut appointments = self.appointments.lock().unwrap();
            let appointment = appointments.iter_mut().find(|a| a.id == id)?;
            f(appointment);
            Some(appointment.clone())
        }
    }

    #[async_trait]
    impl AppointmentRepository for MockRepo {
        async fn create_appointment(
            &self,
            appointment: Appointment,
        ) -> Result<Appointment, RepoError> {
            let mut appointments = self.appointments.lock().unwrap();
            let taken = appointments.iter().any(|a| {
                !a.cancelled
                    && a.doc_id == appointment.doc_id
                    && a.slot_date == appointment.slot_date
                    && a.slot_time == appointment.slot_time
            });
            if taken {
                return Err(RepoError::Conflict("Slot not available".into()));
            }
            appointments.push(appointment.clone());
            Ok(appointment)
        }

        async fn get_appointment(
            &self,
            id: AppointmentId,
        ) -> Result<Option<Appointment>, RepoError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn list_appointments_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<Appointment>, RepoError> {
            let mut found: Vec<_> = self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| &a.user_id == user_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn booked_slots(
            &self,
            doc_id: &DoctorId,
        ) -> Result<Vec<(String, String)>, RepoError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| &a.doc_id == doc_id && !a.cancelled)
                .map(|a| (a.slot_date.clone(), a.slot_time.clone()))
                .collect())
        }

        async fn cancel_appointment(
            &self,
            id: AppointmentId,
        ) -> Result<Option<Appointment>, RepoError> {
            Ok(self.update(id, |a| a.cancelled = true))
        }

        async fn set_paid(&self, id: AppointmentId) -> Result<Option<Appointment>, RepoError> {
            Ok(self.update(id, |a| a.payment = true))
        }

        async fn mark_paid_for(
            &self,
            user_id: &UserId,
            doc_id: &DoctorId,
        ) -> Result<Option<Appointment>, RepoError> {
            let target = self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| &a.user_id == user_id && &a.doc_id == doc_id && !a.cancelled)
                .max_by_key(|a| a.created_at)
                .map(|a| a.id);

            Ok(target.and_then(|id| self.update(id, |a| a.payment = true)))
        }

        async fn record_payment(&self, record: PaymentRecord) -> Result<PaymentRecord, RepoError> {
            self.payments.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list_payments(&self) -> Result<Vec<PaymentRecord>, RepoError> {
            let mut payments = self.payments.lock().unwrap().clone();
            payments.reverse();
            Ok(payments)
        }
    }

    /// What the fake provider answers to `create_order`.
    pub enum FakeReply {
        Order,
        Nothing,
        Failure,
    }

    /// Gateway double that counts calls and accepts one fixed signature.
    pub struct FakeGateway {
        reply: FakeReply,
        pub order_calls: AtomicUsize,
        pub signature_checks: AtomicUsize,
        pub last_request: Mutex<Option<OrderRequest>>,
    }

    pub const GOOD_SIGNATURE: &str = "good_signature";

    impl FakeGateway {
        pub fn new(reply: FakeReply) -> Self {
            Self {
                reply,
                order_calls: AtomicUsize::new(0),
                signature_checks: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        fn key_id(&self) -> &str {
            "rzp_test_fake"
        }

        async fn create_order(&self, req: OrderRequest) -> Result<Option<Order>, GatewayError> {
            self.order_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(req.clone());
            match self.reply {
                FakeReply::Order => Ok(Some(Order {
                    id: "order_fake".into(),
                    amount: req.amount,
                    currency: req.currency,
                    receipt: Some(req.receipt),
                })),
                FakeReply::Nothing => Ok(None),
                FakeReply::Failure => Err(GatewayError::Http("connection reset".into())),
            }
        }

        fn verify_signature(&self, _order_id: &str, _payment_id: &str, signature: &str) -> bool {
            self.signature_checks.fetch_add(1, Ordering::SeqCst);
            signature == GOOD_SIGNATURE
        }
    }

    fn service(reply: FakeReply) -> BookingService<MockRepo, FakeGateway> {
        BookingService::new(MockRepo::new(), FakeGateway::new(reply))
    }

    fn verify_request(
        order_id: Option<&str>,
        payment_id: Option<&str>,
        signature: Option<&str>,
    ) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            order_id: order_id.map(String::from),
            payment_id: payment_id.map(String::from),
            signature: signature.map(String::from),
            user_id: Some(UserId::from("user_1")),
            doctor_id: Some(DoctorId::from("doc_1")),
        }
    }

    fn booking(doc: &str, date: &str, time: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doc_id: doc.into(),
            slot_date: date.into(),
            slot_time: time.into(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Order creation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_order_converts_to_paise() {
        let service = service(FakeReply::Order);

        let created = service.create_order(Some(500.0)).await.unwrap();

        assert_eq!(created.key, "rzp_test_fake");
        assert_eq!(created.order.amount, 50000);
        let sent = service.gateway().last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.amount, 50000);
        assert_eq!(sent.currency, Currency::INR);
        assert!(sent.receipt.starts_with("receipt_"));
    }

    #[tokio::test]
    async fn test_create_order_uuid_receipts() {
        let service = service(FakeReply::Order).with_receipts(ReceiptStrategy::Uuid);

        service.create_order(Some(1.0)).await.unwrap();

        let sent = service.gateway().last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.receipt.len(), "receipt_".len() + 32);
    }

    #[tokio::test]
    async fn test_missing_or_zero_amount_skips_gateway() {
        let service = service(FakeReply::Order);

        for amount in [None, Some(0.0)] {
            let err = service.create_order(amount).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == "Amount is required"));
        }

        let err = service.create_order(Some(-5.0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert_eq!(service.gateway().order_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_without_order_is_gateway_error() {
        let service = service(FakeReply::Nothing);

        let err = service.create_order(Some(100.0)).await.unwrap_err();

        assert!(matches!(err, AppError::Gateway(ref m) if m == "Failed to create Razorpay order"));
        assert_eq!(service.gateway().order_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_dependency_error() {
        let service = service(FakeReply::Failure);

        let err = service.create_order(Some(100.0)).await.unwrap_err();

        assert!(matches!(err, AppError::Dependency(_)));
        assert_eq!(err.public_message(), None);
        assert_eq!(service.gateway().order_calls.load(Ordering::SeqCst), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_missing_payment_fields_never_check_signature() {
        let service = service(FakeReply::Order);
        let cases = [
            verify_request(None, Some("pay_1"), Some(GOOD_SIGNATURE)),
            verify_request(Some("order_1"), None, Some(GOOD_SIGNATURE)),
            verify_request(Some("order_1"), Some("pay_1"), None),
            verify_request(Some(""), Some("pay_1"), Some(GOOD_SIGNATURE)),
            verify_request(None, None, None),
        ];

        for req in cases {
            let err = service.verify_payment(req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == "Missing payment details"));
        }

        assert_eq!(service.gateway().signature_checks.load(Ordering::SeqCst), 0);
        assert!(service.list_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let service = service(FakeReply::Order);
        let user = UserId::from("user_1");
        let booked = service
            .book_appointment(&user, booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();

        let err = service
            .verify_payment(verify_request(Some("order_1"), Some("pay_1"), Some("forged")))
            .await
            .unwrap_err();

        assert!(
            matches!(err, AppError::Verification(ref m) if m == "Payment verification failed")
        );
        let stored = service.repo().get_appointment(booked.id).await.unwrap().unwrap();
        assert!(!stored.payment);
        assert!(service.list_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verified_payment_marks_appointment_paid() {
        let service = service(FakeReply::Order);
        let user = UserId::from("user_1");
        let booked = service
            .book_appointment(&user, booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();

        let outcome = service
            .verify_payment(verify_request(Some("order_1"), Some("pay_1"), Some(GOOD_SIGNATURE)))
            .await
            .unwrap();

        let paid = outcome.appointment.unwrap();
        assert_eq!(paid.id, booked.id);
        assert!(paid.payment);
        assert!(outcome.record.appointment_matched);
        assert_eq!(outcome.record.order_id, "order_1");
        assert_eq!(outcome.record.payment_id, "pay_1");
    }

    #[tokio::test]
    async fn test_double_verification_is_idempotent() {
        let service = service(FakeReply::Order);
        let user = UserId::from("user_1");
        let booked = service
            .book_appointment(&user, booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();

        for _ in 0..2 {
            let outcome = service
                .verify_payment(verify_request(
                    Some("order_1"),
                    Some("pay_1"),
                    Some(GOOD_SIGNATURE),
                ))
                .await
                .unwrap();
            assert!(outcome.appointment.unwrap().payment);
        }

        let stored = service.repo().get_appointment(booked.id).await.unwrap().unwrap();
        assert!(stored.payment);
        assert_eq!(service.list_payments().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_verification_without_appointment_still_succeeds() {
        let service = service(FakeReply::Order);

        let outcome = service
            .verify_payment(verify_request(Some("order_1"), Some("pay_1"), Some(GOOD_SIGNATURE)))
            .await
            .unwrap();

        assert!(outcome.appointment.is_none());
        assert!(!outcome.record.appointment_matched);
        let ledger = service.list_payments().await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger[0].appointment_matched);
    }

    #[tokio::test]
    async fn test_verification_skips_cancelled_appointment() {
        let service = service(FakeReply::Order);
        let user = UserId::from("user_1");
        let booked = service
            .book_appointment(&user, booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();
        service.cancel_appointment(&user, booked.id).await.unwrap();

        let outcome = service
            .verify_payment(verify_request(Some("order_1"), Some("pay_1"), Some(GOOD_SIGNATURE)))
            .await
            .unwrap();

        assert!(outcome.appointment.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Appointments
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_book_appointment_requires_details() {
        let service = service(FakeReply::Order);

        let err = service
            .book_appointment(&UserId::from("user_1"), booking("doc_1", "", "10:00 AM"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "Missing Details"));
    }

    #[tokio::test]
    async fn test_double_booking_is_rejected() {
        let service = service(FakeReply::Order);
        service
            .book_appointment(&UserId::from("user_1"), booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();

        let err = service
            .book_appointment(&UserId::from("user_2"), booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "Slot not available"));
    }

    #[tokio::test]
    async fn test_only_owner_can_cancel_or_mark_paid() {
        let service = service(FakeReply::Order);
        let owner = UserId::from("user_1");
        let stranger = UserId::from("user_2");
        let booked = service
            .book_appointment(&owner, booking("doc_1", "20_10_2026", "10:00 AM"))
            .await
            .unwrap();

        let err = service
            .cancel_appointment(&stranger, booked.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Unauthorized action"));

        let err = service.mark_paid(&stranger, booked.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Unauthorized action"));

        let paid = service.mark_paid(&owner, booked.id).await.unwrap();
        assert!(paid.payment);
        let cancelled = service.cancel_appointment(&owner, booked.id).await.unwrap();
        assert!(cancelled.cancelled);
    }

    #[tokio::test]
    async fn test_unknown_appointment_is_not_found() {
        let service = service(FakeReply::Order);

        let err = service
            .cancel_appointment(&UserId::from("user_1"), AppointmentId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_available_slots_exclude_bookings() {
        let service = service(FakeReply::Order);
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        service
            .book_appointment(&UserId::from("user_1"), booking("doc_1", "18_10_2026", "10:30 AM"))
            .await
            .unwrap();

        let slots = service
            .available_slots(&DoctorId::from("doc_1"), now)
            .await
            .unwrap();

        assert_eq!(slots.len(), 7);
        // 22 half-hour slots from 10:00 to 20:30, one taken
        assert_eq!(slots[0].len(), 21);
        assert!(slots[0].iter().all(|s| s.time != "10:30 AM"));
        assert_eq!(slots[1].len(), 22);

        let other = service
            .available_slots(&DoctorId::from("doc_2"), now)
            .await
            .unwrap();
        assert_eq!(other[0].len(), 22);
    }
}
