//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use booking_types::domain::{
    Appointment, AppointmentId, Currency, DoctorId, Order, PaymentRecord, PaymentRecordId,
    PaymentStatus, Slot, UserId,
};
use booking_types::dto::{
    AppointmentActionRequest, AppointmentsResponse, BookAppointmentRequest, CreateOrderRequest,
    CreateOrderResponse, MessageResponse, PaymentsResponse, SlotsResponse, VerifyPaymentRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

// Dummy functions to generate path documentation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create a provider order for a consultation fee
#[utoipa::path(
    post,
    path = "/api/payment/create-order",
    tag = "payments",
    request_body = CreateOrderRequest,
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Order created; failures use the `{success: false, message}` envelope", body = CreateOrderResponse)
    )
)]
async fn create_order() {}

/// Verify the checkout signature and flag the appointment as paid
#[utoipa::path(
    post,
    path = "/api/payment/verify",
    tag = "payments",
    request_body = VerifyPaymentRequest,
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Verification outcome", body = MessageResponse, example = json!({"success": true, "message": "Payment verified successfully"}))
    )
)]
async fn verify_payment() {}

/// Book a slot with a doctor
#[utoipa::path(
    post,
    path = "/api/user/book-appointment",
    tag = "appointments",
    request_body = BookAppointmentRequest,
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Booking outcome", body = MessageResponse)
    )
)]
async fn book_appointment() {}

/// List the caller's appointments, newest first
#[utoipa::path(
    get,
    path = "/api/user/appointments",
    tag = "appointments",
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Appointments", body = AppointmentsResponse)
    )
)]
async fn list_appointments() {}

/// Cancel one of the caller's appointments
#[utoipa::path(
    post,
    path = "/api/user/cancel-appointment",
    tag = "appointments",
    request_body = AppointmentActionRequest,
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Cancellation outcome", body = MessageResponse)
    )
)]
async fn cancel_appointment() {}

/// Flag one of the caller's appointments as paid
#[utoipa::path(
    post,
    path = "/api/user/mark-paid",
    tag = "appointments",
    request_body = AppointmentActionRequest,
    security(("user_token" = [])),
    responses(
        (status = 200, description = "Update outcome", body = MessageResponse)
    )
)]
async fn mark_paid() {}

/// Free slots for the next seven days
#[utoipa::path(
    get,
    path = "/api/doctor/{doc_id}/slots",
    tag = "appointments",
    params(
        ("doc_id" = String, Path, description = "Doctor id")
    ),
    responses(
        (status = 200, description = "One bucket of slots per day", body = SlotsResponse)
    )
)]
async fn doctor_slots() {}

/// Verified payment ledger
#[utoipa::path(
    get,
    path = "/api/admin/payments",
    tag = "admin",
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = PaymentsResponse)
    )
)]
async fn list_payments() {}

/// OpenAPI documentation for the booking API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Appointment Payment Service API",
        version = "1.0.0",
        description = "Payment orders, signature verification and appointment booking.\n\n## Authentication\n\nUser endpoints expect a JWT in the `token` header. Admin endpoints expect a JWT in the `atoken` header.\n\nBusiness failures are reported as HTTP 200 with `{\"success\": false, \"message\": ...}`.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_order,
        verify_payment,
        book_appointment,
        list_appointments,
        cancel_appointment,
        mark_paid,
        doctor_slots,
        list_payments,
    ),
    components(
        schemas(
            CreateOrderRequest,
            CreateOrderResponse,
            VerifyPaymentRequest,
            MessageResponse,
            BookAppointmentRequest,
            AppointmentActionRequest,
            AppointmentsResponse,
            SlotsResponse,
            PaymentsResponse,
            Appointment,
            AppointmentId,
            UserId,
            DoctorId,
            Order,
            Currency,
            Slot,
            PaymentRecord,
            PaymentRecordId,
            PaymentStatus,
        )
    ),

    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Order creation and payment verification"),
        (name = "appointments", description = "Booking, cancellation and slot availability"),
        (name = "admin", description = "Administrator views"),
    )
)]
pub struct ApiDoc;

/// Header token schemes for users and administrators.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("token"))),
            );
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("atoken"))),
            );
        }
    }
}
