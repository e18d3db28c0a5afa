//! HTTP request handlers.
//!
//! Every business outcome is answered with HTTP 200 and a `success` flag.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use booking_types::{
    AppError, AppointmentActionRequest, AppointmentId, AppointmentRepository,
    AppointmentsResponse, BookAppointmentRequest, CreateOrderRequest, CreateOrderResponse,
    DoctorId, MessageResponse, PaymentGateway, PaymentsResponse, SlotsResponse,
    VerifyPaymentRequest,
};

use super::auth::AuthUser;
use crate::BookingService;

pub const CREATE_ORDER_FAILED: &str = "Server error while creating order";
pub const VERIFY_FAILED: &str = "Server error during payment verification";
const BOOKING_FAILED: &str = "Server error while booking appointment";
const LIST_APPOINTMENTS_FAILED: &str = "Server error while listing appointments";
const CANCEL_FAILED: &str = "Server error while cancelling appointment";
const MARK_PAID_FAILED: &str = "Server error while updating payment status";
const SLOTS_FAILED: &str = "Server error while loading slots";
const LIST_PAYMENTS_FAILED: &str = "Server error while listing payments";
const INVALID_BODY: &str = "Invalid request body";

/// Application state shared across handlers.
pub struct AppState<R: AppointmentRepository, G: PaymentGateway> {
    pub service: BookingService<R, G>,
}

/// An [`AppError`] plus the generic message shown when its detail must stay
/// internal.
pub struct ApiError {
    error: AppError,
    fallback: &'static str,
}

impl ApiError {
    pub fn new(error: AppError, fallback: &'static str) -> Self {
        Self { error, fallback }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error, "Server error")
    }
}

/// `map_err` adapter binding an operation's fallback message.
fn fail(fallback: &'static str) -> impl FnOnce(AppError) -> ApiError {
    move |error| ApiError::new(error, fallback)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self.error.public_message() {
            Some(message) => {
                tracing::info!(error = %self.error, "request failed");
                message.to_string()
            }
            None => {
                tracing::error!(error = %self.error, "request failed on a dependency");
                self.fallback.to_string()
            }
        };

        Json(MessageResponse::failed(message)).into_response()
    }
}

/// Unwraps a JSON body. A body sent without a JSON content type reads as an
/// empty object; anything unparseable becomes a validation failure.
fn request_body<T: DeserializeOwned + Default>(
    body: Result<Json<T>, JsonRejection>,
    fallback: &'static str,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "unreadable request body");
            Err(ApiError::new(
                AppError::Validation(INVALID_BODY.into()),
                fallback,
            ))
        }
    }
}

fn parse_appointment_id(raw: &str) -> Result<AppointmentId, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation("Invalid appointment id".into()))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, body), fields(user_id = %user.0))]
pub async fn create_order<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = request_body(body, CREATE_ORDER_FAILED)?;
    let created = state
        .service
        .create_order(req.amount)
        .await
        .map_err(fail(CREATE_ORDER_FAILED))?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order: created.order,
        key: created.key,
    }))
}

/// Verifies a checkout. A body without `userId` acts on the caller.
#[tracing::instrument(skip(state, body), fields(user_id = %user.0))]
pub async fn verify_payment<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut req = request_body(body, VERIFY_FAILED)?;
    if req.user_id.as_ref().is_none_or(|id| id.is_blank()) {
        req.user_id = Some(user.0);
    }

    state
        .service
        .verify_payment(req)
        .await
        .map_err(fail(VERIFY_FAILED))?;

    Ok(Json(MessageResponse::ok("Payment verified successfully")))
}

#[tracing::instrument(skip(state))]
pub async fn list_payments<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .service
        .list_payments()
        .await
        .map_err(fail(LIST_PAYMENTS_FAILED))?;

    Ok(Json(PaymentsResponse {
        success: true,
        payments,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Appointments
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, body), fields(user_id = %user.0, doc_id = tracing::field::Empty))]
pub async fn book_appointment<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = request_body(body, BOOKING_FAILED)?;
    tracing::Span::current().record("doc_id", req.doc_id.as_str());
    state
        .service
        .book_appointment(&user.0, req)
        .await
        .map_err(fail(BOOKING_FAILED))?;

    Ok(Json(MessageResponse::ok("Appointment Booked")))
}

#[tracing::instrument(skip(state), fields(user_id = %user.0))]
pub async fn list_appointments<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = state
        .service
        .list_appointments(&user.0)
        .await
        .map_err(fail(LIST_APPOINTMENTS_FAILED))?;

    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

#[tracing::instrument(skip(state, body), fields(user_id = %user.0, appointment_id = tracing::field::Empty))]
pub async fn cancel_appointment<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<AppointmentActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = request_body(body, CANCEL_FAILED)?;
    tracing::Span::current().record("appointment_id", req.appointment_id.as_str());
    let id = parse_appointment_id(&req.appointment_id).map_err(fail(CANCEL_FAILED))?;
    state
        .service
        .cancel_appointment(&user.0, id)
        .await
        .map_err(fail(CANCEL_FAILED))?;

    Ok(Json(MessageResponse::ok("Appointment Cancelled")))
}

#[tracing::instrument(skip(state, body), fields(user_id = %user.0, appointment_id = tracing::field::Empty))]
pub async fn mark_paid<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<AppointmentActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = request_body(body, MARK_PAID_FAILED)?;
    tracing::Span::current().record("appointment_id", req.appointment_id.as_str());
    let id = parse_appointment_id(&req.appointment_id).map_err(fail(MARK_PAID_FAILED))?;
    state
        .service
        .mark_paid(&user.0, id)
        .await
        .map_err(fail(MARK_PAID_FAILED))?;

    Ok(Json(MessageResponse::ok("Appointment marked as paid")))
}

/// Free slots for the next week, computed against the server's local clock.
#[tracing::instrument(skip(state))]
pub async fn doctor_slots<R: AppointmentRepository, G: PaymentGateway>(
    State(state): State<Arc<AppState<R, G>>>,
    Path(doc_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let now = chrono::Local::now().naive_local();
    let slots = state
        .service
        .available_slots(&DoctorId::new(doc_id), now)
        .await
        .map_err(fail(SLOTS_FAILED))?;

    Ok(Json(SlotsResponse {
        success: true,
        slots,
    }))
}
