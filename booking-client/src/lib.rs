//! # Booking Client SDK
//!
//! A typed Rust client for the appointment payment API.

use booking_types::{
    Appointment, AppointmentActionRequest, AppointmentId, AppointmentsResponse,
    BookAppointmentRequest, CreateOrderRequest, CreateOrderResponse, MessageResponse,
    PaymentRecord, PaymentsResponse, Slot, SlotsResponse, VerifyPaymentRequest,
};
use reqwest::{Client, IntoUrl, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `success: false` or a non-2xx status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry later")]
    RateLimited,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Booking API client.
pub struct BookingClient {
    base_url: String,
    token: Option<String>,
    admin_token: Option<String>,
    http: Client,
}

impl BookingClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            admin_token: None,
            http: Client::new(),
        }
    }

    /// Sets the user token sent in the `token` header.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the admin token sent in the `atoken` header.
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Creates a payment order for a fee in rupees.
    pub async fn create_order(&self, amount: f64) -> Result<CreateOrderResponse, ClientError> {
        let req = CreateOrderRequest {
            amount: Some(amount),
        };
        self.post("/api/payment/create-order", &req).await
    }

    /// Submits a checkout result for verification.
    pub async fn verify_payment(
        &self,
        req: &VerifyPaymentRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.post("/api/payment/verify", req).await
    }

    pub async fn book_appointment(
        &self,
        doc_id: &str,
        slot_date: &str,
        slot_time: &str,
    ) -> Result<MessageResponse, ClientError> {
        let req = BookAppointmentRequest {
            doc_id: doc_id.to_string(),
            slot_date: slot_date.to_string(),
            slot_time: slot_time.to_string(),
        };
        self.post("/api/user/book-appointment", &req).await
    }

    /// Lists the caller's appointments, newest first.
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        let resp: AppointmentsResponse = self.get("/api/user/appointments").await?;
        Ok(resp.appointments)
    }

    pub async fn cancel_appointment(
        &self,
        id: AppointmentId,
    ) -> Result<MessageResponse, ClientError> {
        let req = AppointmentActionRequest {
            appointment_id: id.to_string(),
        };
        self.post("/api/user/cancel-appointment", &req).await
    }

    pub async fn mark_paid(&self, id: AppointmentId) -> Result<MessageResponse, ClientError> {
        let req = AppointmentActionRequest {
            appointment_id: id.to_string(),
        };
        self.post("/api/user/mark-paid", &req).await
    }

    /// Free slots for a doctor, one bucket per day.
    pub async fn doctor_slots(&self, doc_id: &str) -> Result<Vec<Vec<Slot>>, ClientError> {
        let url = self.endpoint(&["api", "doctor", doc_id, "slots"])?;
        let resp: SlotsResponse = self.fetch(url).await?;
        Ok(resp.slots)
    }

    /// Lists the payment ledger (admin token required).
    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, ClientError> {
        let resp: PaymentsResponse = self.get("/api/admin/payments").await?;
        Ok(resp.payments)
    }

    fn authorize(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            req = req.header("token", token);
        }
        if let Some(token) = &self.admin_token {
            req = req.header("atoken", token);
        }
        req
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let invalid = || ClientError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.fetch(format!("{}{}", self.base_url, path)).await
    }

    async fn fetch<T: DeserializeOwned>(&self, url: impl IntoUrl) -> Result<T, ClientError> {
        let req = self.authorize(self.http.get(url));
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.authorize(
            self.http
                .post(format!("{}{}", self.base_url, path))
                .json(body),
        );
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }

        let body = resp.text().await?;
        let value: Option<serde_json::Value> = serde_json::from_str(&body).ok();
        let message = || {
            value
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        };

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: message().unwrap_or(body),
            });
        }

        // Business failures arrive as 200 with `success: false`.
        let rejected = value
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(|s| s.as_bool())
            == Some(false);
        if rejected {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: message().unwrap_or_default(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
