//! # Booking Hex
//!
//! Application service layer and HTTP adapter for the appointment payment
//! service.
//!
//! ## Architecture
//!
//! - `service` - Application service (payment flow, appointments, ledger)
//! - `inbound` - HTTP adapter (Axum server, token auth, rate limiting)
//! - `openapi` - OpenAPI document served at `/swagger-ui`
//!
//! The service is generic over `R: AppointmentRepository` and
//! `G: PaymentGateway`, so both adapters are injected at compile time.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::{BookingService, OrderCreated, VerificationOutcome};
