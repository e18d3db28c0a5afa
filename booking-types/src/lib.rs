//! # Booking Types
//!
//! Domain types and port traits for the appointment payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Appointment, Money, Order, PaymentRecord, Slot)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Appointment, AppointmentId, Currency, DoctorId, Money, Order, OrderRequest, PaymentRecord,
    PaymentRecordId, PaymentStatus, ReceiptStrategy, Slot, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{AppointmentRepository, GatewayError, PaymentGateway};
