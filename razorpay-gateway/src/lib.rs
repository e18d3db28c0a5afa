//! # Razorpay Gateway
//!
//! Outbound adapter implementing the `PaymentGateway` port.
//!
//! - [`RazorpayGateway`] calls the provider's REST orders API
//! - [`SandboxGateway`] simulates the provider in-process for local runs
//! - [`signature`] holds the checkout signature scheme both of them verify

mod client;
mod sandbox;
pub mod signature;

pub use client::{DEFAULT_BASE_URL, RazorpayConfig, RazorpayGateway};
pub use sandbox::SandboxGateway;
