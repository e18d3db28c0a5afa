//! Domain models for the booking service.

pub mod appointment;
pub mod money;
pub mod order;
pub mod payment;
pub mod slot;

pub use appointment::{Appointment, AppointmentId, DoctorId, UserId};
pub use money::{Currency, Money};
pub use order::{Order, OrderRequest, ReceiptStrategy};
pub use payment::{PaymentRecord, PaymentRecordId, PaymentStatus};
pub use slot::Slot;
