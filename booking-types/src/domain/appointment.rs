//! Appointment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Unique identifier for an Appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    /// Creates a new random AppointmentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AppointmentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AppointmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a patient account, issued by the user directory.
    UserId
);

opaque_id!(
    /// Identifier of a doctor profile.
    DoctorId
);

/// A booked consultation slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub user_id: UserId,
    pub doc_id: DoctorId,
    /// Day key in `day_month_year` form, e.g. `18_10_2026`
    #[schema(example = "18_10_2026")]
    pub slot_date: String,
    /// Display time of the slot
    #[schema(example = "10:30 AM")]
    pub slot_time: String,
    /// Set once the consultation fee has been paid
    pub payment: bool,
    pub cancelled: bool,
    pub is_completed: bool,
    #[schema(value_type = String, example = "2026-10-18T09:12:00Z")]
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Creates a new unpaid appointment.
    ///
    /// # Validation
    /// - Doctor, date and time must all be present
    pub fn new(
        user_id: UserId,
        doc_id: DoctorId,
        slot_date: String,
        slot_time: String,
    ) -> Result<Self, DomainError> {
        if user_id.is_blank()
            || doc_id.is_blank()
            || slot_date.trim().is_empty()
            || slot_time.trim().is_empty()
        {
            return Err(DomainError::ValidationError("Missing Details".into()));
        }

        Ok(Self {
            id: AppointmentId::new(),
            user_id,
            doc_id,
            slot_date,
            slot_time,
            payment: false,
            cancelled: false,
            is_completed: false,
            created_at: Utc::now(),
        })
    }

    /// Reconstructs an appointment from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: AppointmentId,
        user_id: UserId,
        doc_id: DoctorId,
        slot_date: String,
        slot_time: String,
        payment: bool,
        cancelled: bool,
        is_completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            doc_id,
            slot_date,
            slot_time,
            payment,
            cancelled,
            is_completed,
            created_at,
        }
    }

    /// Returns true if `user` booked this appointment.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}
