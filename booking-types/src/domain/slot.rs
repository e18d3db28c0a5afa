//! Weekly consultation slot generation.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of days offered, starting today.
pub const BOOKING_WINDOW_DAYS: i64 = 7;
/// First bookable hour of a day.
pub const OPENING_HOUR: u32 = 10;
/// Slots must start strictly before this hour.
pub const CLOSING_HOUR: u32 = 21;
pub const SLOT_MINUTES: i64 = 30;

/// A bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    #[schema(value_type = String, example = "2026-10-18T10:30:00")]
    pub datetime: NaiveDateTime,
    #[schema(example = "10:30 AM")]
    pub time: String,
}

/// `(slot_date, slot_time)` pairs already taken.
pub type BookedSlots = HashSet<(String, String)>;

/// Day key used on appointments, e.g. `5_10_2026` (no zero padding).
pub fn slot_date_key(date: NaiveDate) -> String {
    format!("{}_{}_{}", date.day(), date.month(), date.year())
}

/// Display label used on appointments, e.g. `02:30 PM`.
pub fn slot_time_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Where today's slots start: the next full hour once the clinic has opened,
/// on the half hour if we are already past it.
fn first_slot_today(now: NaiveDateTime) -> Option<NaiveDateTime> {
    let hour = if now.hour() > OPENING_HOUR {
        now.hour() + 1
    } else {
        OPENING_HOUR
    };
    let minute = if now.minute() > 30 { 30 } else { 0 };
    // hour 24 means nothing is left today
    now.date().and_hms_opt(hour, minute, 0)
}

/// Free slots for the next [`BOOKING_WINDOW_DAYS`] days, one bucket per day.
///
/// Buckets are always present, possibly empty, so index `i` is `today + i`.
pub fn weekly_slots(now: NaiveDateTime, booked: &BookedSlots) -> Vec<Vec<Slot>> {
    (0..BOOKING_WINDOW_DAYS)
        .map(|offset| {
            let date = now.date() + Duration::days(offset);
            let start = if offset == 0 {
                first_slot_today(now)
            } else {
                date.and_hms_opt(OPENING_HOUR, 0, 0)
            };
            let Some(end) = date.and_hms_opt(CLOSING_HOUR, 0, 0) else {
                return Vec::new();
            };

            let day_key = slot_date_key(date);
            let mut slots = Vec::new();
            let mut cursor = start;
            while let Some(current) = cursor.filter(|c| *c < end) {
                let time = slot_time_label(current.time());
                if !booked.contains(&(day_key.clone(), time.clone())) {
                    slots.push(Slot {
                        datetime: current,
                        time,
                    });
                }
                cursor = Some(current + Duration::minutes(SLOT_MINUTES));
            }
            slots
        })
        .collect()
}
