use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::time::{DateKey, TimeParseError, TimeRange, WallTime};

// region: Booking backend types

/// Lifecycle of a booking on the backend. Only confirmed and completed
/// bookings occupy calendar slots; pending ones wait in the approval queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Rejected,
}

impl BookingStatus {
    pub fn occupies_slot(self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Downpayment,
    Full,
}

impl PaymentType {
    /// Maps the UI wording to the backend enum.
    pub fn from_display(label: &str) -> Self {
        if label.eq_ignore_ascii_case("Down Payment") {
            Self::Downpayment
        } else {
            Self::Full
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Gcash,
    Cash,
}

/// A booking as the backend reports it. Read-mostly on this side; the engine
/// only ever rewrites its time range or deletes it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: i64,
    pub booking_reference: String,
    #[schema(value_type = String, example = "2025-04-18")]
    pub booking_date: DateKey,
    #[schema(value_type = String, example = "09:00")]
    pub booking_time_start: WallTime,
    #[schema(value_type = String, example = "13:00")]
    pub booking_time_end: WallTime,
    pub booking_status: BookingStatus,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
    pub location: String,
    pub category_name: String,
    pub package_name: String,
    #[serde(default)]
    pub package_price: Option<f64>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub gcash_number: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn time_range(&self) -> Result<TimeRange, TimeParseError> {
        TimeRange::new(self.booking_time_start, self.booking_time_end)
    }
}

/// The slice of a booking the public booked-slots endpoint exposes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    #[schema(value_type = String, example = "2025-04-18")]
    pub booking_date: DateKey,
    #[schema(value_type = String, example = "09:00")]
    pub booking_time_start: WallTime,
    #[schema(value_type = String, example = "13:00")]
    pub booking_time_end: WallTime,
    #[serde(default)]
    pub booking_status: Option<BookingStatus>,
}

/// An admin-declared block with no customer booking attached. The backend
/// persists these per date as a full replacement set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[schema(value_type = String, example = "2025-04-18")]
    pub date: DateKey,
    #[schema(value_type = String, example = "06:00")]
    pub start_time: WallTime,
    #[schema(value_type = String, example = "09:00")]
    pub end_time: WallTime,
    pub status: String,
}

impl UnavailableRange {
    pub fn new(date: DateKey, range: TimeRange) -> Self {
        Self {
            id: None,
            date,
            start_time: range.start,
            end_time: range.end,
            status: "unavailable".to_string(),
        }
    }

    pub fn time_range(&self) -> Result<TimeRange, TimeParseError> {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub payment_id: Option<i64>,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    #[serde(default)]
    pub gcash_number: Option<String>,
}

/// Booking joined with its payment record and proof URL, fetched on demand
/// for the details view instead of being denormalized onto every slot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub booking: Booking,
    #[serde(default)]
    pub payment: Option<PaymentRecord>,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
}

/// Payload for `POST /api/bookings/manual`, field names as the backend
/// expects them. Times are already in 24-hour wire form via `WallTime`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualBookingPayload {
    #[schema(value_type = String, example = "2025-04-18")]
    pub booking_date: DateKey,
    #[schema(value_type = String, example = "09:00")]
    pub booking_time_start: WallTime,
    #[schema(value_type = String, example = "13:00")]
    pub booking_time_end: WallTime,
    pub booking_hours: u16,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    pub guest_phone: String,
    pub location: String,
    pub category_name: String,
    pub package_name: String,
    pub package_price: f64,
    #[serde(default)]
    pub special_requests: Option<String>,
    pub booking_reference: String,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    #[serde(default)]
    pub gcash_number: Option<String>,
}

// endregion: Booking backend types

// region: Credentials

/// Bearer credential for admin calls, passed explicitly per request rather
/// than read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminToken(String);

impl AdminToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// endregion: Credentials
