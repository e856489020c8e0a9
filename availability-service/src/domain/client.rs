use async_trait::async_trait;
use shared::time::{DateKey, WallTime};
use shared::types::{
    AdminToken, BookedSlot, Booking, BookingDetails, ManualBookingPayload, UnavailableRange,
};

use crate::error::AvailabilityServiceError;

/// The bookings backend as the engine sees it.
///
/// Every admin operation takes the caller's bearer token explicitly; the
/// public booked-slots feed is the only unauthenticated call. Implementations
/// may retry reads, but must attempt each mutation exactly once.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Bookings for one calendar month, all statuses.
    async fn month_bookings(
        &self,
        token: &AdminToken,
        year: i32,
        month: u32,
    ) -> Result<Vec<Booking>, AvailabilityServiceError>;

    /// The public feed of occupied windows across all dates.
    async fn booked_slots(&self) -> Result<Vec<BookedSlot>, AvailabilityServiceError>;

    /// Admin-declared blocks for one date.
    async fn unavailable_ranges(
        &self,
        token: &AdminToken,
        date: DateKey,
    ) -> Result<Vec<UnavailableRange>, AvailabilityServiceError>;

    /// Replaces the date's whole block set. An empty `ranges` clears it.
    async fn replace_unavailable_ranges(
        &self,
        token: &AdminToken,
        date: DateKey,
        ranges: &[UnavailableRange],
    ) -> Result<(), AvailabilityServiceError>;

    /// Rewrites a booking's time bounds; absent sides keep their value.
    async fn update_booking_time(
        &self,
        token: &AdminToken,
        booking_id: i64,
        start_time: Option<WallTime>,
        end_time: Option<WallTime>,
    ) -> Result<(), AvailabilityServiceError>;

    async fn delete_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<(), AvailabilityServiceError>;

    async fn create_manual_booking(
        &self,
        token: &AdminToken,
        payload: &ManualBookingPayload,
    ) -> Result<Booking, AvailabilityServiceError>;

    async fn pending_bookings(
        &self,
        token: &AdminToken,
    ) -> Result<Vec<Booking>, AvailabilityServiceError>;

    async fn approve_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        admin_notes: Option<String>,
    ) -> Result<(), AvailabilityServiceError>;

    async fn reject_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        reason: String,
    ) -> Result<(), AvailabilityServiceError>;

    async fn booking_details(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<BookingDetails, AvailabilityServiceError>;
}
