use serde::{Deserialize, Serialize};
use shared::time::TimeRange;
use utoipa::ToSchema;

/// What a slot on the day grid represents.
///
/// `Booking` slots mirror a confirmed backend booking and are immutable here
/// except through the staged edit/deletion queues; the other two are purely
/// admin-declared and mutate locally until save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Unavailable,
    Booking,
}

impl SlotStatus {
    /// Whether a slot with this status blocks other ranges. `available`
    /// slots never count as the other side of a conflict check.
    pub fn is_obstacle(self) -> bool {
        matches!(self, Self::Unavailable | Self::Booking)
    }
}

/// One row of the admin day-schedule grid.
///
/// `id` is local to the loaded schedule and never leaves the service.
/// Booking slots carry the backend booking id only; guest and payment
/// details are fetched on demand through the details endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub id: u32,
    #[schema(value_type = Object)]
    pub range: TimeRange,
    pub status: SlotStatus,
    /// Backend booking id, set only on `booking` slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
    /// Backend row id, set only on `unavailable` slots loaded from the
    /// backend. Locally-created blocks have none until the replacement
    /// set is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<i64>,
}

impl ScheduleSlot {
    pub fn available(id: u32, range: TimeRange) -> Self {
        Self {
            id,
            range,
            status: SlotStatus::Available,
            booking_id: None,
            server_id: None,
        }
    }

    pub fn unavailable(id: u32, range: TimeRange, server_id: Option<i64>) -> Self {
        Self {
            id,
            range,
            status: SlotStatus::Unavailable,
            booking_id: None,
            server_id,
        }
    }

    pub fn booking(id: u32, range: TimeRange, booking_id: i64) -> Self {
        Self {
            id,
            range,
            status: SlotStatus::Booking,
            booking_id: Some(booking_id),
            server_id: None,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.status.is_obstacle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::time::WallTime;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::new(WallTime::parse(start).unwrap(), WallTime::parse(end).unwrap()).unwrap()
    }

    #[test]
    fn available_is_never_an_obstacle() {
        assert!(!ScheduleSlot::available(1, range("09:00", "12:00")).is_obstacle());
        assert!(ScheduleSlot::unavailable(2, range("09:00", "12:00"), None).is_obstacle());
        assert!(ScheduleSlot::booking(3, range("09:00", "12:00"), 77).is_obstacle());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SlotStatus::Unavailable).unwrap(),
            "\"unavailable\""
        );
        assert_eq!(
            serde_json::to_string(&SlotStatus::Booking).unwrap(),
            "\"booking\""
        );
    }
}
