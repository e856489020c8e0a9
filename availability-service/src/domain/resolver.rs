use serde::Serialize;
use shared::time::{TimeRange, WallTime};
use utoipa::ToSchema;

/// One candidate window on the public booking grid. Conflicting candidates
/// are flagged, not hidden, so the customer sees why a time is gone.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotProposal {
    #[schema(value_type = String, example = "09:00")]
    pub start: WallTime,
    #[schema(value_type = String, example = "13:00")]
    pub end: WallTime,
    /// 12-hour label, e.g. `"9:00 AM - 1:00 PM"`.
    pub label: String,
    pub already_booked: bool,
}

/// Builds every hour-aligned `[h, h+duration)` candidate that fits in the
/// day and marks the ones colliding with a booked range.
///
/// `booked` must already be reduced to the target date's confirmed and
/// completed bookings; callers never pass available or pending entries.
pub fn propose_slots(duration_hours: u16, booked: &[TimeRange]) -> Vec<SlotProposal> {
    if duration_hours == 0 || duration_hours > 23 {
        return Vec::new();
    }

    (0..=23 - duration_hours)
        .filter_map(|hour| {
            let start = WallTime::from_hm(hour, 0)?;
            let end = WallTime::from_hm(hour + duration_hours, 0)?;
            let range = TimeRange::new(start, end).ok()?;
            Some(SlotProposal {
                start,
                end,
                label: format!("{} - {}", start.format_12(), end.format_12()),
                already_booked: booked.iter().any(|other| range.overlaps(other)),
            })
        })
        .collect()
}
