use shared::time::TimeRange;

use crate::domain::slot::ScheduleSlot;

/// Whether `candidate` collides with any obstacle slot other than
/// `exclude_id`. This is the single conflict rule shared by the public
/// resolver, the editor's mutation warnings and the manual-booking recheck.
///
/// `available` slots are never obstacles; adjacency is never a conflict.
pub fn conflicts_with(candidate: TimeRange, exclude_id: Option<u32>, slots: &[ScheduleSlot]) -> bool {
    slots.iter().any(|slot| {
        exclude_id != Some(slot.id) && slot.is_obstacle() && candidate.overlaps(&slot.range)
    })
}

/// The obstacle ranges `candidate` collides with, for conflict reports.
pub fn conflicting_ranges(
    candidate: TimeRange,
    exclude_id: Option<u32>,
    slots: &[ScheduleSlot],
) -> Vec<TimeRange> {
    slots
        .iter()
        .filter(|slot| {
            exclude_id != Some(slot.id) && slot.is_obstacle() && candidate.overlaps(&slot.range)
        })
        .map(|slot| slot.range)
        .collect()
}
