use serde::{Deserialize, Serialize};
use shared::time::{DateKey, TimeRange, WallTime};
use shared::types::{Booking, UnavailableRange};
use utoipa::ToSchema;

use crate::domain::overlap::{conflicting_ranges, conflicts_with};
use crate::domain::slot::{ScheduleSlot, SlotStatus};
use crate::error::AvailabilityServiceError;

/// One staged time change for a backend booking. Either side may be absent;
/// a missing side means "keep the current value".
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeEdit {
    pub booking_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub start_time: Option<WallTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "13:00")]
    pub end_time: Option<WallTime>,
}

/// Raised when a mutation introduces an overlap. A warning, not a refusal:
/// the caller decides whether to keep the change.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictWarning {
    #[schema(value_type = Vec<Object>)]
    pub conflicting: Vec<TimeRange>,
}

/// A booking queued for deletion, kept whole so it can be put back on the
/// grid if the backend call ultimately fails.
#[derive(Debug, Clone)]
struct PendingDeletion {
    booking_id: i64,
    slot: ScheduleSlot,
}

/// The editable slot list for one calendar day.
///
/// All mutations are local. Booking slots stage their changes into the edit
/// and deletion queues; available/unavailable slots mutate in place and are
/// only persisted through the full replacement set on save.
#[derive(Debug)]
pub struct DaySchedule {
    date: DateKey,
    default_window: TimeRange,
    slots: Vec<ScheduleSlot>,
    edits: Vec<TimeEdit>,
    deletions: Vec<PendingDeletion>,
    next_id: u32,
}

impl DaySchedule {
    /// Merges the day's bookings and unavailable ranges into one slot list.
    ///
    /// Only confirmed/completed bookings for `date` become slots, sorted by
    /// start. A day with zero booking slots is seeded with one `available`
    /// slot over the default window. Unavailable ranges are appended last,
    /// deduplicated by exact `(start, end)` against anything already present.
    pub fn load(
        date: DateKey,
        bookings: &[Booking],
        unavailable: &[UnavailableRange],
        default_window: TimeRange,
    ) -> Self {
        let mut schedule = Self {
            date,
            default_window,
            slots: Vec::new(),
            edits: Vec::new(),
            deletions: Vec::new(),
            next_id: 1,
        };

        let mut booked: Vec<(TimeRange, i64)> = bookings
            .iter()
            .filter(|b| b.booking_date == date && b.booking_status.occupies_slot())
            .filter_map(|b| match b.time_range() {
                Ok(range) => Some((range, b.booking_id)),
                Err(e) => {
                    tracing::warn!(booking_id = b.booking_id, error = %e, "Skipping booking with invalid time range");
                    None
                }
            })
            .collect();
        booked.sort_by_key(|(range, _)| range.start);

        for (range, booking_id) in booked {
            let id = schedule.allocate_id();
            schedule.slots.push(ScheduleSlot::booking(id, range, booking_id));
        }

        if schedule.slots.is_empty() {
            let id = schedule.allocate_id();
            schedule
                .slots
                .push(ScheduleSlot::available(id, default_window));
        }

        for entry in unavailable {
            let range = match entry.time_range() {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!(id = ?entry.id, error = %e, "Skipping unavailable range with invalid bounds");
                    continue;
                }
            };
            let duplicate = schedule.slots.iter().any(|slot| slot.range == range);
            if duplicate {
                continue;
            }
            let id = schedule.allocate_id();
            schedule
                .slots
                .push(ScheduleSlot::unavailable(id, range, entry.id));
        }

        schedule
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn date(&self) -> DateKey {
        self.date
    }

    pub fn slots(&self) -> &[ScheduleSlot] {
        &self.slots
    }

    pub fn edits(&self) -> &[TimeEdit] {
        &self.edits
    }

    pub fn queued_deletions(&self) -> Vec<i64> {
        self.deletions.iter().map(|d| d.booking_id).collect()
    }

    /// Changes a slot's bounds. Booking slots stage the change into the edit
    /// queue (merged per booking id); other slots just move. Returns a
    /// warning when the new range collides with another obstacle.
    pub fn resize(
        &mut self,
        slot_id: u32,
        new_start: Option<WallTime>,
        new_end: Option<WallTime>,
    ) -> Result<Option<ConflictWarning>, AvailabilityServiceError> {
        let index = self.index_of(slot_id)?;
        let current = self.slots[index].range;
        let range = TimeRange::new(
            new_start.unwrap_or(current.start),
            new_end.unwrap_or(current.end),
        )
        .map_err(|e| AvailabilityServiceError::Validation(e.to_string()))?;

        if self.slots[index].status == SlotStatus::Booking {
            let booking_id = self.slots[index]
                .booking_id
                .ok_or_else(|| {
                    AvailabilityServiceError::Internal(format!(
                        "Booking slot {slot_id} has no backend id"
                    ))
                })?;
            match self.edits.iter_mut().find(|e| e.booking_id == booking_id) {
                Some(edit) => {
                    if new_start.is_some() {
                        edit.start_time = new_start;
                    }
                    if new_end.is_some() {
                        edit.end_time = new_end;
                    }
                }
                None => self.edits.push(TimeEdit {
                    booking_id,
                    start_time: new_start,
                    end_time: new_end,
                }),
            }
        }

        self.slots[index].range = range;
        Ok(self.warning_for(range, slot_id))
    }

    /// Flips available ⇄ unavailable. Booking slots refuse; the grid entry
    /// stays exactly as it was.
    pub fn toggle(&mut self, slot_id: u32) -> Result<SlotStatus, AvailabilityServiceError> {
        let index = self.index_of(slot_id)?;
        let next = match self.slots[index].status {
            SlotStatus::Available => SlotStatus::Unavailable,
            SlotStatus::Unavailable => SlotStatus::Available,
            SlotStatus::Booking => {
                return Err(AvailabilityServiceError::BadRequest(
                    "A booked slot cannot be toggled; delete the booking instead".to_string(),
                ));
            }
        };
        self.slots[index].status = next;
        Ok(next)
    }

    /// Appends a fresh `available` slot over the default window.
    pub fn add_slot(&mut self) -> (u32, Option<ConflictWarning>) {
        let range = self.default_window;
        let id = self.allocate_id();
        self.slots.push(ScheduleSlot::available(id, range));
        (id, self.warning_for(range, id))
    }

    /// Removes a non-booking slot immediately. Booking slots refuse the
    /// generic removal; they go through [`Self::remove_booking`].
    pub fn remove(&mut self, slot_id: u32) -> Result<(), AvailabilityServiceError> {
        let index = self.index_of(slot_id)?;
        if self.slots[index].status == SlotStatus::Booking {
            return Err(AvailabilityServiceError::BadRequest(
                "Booked slots can only be removed by deleting the booking".to_string(),
            ));
        }
        self.slots.remove(index);
        Ok(())
    }

    /// Queues the slot's backend booking for deletion and removes it from
    /// the grid optimistically. The slot is kept aside so a failed backend
    /// call can restore it. Returns the queued booking id.
    pub fn remove_booking(&mut self, slot_id: u32) -> Result<i64, AvailabilityServiceError> {
        let index = self.index_of(slot_id)?;
        if self.slots[index].status != SlotStatus::Booking {
            return Err(AvailabilityServiceError::BadRequest(
                "Slot is not a booking".to_string(),
            ));
        }
        let booking_id = self.slots[index].booking_id.ok_or_else(|| {
            AvailabilityServiceError::Internal(format!("Booking slot {slot_id} has no backend id"))
        })?;

        let slot = self.slots.remove(index);
        // A deletion supersedes any staged time edit for the same booking.
        self.edits.retain(|e| e.booking_id != booking_id);
        self.deletions.push(PendingDeletion { booking_id, slot });
        Ok(booking_id)
    }

    /// Puts a queued-then-failed deletion back on the grid.
    pub fn restore_deletion(&mut self, booking_id: i64) -> Result<(), AvailabilityServiceError> {
        let index = self
            .deletions
            .iter()
            .position(|d| d.booking_id == booking_id)
            .ok_or_else(|| {
                AvailabilityServiceError::NotFound(format!(
                    "No pending deletion for booking {booking_id}"
                ))
            })?;
        let pending = self.deletions.remove(index);
        let insert_at = self
            .slots
            .iter()
            .position(|s| s.range.start > pending.slot.range.start)
            .unwrap_or(self.slots.len());
        self.slots.insert(insert_at, pending.slot);
        Ok(())
    }

    /// True while any `unavailable` slot still collides with another
    /// obstacle. Saving is refused until the admin resolves these.
    pub fn has_blocking_conflicts(&self) -> bool {
        self.slots.iter().any(|slot| {
            slot.status == SlotStatus::Unavailable
                && conflicts_with(slot.range, Some(slot.id), &self.slots)
        })
    }

    /// The full replacement set sent to the backend on save. May be empty;
    /// an empty set clears the day's blocks.
    pub fn unavailable_set(&self) -> Vec<UnavailableRange> {
        self.slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Unavailable)
            .map(|slot| UnavailableRange {
                id: slot.server_id,
                ..UnavailableRange::new(self.date, slot.range)
            })
            .collect()
    }

    fn index_of(&self, slot_id: u32) -> Result<usize, AvailabilityServiceError> {
        self.slots
            .iter()
            .position(|s| s.id == slot_id)
            .ok_or_else(|| AvailabilityServiceError::NotFound(format!("No slot with id {slot_id}")))
    }

    fn warning_for(&self, range: TimeRange, slot_id: u32) -> Option<ConflictWarning> {
        let conflicting = conflicting_ranges(range, Some(slot_id), &self.slots);
        (!conflicting.is_empty()).then_some(ConflictWarning { conflicting })
    }
}
