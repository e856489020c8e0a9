use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use shared::time::{DateKey, TimeRange, WallTime};
use shared::types::{
    AdminToken, Booking, BookingDetails, ManualBookingPayload, PaymentMethod, PaymentType,
    UnavailableRange,
};
use utoipa::ToSchema;

use crate::domain::client::BookingApi;
use crate::domain::config::EngineConfig;
use crate::domain::editor::{DaySchedule, TimeEdit};
use crate::domain::overlap::{conflicting_ranges, conflicts_with};
use crate::domain::resolver::{SlotProposal, propose_slots};
use crate::domain::slot::ScheduleSlot;
use crate::error::AvailabilityServiceError;

// region: Save plan and report

/// The staged mutation plan for one day, committed in one request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePlan {
    /// Booking time edits, one entry per booking id.
    #[serde(default)]
    pub edits: Vec<TimeEdit>,
    /// Backend ids of bookings to delete.
    #[serde(default)]
    pub deletions: Vec<i64>,
    /// The day's complete unavailable set. Always applied as a full
    /// replacement; an empty list clears every block.
    #[serde(default)]
    pub unavailable: Vec<UnavailableRange>,
    /// Stands in for the operator's "continue with remaining work?" answer
    /// when a booking edit fails.
    #[serde(default)]
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    UpdateBookingTime,
    DeleteBooking,
    ReplaceUnavailable,
    RefreshSchedule,
}

/// Outcome of a single commit step, reported whether it worked or not.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub action: SaveAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    fn ok(action: SaveAction, booking_id: Option<i64>) -> Self {
        Self {
            action,
            booking_id,
            success: true,
            error: None,
        }
    }

    fn failed(action: SaveAction, booking_id: Option<i64>, error: String) -> Self {
        Self {
            action,
            booking_id,
            success: false,
            error: Some(error),
        }
    }
}

/// Per-step account of a save, returned even when parts of the plan failed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub steps: Vec<StepOutcome>,
    /// True when a failed edit stopped the plan before deletions and the
    /// unavailable replacement ran.
    pub aborted: bool,
    /// Bookings whose deletion failed; they remain on the backend and show
    /// up again in the refreshed schedule below.
    pub restored_booking_ids: Vec<i64>,
    /// The day as the backend reports it after the commit. Absent only when
    /// the refresh itself failed (reported as its own step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleSlot>>,
}

// endregion: Save plan and report

// region: Manual booking request

/// Admin-entered booking form. Times arrive in either notation and leave
/// for the backend in 24-hour form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualBookingRequest {
    #[schema(value_type = String, example = "2025-04-18")]
    pub booking_date: DateKey,
    #[schema(value_type = String, example = "09:00")]
    pub start_time: WallTime,
    #[schema(value_type = String, example = "13:00")]
    pub end_time: WallTime,
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
    /// UI wording: `"Down Payment"` maps to the downpayment enum, anything
    /// else to full payment.
    pub payment_type: String,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    #[serde(default)]
    pub gcash_number: Option<String>,
    /// Must be set to proceed when the range conflicts with current slots.
    #[serde(default)]
    pub confirm_conflict: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualBookingOutcome {
    pub booking: Booking,
    /// Soft findings (short duration, failed refresh); never fatal.
    pub warnings: Vec<String>,
    /// The refreshed day, when the post-create fetch succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ScheduleSlot>>,
}

// endregion: Manual booking request

/// Orchestrates the engine against the bookings backend.
pub struct SchedulingService {
    booking_api: Arc<dyn BookingApi>,
    config: EngineConfig,
}

impl SchedulingService {
    pub fn new(booking_api: Arc<dyn BookingApi>, config: EngineConfig) -> Self {
        Self {
            booking_api,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Public availability grid: every hour-aligned candidate window for the
    /// date, conflicting ones flagged. A failed booked-slots fetch is an
    /// error, never an empty (falsely free) grid.
    #[tracing::instrument(skip(self))]
    pub async fn availability(
        &self,
        date: DateKey,
        duration_hours: u16,
    ) -> Result<Vec<SlotProposal>, AvailabilityServiceError> {
        if !(1..=23).contains(&duration_hours) {
            return Err(AvailabilityServiceError::Validation(format!(
                "Duration must be between 1 and 23 hours, got {duration_hours}"
            )));
        }

        let slots = self.booking_api.booked_slots().await?;
        let booked: Vec<TimeRange> = slots
            .iter()
            .filter(|s| s.booking_date == date)
            .filter(|s| s.booking_status.is_none_or(|status| status.occupies_slot()))
            .filter_map(|s| TimeRange::new(s.booking_time_start, s.booking_time_end).ok())
            .collect();

        Ok(propose_slots(duration_hours, &booked))
    }

    /// Loads the merged admin slot list for one day.
    #[tracing::instrument(skip(self, token))]
    pub async fn day_schedule(
        &self,
        token: &AdminToken,
        date: DateKey,
    ) -> Result<DaySchedule, AvailabilityServiceError> {
        let day = date.date();
        let bookings = self
            .booking_api
            .month_bookings(token, day.year(), day.month())
            .await?;
        let unavailable = self.booking_api.unavailable_ranges(token, date).await?;
        Ok(DaySchedule::load(
            date,
            &bookings,
            &unavailable,
            self.config.default_window,
        ))
    }

    /// Commits a staged plan: booking edits, then deletions, then the full
    /// unavailable replacement, then a refresh of the day. Steps run strictly
    /// in that order; a failed edit stops the plan unless the operator chose
    /// to continue, while failed deletions never block the remaining work.
    #[tracing::instrument(skip(self, token, plan), fields(date = %date))]
    pub async fn save_day(
        &self,
        token: &AdminToken,
        date: DateKey,
        plan: SavePlan,
    ) -> Result<SaveReport, AvailabilityServiceError> {
        let unavailable = Self::normalized_unavailable(date, plan.unavailable)?;

        let mut steps = Vec::new();
        let mut aborted = false;

        for edit in &plan.edits {
            match self
                .booking_api
                .update_booking_time(token, edit.booking_id, edit.start_time, edit.end_time)
                .await
            {
                Ok(()) => steps.push(StepOutcome::ok(
                    SaveAction::UpdateBookingTime,
                    Some(edit.booking_id),
                )),
                Err(e) => {
                    steps.push(StepOutcome::failed(
                        SaveAction::UpdateBookingTime,
                        Some(edit.booking_id),
                        e.to_string(),
                    ));
                    if !plan.continue_on_error {
                        aborted = true;
                        break;
                    }
                }
            }
        }

        let mut restored_booking_ids = Vec::new();
        if !aborted {
            for booking_id in &plan.deletions {
                match self.booking_api.delete_booking(token, *booking_id).await {
                    Ok(()) => steps.push(StepOutcome::ok(
                        SaveAction::DeleteBooking,
                        Some(*booking_id),
                    )),
                    Err(e) => {
                        // The booking survives on the backend, so the
                        // refreshed schedule below restores its slot.
                        restored_booking_ids.push(*booking_id);
                        steps.push(StepOutcome::failed(
                            SaveAction::DeleteBooking,
                            Some(*booking_id),
                            e.to_string(),
                        ));
                    }
                }
            }

            // Always submitted, even empty: clearing all blocks must be
            // expressible, and resubmitting an unchanged set is harmless.
            match self
                .booking_api
                .replace_unavailable_ranges(token, date, &unavailable)
                .await
            {
                Ok(()) => steps.push(StepOutcome::ok(SaveAction::ReplaceUnavailable, None)),
                Err(e) => steps.push(StepOutcome::failed(
                    SaveAction::ReplaceUnavailable,
                    None,
                    e.to_string(),
                )),
            }
        }

        let schedule = match self.day_schedule(token, date).await {
            Ok(day) => {
                steps.push(StepOutcome::ok(SaveAction::RefreshSchedule, None));
                Some(day.slots().to_vec())
            }
            Err(e) => {
                steps.push(StepOutcome::failed(
                    SaveAction::RefreshSchedule,
                    None,
                    e.to_string(),
                ));
                None
            }
        };

        Ok(SaveReport {
            steps,
            aborted,
            restored_booking_ids,
            schedule,
        })
    }

    /// Creates a booking directly against a chosen range. Field validation
    /// happens before any network call; the overlap check reruns against
    /// the day's current slots and requires explicit confirmation to
    /// proceed past a conflict.
    #[tracing::instrument(skip(self, token, request), fields(date = %request.booking_date))]
    pub async fn create_manual_booking(
        &self,
        token: &AdminToken,
        request: ManualBookingRequest,
    ) -> Result<ManualBookingOutcome, AvailabilityServiceError> {
        Self::validate_manual_request(&request)?;

        let range = TimeRange::new(request.start_time, request.end_time)
            .map_err(|e| AvailabilityServiceError::Validation(e.to_string()))?;

        let mut warnings = Vec::new();
        if range.duration_minutes() < self.config.min_booking_minutes {
            warnings.push(format!(
                "Duration {} min is below the usual minimum of {} min",
                range.duration_minutes(),
                self.config.min_booking_minutes
            ));
        }

        let day = self.day_schedule(token, request.booking_date).await?;
        if conflicts_with(range, None, day.slots()) && !request.confirm_conflict {
            let hits = conflicting_ranges(range, None, day.slots());
            let listed: Vec<String> = hits.iter().map(ToString::to_string).collect();
            return Err(AvailabilityServiceError::Conflict(format!(
                "Range {range} overlaps {}; resubmit with confirmConflict to proceed",
                listed.join(", ")
            )));
        }

        let payload = ManualBookingPayload {
            booking_date: request.booking_date,
            booking_time_start: range.start,
            booking_time_end: range.end,
            booking_hours: range.duration_minutes().div_ceil(60),
            guest_name: request.guest_name,
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            location: request.location,
            category_name: request.category_name,
            package_name: request.package_name,
            package_price: request.package_price,
            special_requests: request.special_requests,
            booking_reference: generate_booking_reference(),
            payment_type: PaymentType::from_display(&request.payment_type),
            payment_method: request.payment_method,
            amount: request.amount,
            gcash_number: request.gcash_number,
        };

        let booking = self.booking_api.create_manual_booking(token, &payload).await?;

        let schedule = match self.day_schedule(token, request.booking_date).await {
            Ok(day) => Some(day.slots().to_vec()),
            Err(e) => {
                warnings.push(format!("Booking created but the day refresh failed: {e}"));
                None
            }
        };

        Ok(ManualBookingOutcome {
            booking,
            warnings,
            schedule,
        })
    }

    // region: Admin queue proxies

    #[tracing::instrument(skip(self, token))]
    pub async fn pending_bookings(
        &self,
        token: &AdminToken,
    ) -> Result<Vec<Booking>, AvailabilityServiceError> {
        self.booking_api.pending_bookings(token).await
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn approve_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        admin_notes: Option<String>,
    ) -> Result<(), AvailabilityServiceError> {
        self.booking_api
            .approve_booking(token, booking_id, admin_notes)
            .await
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn reject_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        reason: String,
    ) -> Result<(), AvailabilityServiceError> {
        self.booking_api.reject_booking(token, booking_id, reason).await
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn booking_details(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<BookingDetails, AvailabilityServiceError> {
        self.booking_api.booking_details(token, booking_id).await
    }

    #[tracing::instrument(skip(self, token))]
    pub async fn delete_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<(), AvailabilityServiceError> {
        self.booking_api.delete_booking(token, booking_id).await
    }

    // endregion: Admin queue proxies

    /// Pins every submitted block to the target date and refuses a set with
    /// unresolved internal overlaps, mirroring the editor's save gate.
    fn normalized_unavailable(
        date: DateKey,
        submitted: Vec<UnavailableRange>,
    ) -> Result<Vec<UnavailableRange>, AvailabilityServiceError> {
        let mut ranges = Vec::with_capacity(submitted.len());
        let mut normalized = Vec::with_capacity(submitted.len());
        for entry in submitted {
            let range = entry
                .time_range()
                .map_err(|e| AvailabilityServiceError::Validation(e.to_string()))?;
            ranges.push(range);
            normalized.push(UnavailableRange { date, ..entry });
        }

        for (i, a) in ranges.iter().enumerate() {
            for b in &ranges[i + 1..] {
                if a.overlaps(b) {
                    return Err(AvailabilityServiceError::Validation(format!(
                        "Unavailable ranges {a} and {b} overlap; resolve conflicts before saving"
                    )));
                }
            }
        }
        Ok(normalized)
    }
}

fn generate_booking_reference() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    format!("BK{}", base36_upper(millis))
}

fn base36_upper(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out.iter().rev().collect()
}

fn validate_required(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

impl SchedulingService {
    fn validate_manual_request(
        request: &ManualBookingRequest,
    ) -> Result<(), AvailabilityServiceError> {
        let mut errors = Vec::new();
        validate_required(&mut errors, "guestName", &request.guest_name);
        validate_required(&mut errors, "guestPhone", &request.guest_phone);
        validate_required(&mut errors, "location", &request.location);
        validate_required(&mut errors, "packageName", &request.package_name);
        if request.amount <= 0.0 {
            errors.push("amount must be positive".to_string());
        }
        if request.payment_method == PaymentMethod::Gcash
            && request
                .gcash_number
                .as_deref()
                .is_none_or(|n| n.trim().is_empty())
        {
            errors.push("gcashNumber is required for GCash payments".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AvailabilityServiceError::Validation(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::MockBookingApi;
    use crate::domain::slot::SlotStatus;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use shared::types::BookingStatus;

    fn t(s: &str) -> WallTime {
        WallTime::parse(s).unwrap()
    }

    fn date(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn token() -> AdminToken {
        AdminToken::new("test-token")
    }

    fn service(api: MockBookingApi) -> SchedulingService {
        SchedulingService::new(Arc::new(api), EngineConfig::default())
    }

    fn booked_slot(day: &str, start: &str, end: &str) -> shared::types::BookedSlot {
        shared::types::BookedSlot {
            booking_date: date(day),
            booking_time_start: t(start),
            booking_time_end: t(end),
            booking_status: Some(BookingStatus::Confirmed),
        }
    }

    fn confirmed_booking(id: i64, day: &str, start: &str, end: &str) -> Booking {
        Booking {
            booking_id: id,
            booking_reference: format!("BK{id:06}"),
            booking_date: date(day),
            booking_time_start: t(start),
            booking_time_end: t(end),
            booking_status: BookingStatus::Confirmed,
            guest_name: "Ana Reyes".to_string(),
            guest_email: None,
            guest_phone: Some("09171234567".to_string()),
            location: "Studio A".to_string(),
            category_name: "Photography".to_string(),
            package_name: "Half Day".to_string(),
            package_price: Some(8000.0),
            special_requests: None,
            payment_type: None,
            payment_method: None,
            gcash_number: None,
            amount: None,
            admin_notes: None,
            created_at: None,
        }
    }

    fn manual_request(day: &str, start: &str, end: &str) -> ManualBookingRequest {
        ManualBookingRequest {
            booking_date: date(day),
            start_time: t(start),
            end_time: t(end),
            guest_name: "Ben Cruz".to_string(),
            guest_email: None,
            guest_phone: "09181234567".to_string(),
            location: "Tagaytay".to_string(),
            category_name: "Videography".to_string(),
            package_name: "Full Day".to_string(),
            package_price: 15000.0,
            special_requests: None,
            payment_type: "Down Payment".to_string(),
            payment_method: PaymentMethod::Cash,
            amount: 5000.0,
            gcash_number: None,
            confirm_conflict: false,
        }
    }

    fn expect_refresh(api: &mut MockBookingApi, day: &'static str, bookings: Vec<Booking>) {
        api.expect_month_bookings()
            .returning(move |_, _, _| Ok(bookings.clone()));
        api.expect_unavailable_ranges()
            .with(mockall::predicate::always(), eq(date(day)))
            .returning(|_, _| Ok(Vec::new()));
    }

    #[tokio::test]
    async fn availability_flags_conflicts_and_keeps_adjacent() {
        let mut api = MockBookingApi::new();
        api.expect_booked_slots()
            .returning(|| Ok(vec![booked_slot("2025-04-18", "09:00", "13:00")]));

        let proposals = service(api)
            .availability(date("2025-04-18"), 4)
            .await
            .unwrap();

        let at = |start: &str| proposals.iter().find(|p| p.start == t(start)).unwrap();
        assert!(at("08:00").already_booked);
        assert!(!at("13:00").already_booked);
    }

    #[tokio::test]
    async fn availability_surfaces_fetch_failure() {
        let mut api = MockBookingApi::new();
        api.expect_booked_slots()
            .returning(|| Err(AvailabilityServiceError::BackendUnavailable("down".into())));

        let err = service(api)
            .availability(date("2025-04-18"), 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AvailabilityServiceError::BackendUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn availability_ignores_other_dates() {
        let mut api = MockBookingApi::new();
        api.expect_booked_slots()
            .returning(|| Ok(vec![booked_slot("2025-04-19", "09:00", "13:00")]));

        let proposals = service(api)
            .availability(date("2025-04-18"), 4)
            .await
            .unwrap();
        assert!(proposals.iter().all(|p| !p.already_booked));
    }

    #[tokio::test]
    async fn availability_rejects_degenerate_duration() {
        let api = MockBookingApi::new();
        let err = service(api)
            .availability(date("2025-04-18"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn save_runs_edits_then_deletions_then_replacement() {
        let mut api = MockBookingApi::new();
        let mut seq = Sequence::new();

        api.expect_update_booking_time()
            .withf(|_, id, start, end| {
                *id == 42 && *start == Some(t("10:00")) && *end == Some(t("14:00"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(()));
        api.expect_delete_booking()
            .withf(|_, id| *id == 77)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        api.expect_replace_unavailable_ranges()
            .withf(|_, d, ranges| *d == date("2025-04-18") && ranges.len() == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        expect_refresh(&mut api, "2025-04-18", Vec::new());

        let plan = SavePlan {
            edits: vec![TimeEdit {
                booking_id: 42,
                start_time: Some(t("10:00")),
                end_time: Some(t("14:00")),
            }],
            deletions: vec![77],
            unavailable: vec![UnavailableRange::new(
                date("2025-04-18"),
                TimeRange::new(t("18:00"), t("20:00")).unwrap(),
            )],
            continue_on_error: false,
        };

        let report = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap();
        assert!(!report.aborted);
        assert!(report.steps.iter().all(|s| s.success));
        assert!(report.schedule.is_some());
    }

    #[tokio::test]
    async fn failed_edit_with_continue_still_runs_remaining_steps() {
        let mut api = MockBookingApi::new();
        api.expect_update_booking_time()
            .times(1)
            .returning(|_, _, _, _| Err(AvailabilityServiceError::Backend("rejected".into())));
        api.expect_delete_booking()
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_replace_unavailable_ranges()
            .withf(|_, _, ranges| ranges.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_refresh(&mut api, "2025-04-18", Vec::new());

        let plan = SavePlan {
            edits: vec![TimeEdit {
                booking_id: 42,
                start_time: Some(t("10:00")),
                end_time: None,
            }],
            deletions: vec![77],
            unavailable: Vec::new(),
            continue_on_error: true,
        };

        let report = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap();
        assert!(!report.aborted);
        let edit_step = &report.steps[0];
        assert_eq!(edit_step.action, SaveAction::UpdateBookingTime);
        assert!(!edit_step.success);
        assert!(
            report
                .steps
                .iter()
                .any(|s| s.action == SaveAction::DeleteBooking && s.success)
        );
        assert!(
            report
                .steps
                .iter()
                .any(|s| s.action == SaveAction::ReplaceUnavailable && s.success)
        );
    }

    #[tokio::test]
    async fn failed_edit_without_continue_aborts_before_deletions() {
        let mut api = MockBookingApi::new();
        api.expect_update_booking_time()
            .times(1)
            .returning(|_, _, _, _| Err(AvailabilityServiceError::Backend("rejected".into())));
        api.expect_delete_booking().times(0);
        api.expect_replace_unavailable_ranges().times(0);
        expect_refresh(&mut api, "2025-04-18", Vec::new());

        let plan = SavePlan {
            edits: vec![TimeEdit {
                booking_id: 42,
                start_time: Some(t("10:00")),
                end_time: None,
            }],
            deletions: vec![77],
            unavailable: Vec::new(),
            continue_on_error: false,
        };

        let report = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap();
        assert!(report.aborted);
        assert_eq!(report.steps[0].action, SaveAction::UpdateBookingTime);
        assert!(!report.steps[0].success);
    }

    #[tokio::test]
    async fn failed_deletion_is_reported_and_never_blocks_the_rest() {
        let mut api = MockBookingApi::new();
        api.expect_delete_booking()
            .withf(|_, id| *id == 77)
            .times(1)
            .returning(|_, _| Err(AvailabilityServiceError::Backend("in use".into())));
        api.expect_delete_booking()
            .withf(|_, id| *id == 78)
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_replace_unavailable_ranges()
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_refresh(
            &mut api,
            "2025-04-18",
            vec![confirmed_booking(77, "2025-04-18", "09:00", "13:00")],
        );

        let plan = SavePlan {
            edits: Vec::new(),
            deletions: vec![77, 78],
            unavailable: Vec::new(),
            continue_on_error: false,
        };

        let report = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap();
        assert_eq!(report.restored_booking_ids, vec![77]);
        // The failed deletion's booking is back in the refreshed schedule.
        let schedule = report.schedule.unwrap();
        assert!(schedule.iter().any(|s| s.booking_id == Some(77)));
    }

    #[tokio::test]
    async fn empty_unavailable_set_is_still_submitted() {
        let mut api = MockBookingApi::new();
        api.expect_replace_unavailable_ranges()
            .withf(|_, _, ranges| ranges.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(()));
        expect_refresh(&mut api, "2025-04-18", Vec::new());

        let plan = SavePlan {
            edits: Vec::new(),
            deletions: Vec::new(),
            unavailable: Vec::new(),
            continue_on_error: false,
        };

        let report = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap();
        assert!(
            report
                .steps
                .iter()
                .any(|s| s.action == SaveAction::ReplaceUnavailable && s.success)
        );
    }

    #[tokio::test]
    async fn overlapping_unavailable_set_is_rejected_before_any_call() {
        let api = MockBookingApi::new();
        let plan = SavePlan {
            edits: Vec::new(),
            deletions: Vec::new(),
            unavailable: vec![
                UnavailableRange::new(
                    date("2025-04-18"),
                    TimeRange::new(t("18:00"), t("20:00")).unwrap(),
                ),
                UnavailableRange::new(
                    date("2025-04-18"),
                    TimeRange::new(t("19:00"), t("21:00")).unwrap(),
                ),
            ],
            continue_on_error: false,
        };

        let err = service(api)
            .save_day(&token(), date("2025-04-18"), plan)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_booking_requires_gcash_number_for_gcash() {
        let api = MockBookingApi::new();
        let mut request = manual_request("2025-04-18", "09:00", "13:00");
        request.payment_method = PaymentMethod::Gcash;
        request.gcash_number = None;

        let err = service(api)
            .create_manual_booking(&token(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn manual_booking_conflict_requires_confirmation() {
        let mut api = MockBookingApi::new();
        expect_refresh(
            &mut api,
            "2025-04-18",
            vec![confirmed_booking(42, "2025-04-18", "09:00", "13:00")],
        );

        let request = manual_request("2025-04-18", "10:00", "14:00");
        let err = service(api)
            .create_manual_booking(&token(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn confirmed_conflict_proceeds_and_maps_payment_type() {
        let mut api = MockBookingApi::new();
        expect_refresh(
            &mut api,
            "2025-04-18",
            vec![confirmed_booking(42, "2025-04-18", "09:00", "13:00")],
        );
        api.expect_create_manual_booking()
            .withf(|_, payload| {
                payload.payment_type == PaymentType::Downpayment
                    && payload.booking_reference.starts_with("BK")
                    && payload.booking_time_start == t("10:00")
                    && payload.booking_hours == 4
            })
            .times(1)
            .returning(|_, payload| {
                Ok(Booking {
                    booking_id: 99,
                    booking_reference: payload.booking_reference.clone(),
                    booking_date: payload.booking_date,
                    booking_time_start: payload.booking_time_start,
                    booking_time_end: payload.booking_time_end,
                    booking_status: BookingStatus::Confirmed,
                    guest_name: payload.guest_name.clone(),
                    guest_email: None,
                    guest_phone: Some(payload.guest_phone.clone()),
                    location: payload.location.clone(),
                    category_name: payload.category_name.clone(),
                    package_name: payload.package_name.clone(),
                    package_price: Some(payload.package_price),
                    special_requests: None,
                    payment_type: Some(payload.payment_type),
                    payment_method: Some(payload.payment_method),
                    gcash_number: None,
                    amount: Some(payload.amount),
                    admin_notes: None,
                    created_at: None,
                })
            });

        let mut request = manual_request("2025-04-18", "10:00", "14:00");
        request.confirm_conflict = true;

        let outcome = service(api)
            .create_manual_booking(&token(), request)
            .await
            .unwrap();
        assert_eq!(outcome.booking.booking_id, 99);
        assert!(outcome.schedule.is_some());
    }

    #[tokio::test]
    async fn short_manual_booking_carries_a_warning() {
        let mut api = MockBookingApi::new();
        expect_refresh(&mut api, "2025-04-18", Vec::new());
        api.expect_create_manual_booking()
            .returning(|_, payload| {
                Ok(confirmed_booking(
                    99,
                    "2025-04-18",
                    &payload.booking_time_start.format_24(),
                    &payload.booking_time_end.format_24(),
                ))
            });

        let request = manual_request("2025-04-18", "09:00", "10:00");
        let outcome = service(api)
            .create_manual_booking(&token(), request)
            .await
            .unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("below the usual minimum"));
    }

    #[tokio::test]
    async fn backend_business_error_is_surfaced_verbatim() {
        let mut api = MockBookingApi::new();
        expect_refresh(&mut api, "2025-04-18", Vec::new());
        api.expect_create_manual_booking().returning(|_, _| {
            Err(AvailabilityServiceError::Backend(
                "Guest already has a booking that day".into(),
            ))
        });

        let request = manual_request("2025-04-18", "09:00", "13:00");
        let err = service(api)
            .create_manual_booking(&token(), request)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Booking backend error: Guest already has a booking that day"
        );
    }

    #[tokio::test]
    async fn day_schedule_seeds_empty_days() {
        let mut api = MockBookingApi::new();
        expect_refresh(&mut api, "2025-04-19", Vec::new());

        let day = service(api)
            .day_schedule(&token(), date("2025-04-19"))
            .await
            .unwrap();
        assert_eq!(day.slots().len(), 1);
        assert_eq!(day.slots()[0].status, SlotStatus::Available);
    }

    #[test]
    fn base36_encodes_upper() {
        assert_eq!(base36_upper(0), "0");
        assert_eq!(base36_upper(35), "Z");
        assert_eq!(base36_upper(36), "10");
        assert_eq!(base36_upper(46_655), "ZZZ");
    }
}
