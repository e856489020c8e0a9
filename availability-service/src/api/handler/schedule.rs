use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use shared::{responses::ApiResponse, time::DateKey};
use utoipa::ToSchema;

use crate::{
    api::{bearer_token, state::AvailabilityAppState},
    domain::{
        service::{SavePlan, SaveReport},
        slot::ScheduleSlot,
    },
    error::AvailabilityServiceError,
};

/// The merged day view the editor works on.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayScheduleResponse {
    #[schema(value_type = String, example = "2025-04-18")]
    pub date: DateKey,
    pub slots: Vec<ScheduleSlot>,
    /// True while unavailable blocks still collide with other slots; the
    /// caller should refuse to save until resolved.
    pub has_blocking_conflicts: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/schedule/{date}",
    tag = "Schedule",
    operation_id = "get_day_schedule",
    params(
        ("date" = String, Path, description = "Target date (YYYY-MM-DD)")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Merged slot list for the day", body = ApiResponse<DayScheduleResponse>),
        (status = 401, description = "Missing bearer token"),
        (status = 502, description = "Booking backend failed")
    )
)]
#[tracing::instrument(skip(state, headers))]
pub async fn get_day_schedule(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(date): Path<DateKey>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DayScheduleResponse>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    let day = state.scheduling_service.day_schedule(&token, date).await?;
    let response = DayScheduleResponse {
        date: day.date(),
        has_blocking_conflicts: day.has_blocking_conflicts(),
        slots: day.slots().to_vec(),
    };
    Ok(Json(ApiResponse::ok(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/schedule/{date}/save",
    tag = "Schedule",
    operation_id = "save_day_schedule",
    params(
        ("date" = String, Path, description = "Target date (YYYY-MM-DD)")
    ),
    security(("bearer_auth" = [])),
    request_body = SavePlan,
    responses(
        (status = 200, description = "Per-step commit report, partial failures included", body = ApiResponse<SaveReport>),
        (status = 400, description = "Plan contains unresolved conflicts"),
        (status = 401, description = "Missing bearer token")
    )
)]
#[tracing::instrument(skip(state, headers, plan))]
pub async fn save_day_schedule(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(date): Path<DateKey>,
    headers: HeaderMap,
    Json(plan): Json<SavePlan>,
) -> Result<Json<ApiResponse<SaveReport>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    let report = state.scheduling_service.save_day(&token, date, plan).await?;
    Ok(Json(ApiResponse::ok(report)))
}
