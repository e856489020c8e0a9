use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::{responses::ApiResponse, time::DateKey};
use utoipa::IntoParams;

use crate::{
    api::state::AvailabilityAppState, domain::resolver::SlotProposal,
    error::AvailabilityServiceError,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Package duration in whole hours.
    pub duration_hours: u16,
}

#[utoipa::path(
    get,
    path = "/api/v1/availability/{date}",
    tag = "Availability",
    operation_id = "get_availability",
    params(
        ("date" = String, Path, description = "Target date (YYYY-MM-DD)"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Every candidate window, conflicting ones flagged", body = ApiResponse<Vec<SlotProposal>>),
        (status = 400, description = "Malformed date or duration"),
        (status = 502, description = "Booked slots could not be fetched")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_availability(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(date): Path<DateKey>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<Vec<SlotProposal>>>, AvailabilityServiceError> {
    let proposals = state
        .scheduling_service
        .availability(date, query.duration_hours)
        .await?;
    Ok(Json(ApiResponse::ok(proposals)))
}
