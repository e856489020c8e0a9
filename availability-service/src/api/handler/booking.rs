use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use shared::{
    responses::ApiResponse,
    types::{Booking, BookingDetails},
};
use utoipa::ToSchema;

use crate::{
    api::{bearer_token, state::AvailabilityAppState},
    domain::service::{ManualBookingOutcome, ManualBookingRequest},
    error::AvailabilityServiceError,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/bookings/manual",
    tag = "Bookings",
    operation_id = "create_manual_booking",
    security(("bearer_auth" = [])),
    request_body = ManualBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<ManualBookingOutcome>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing bearer token"),
        (status = 409, description = "Range conflicts and confirmConflict was not set"),
        (status = 502, description = "Booking backend rejected the request")
    )
)]
#[tracing::instrument(skip(state, headers, request))]
pub async fn create_manual_booking(
    State(state): State<Arc<AvailabilityAppState>>,
    headers: HeaderMap,
    Json(request): Json<ManualBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ManualBookingOutcome>>), AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    let outcome = state
        .scheduling_service
        .create_manual_booking(&token, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings/pending",
    tag = "Bookings",
    operation_id = "list_pending_bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookings awaiting approval", body = ApiResponse<Vec<Booking>>),
        (status = 401, description = "Missing bearer token")
    )
)]
#[tracing::instrument(skip(state, headers))]
pub async fn list_pending(
    State(state): State<Arc<AvailabilityAppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    let bookings = state.scheduling_service.pending_bookings(&token).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/bookings/{id}/approve",
    tag = "Bookings",
    operation_id = "approve_booking",
    params(("id" = i64, Path, description = "Booking ID")),
    security(("bearer_auth" = [])),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Booking approved"),
        (status = 401, description = "Missing bearer token"),
        (status = 502, description = "Booking backend rejected the request")
    )
)]
#[tracing::instrument(skip(state, headers, request))]
pub async fn approve(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<ApiResponse<()>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    state
        .scheduling_service
        .approve_booking(&token, id, request.admin_notes)
        .await?;
    Ok(Json(ApiResponse::ok(())))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/bookings/{id}/reject",
    tag = "Bookings",
    operation_id = "reject_booking",
    params(("id" = i64, Path, description = "Booking ID")),
    security(("bearer_auth" = [])),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Booking rejected"),
        (status = 401, description = "Missing bearer token"),
        (status = 502, description = "Booking backend rejected the request")
    )
)]
#[tracing::instrument(skip(state, headers, request))]
pub async fn reject(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApiResponse<()>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    state
        .scheduling_service
        .reject_booking(&token, id, request.reason)
        .await?;
    Ok(Json(ApiResponse::ok(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings/{id}/details",
    tag = "Bookings",
    operation_id = "get_booking_details",
    params(("id" = i64, Path, description = "Booking ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking with payment record", body = ApiResponse<BookingDetails>),
        (status = 401, description = "Missing bearer token"),
        (status = 404, description = "Booking not found")
    )
)]
#[tracing::instrument(skip(state, headers))]
pub async fn details(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<BookingDetails>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    let details = state.scheduling_service.booking_details(&token, id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/bookings/{id}",
    tag = "Bookings",
    operation_id = "delete_booking",
    params(("id" = i64, Path, description = "Booking ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Booking deleted"),
        (status = 401, description = "Missing bearer token"),
        (status = 502, description = "Booking backend rejected the request")
    )
)]
#[tracing::instrument(skip(state, headers))]
pub async fn delete(
    State(state): State<Arc<AvailabilityAppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, AvailabilityServiceError> {
    let token = bearer_token(&headers)?;
    state.scheduling_service.delete_booking(&token, id).await?;
    Ok(Json(ApiResponse::ok(())))
}
