use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::responses::ApiResponse;
use thiserror::Error;

/// Application-level errors for the availability service.
///
/// Each variant maps to an HTTP status code via the [`IntoResponse`] implementation.
#[derive(Debug, Error)]
pub enum AvailabilityServiceError {
    /// Requested resource was not found.
    #[error("Not Found: {0}")]
    NotFound(String),

    /// Client sent an invalid request.
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// A required field failed validation before any network call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested range collides with a booked or unavailable slot and the
    /// caller has not confirmed the override.
    #[error("Schedule conflict: {0}")]
    Conflict(String),

    /// Admin call attempted without a bearer token.
    #[error("Not authenticated: admin token is required")]
    NotAuthenticated,

    /// The bookings backend answered with a business error; the message is
    /// its own, verbatim.
    #[error("Booking backend error: {0}")]
    Backend(String),

    /// The bookings backend could not be reached at all.
    #[error("Booking backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Unexpected internal failure.
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl IntoResponse for AvailabilityServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::BackendUnavailable(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Server error");
        } else {
            tracing::warn!(error = %self, %status, "Client error");
        }

        let body = ApiResponse::<()>::err(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
