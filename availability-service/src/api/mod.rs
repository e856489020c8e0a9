use axum::http::{HeaderMap, header};
use shared::types::AdminToken;

use crate::error::AvailabilityServiceError;

pub mod handler;
pub mod state;

/// Pulls the admin bearer token out of the request headers. A missing or
/// malformed token short-circuits before any backend call is fired.
pub fn bearer_token(headers: &HeaderMap) -> Result<AdminToken, AvailabilityServiceError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AvailabilityServiceError::NotAuthenticated)?
        .to_str()
        .map_err(|_| AvailabilityServiceError::NotAuthenticated)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AvailabilityServiceError::NotAuthenticated)?;
    Ok(AdminToken::new(token))
}
