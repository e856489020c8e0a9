use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard JSON response envelope for this service's own endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a success response wrapping the given data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates an error response with the given message.
    pub fn err(error_msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error_msg.into()),
        }
    }
}

/// Envelope the bookings backend wraps every response in
/// (`{message, data, statusCode, success}`).
///
/// `message` carries the verbatim business error when `success` is false and
/// must be surfaced as-is, never swallowed.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct BackendEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<u16>,
}

impl<T: serde::de::DeserializeOwned> BackendEnvelope<T> {
    /// Unwraps the payload, turning `success:false` into the backend's own
    /// message so callers can propagate it verbatim.
    pub fn into_data(self) -> Result<T, String> {
        if !self.success {
            return Err(self
                .message
                .unwrap_or_else(|| "Backend reported failure without a message".to_string()));
        }
        self.data
            .ok_or_else(|| "Backend response carried no data".to_string())
    }
}

/// Response for the `/headpat` health check endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeadpatResponse {
    pub message: &'static str,
}
