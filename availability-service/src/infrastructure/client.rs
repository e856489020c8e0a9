use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::global;
use opentelemetry::propagation::Injector;
use reqwest::{Client, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::responses::BackendEnvelope;
use shared::time::{DateKey, WallTime};
use shared::types::{
    AdminToken, BookedSlot, Booking, BookingDetails, ManualBookingPayload, UnavailableRange,
};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::domain::client::BookingApi;
use crate::error::AvailabilityServiceError;

/// HTTP client for the bookings backend, with read retries and OpenTelemetry
/// trace propagation. Mutations are sent exactly once; retrying them would
/// double-apply deletes and creates.
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
}

/// Maximum number of retry attempts for transient failures on reads.
const MAX_RETRIES: u32 = 3;
/// Per-request timeout applied to the underlying HTTP client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpBookingApi {
    /// Builds an HTTP client with the configured timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (invalid TLS configuration).
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, base_url }
    }

    fn headers(token: Option<&AdminToken>) -> Result<header::HeaderMap, AvailabilityServiceError> {
        let mut headers = header::HeaderMap::new();
        let cx = tracing::Span::current().context();
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut HeaderMapInjector(&mut headers));
        });
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| {
                    AvailabilityServiceError::Validation(
                        "Admin token contains invalid header characters".to_string(),
                    )
                })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// GET with retry and backoff. Once the backend answers at all, the
    /// response is final; only transport failures are retried.
    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&AdminToken>,
    ) -> Result<T, AvailabilityServiceError> {
        let mut last_err = None;

        for attempt in 1..=MAX_RETRIES {
            let headers = Self::headers(token)?;
            match self.client.get(url).headers(headers).send().await {
                Ok(res) => {
                    tracing::debug!(status = %res.status(), attempt, %url, "Booking backend responded");
                    return Self::read_envelope(res).await;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_retries = MAX_RETRIES,
                        error = %e,
                        %url,
                        "Request to booking backend failed, retrying"
                    );
                    last_err = Some(e);
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(100 * 2u64.pow(attempt - 1)))
                            .await;
                    }
                }
            }
        }

        let last_err = last_err.expect("at least one error occurred");
        Err(AvailabilityServiceError::BackendUnavailable(format!(
            "Failed to reach booking backend after {MAX_RETRIES} attempts: {last_err}"
        )))
    }

    /// Single-attempt mutation whose payload matters, e.g. the created booking.
    async fn mutate_enveloped<T: DeserializeOwned, B: Serialize>(
        &self,
        request: reqwest::RequestBuilder,
        token: &AdminToken,
        body: &B,
    ) -> Result<T, AvailabilityServiceError> {
        let headers = Self::headers(Some(token))?;
        let res = request
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AvailabilityServiceError::BackendUnavailable(format!(
                    "Failed to reach booking backend: {e}"
                ))
            })?;
        Self::read_envelope(res).await
    }

    /// Single-attempt mutation where only the success flag matters.
    async fn mutate_expect_success<B: Serialize>(
        &self,
        request: reqwest::RequestBuilder,
        token: &AdminToken,
        body: Option<&B>,
    ) -> Result<(), AvailabilityServiceError> {
        let headers = Self::headers(Some(token))?;
        let mut request = request.headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        let res = request.send().await.map_err(|e| {
            AvailabilityServiceError::BackendUnavailable(format!(
                "Failed to reach booking backend: {e}"
            ))
        })?;

        let status = res.status();
        let envelope = res
            .json::<BackendEnvelope<serde_json::Value>>()
            .await
            .map_err(|e| Self::parse_failure(status, e))?;
        if envelope.success {
            Ok(())
        } else {
            Err(AvailabilityServiceError::Backend(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Booking backend returned status {status}")),
            ))
        }
    }

    async fn read_envelope<T: DeserializeOwned>(
        res: reqwest::Response,
    ) -> Result<T, AvailabilityServiceError> {
        let status = res.status();
        let envelope = res
            .json::<BackendEnvelope<T>>()
            .await
            .map_err(|e| Self::parse_failure(status, e))?;
        envelope.into_data().map_err(AvailabilityServiceError::Backend)
    }

    fn parse_failure(status: reqwest::StatusCode, e: reqwest::Error) -> AvailabilityServiceError {
        if status.is_success() {
            AvailabilityServiceError::Backend(format!("Failed to deserialize response: {e}"))
        } else {
            AvailabilityServiceError::Backend(format!("Booking backend returned status {status}"))
        }
    }
}

/// Adapter to inject OpenTelemetry trace context into HTTP request headers.
struct HeaderMapInjector<'a>(&'a mut header::HeaderMap);

impl Injector for HeaderMapInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(name) = header::HeaderName::from_bytes(key.as_bytes())
            && let Ok(val) = header::HeaderValue::from_str(&value)
        {
            self.0.insert(name, val);
        }
    }
}

// region: Wire payloads

#[derive(serde::Deserialize)]
struct BookingsPayload {
    #[serde(default)]
    bookings: Vec<Booking>,
}

#[derive(serde::Deserialize)]
struct BookedSlotsPayload {
    #[serde(default)]
    bookings: Vec<BookedSlot>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnavailablePayload {
    #[serde(default)]
    unavailable_ranges: Vec<UnavailableRange>,
}

#[derive(serde::Deserialize)]
struct CreatedBookingPayload {
    booking: Booking,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceUnavailableBody<'a> {
    date: DateKey,
    unavailable_ranges: &'a [UnavailableRange],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeRangeUpdateBody {
    booking_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<WallTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<WallTime>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_notes: Option<String>,
}

#[derive(Serialize)]
struct RejectBody {
    reason: String,
}

// endregion: Wire payloads

#[async_trait]
impl BookingApi for HttpBookingApi {
    #[tracing::instrument(skip(self, token))]
    async fn month_bookings(
        &self,
        token: &AdminToken,
        year: i32,
        month: u32,
    ) -> Result<Vec<Booking>, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/calendar/month/{year}/{month}");
        let payload: BookingsPayload = self.get_enveloped(&url, Some(token)).await?;
        Ok(payload.bookings)
    }

    #[tracing::instrument(skip(self))]
    async fn booked_slots(&self) -> Result<Vec<BookedSlot>, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/booked-slots");
        let payload: BookedSlotsPayload = self.get_enveloped(&url, None).await?;
        Ok(payload.bookings)
    }

    #[tracing::instrument(skip(self, token))]
    async fn unavailable_ranges(
        &self,
        token: &AdminToken,
        date: DateKey,
    ) -> Result<Vec<UnavailableRange>, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/schedules/unavailable/{date}");
        let payload: UnavailablePayload = self.get_enveloped(&url, Some(token)).await?;
        Ok(payload.unavailable_ranges)
    }

    #[tracing::instrument(skip(self, token, ranges), fields(count = ranges.len()))]
    async fn replace_unavailable_ranges(
        &self,
        token: &AdminToken,
        date: DateKey,
        ranges: &[UnavailableRange],
    ) -> Result<(), AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/schedules/unavailable");
        let body = ReplaceUnavailableBody {
            date,
            unavailable_ranges: ranges,
        };
        self.mutate_expect_success(self.client.post(&url), token, Some(&body))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn update_booking_time(
        &self,
        token: &AdminToken,
        booking_id: i64,
        start_time: Option<WallTime>,
        end_time: Option<WallTime>,
    ) -> Result<(), AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/{booking_id}/time-range");
        let body = TimeRangeUpdateBody {
            booking_id,
            start_time,
            end_time,
        };
        self.mutate_expect_success(self.client.put(&url), token, Some(&body))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<(), AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/{booking_id}");
        self.mutate_expect_success::<()>(self.client.delete(&url), token, None)
            .await
    }

    #[tracing::instrument(skip(self, token, payload))]
    async fn create_manual_booking(
        &self,
        token: &AdminToken,
        payload: &ManualBookingPayload,
    ) -> Result<Booking, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/manual");
        let created: CreatedBookingPayload = self
            .mutate_enveloped(self.client.post(&url), token, payload)
            .await?;
        Ok(created.booking)
    }

    #[tracing::instrument(skip(self, token))]
    async fn pending_bookings(
        &self,
        token: &AdminToken,
    ) -> Result<Vec<Booking>, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/pending");
        let payload: BookingsPayload = self.get_enveloped(&url, Some(token)).await?;
        Ok(payload.bookings)
    }

    #[tracing::instrument(skip(self, token, admin_notes))]
    async fn approve_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        admin_notes: Option<String>,
    ) -> Result<(), AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/{booking_id}/approve");
        let body = ApproveBody { admin_notes };
        self.mutate_expect_success(self.client.put(&url), token, Some(&body))
            .await
    }

    #[tracing::instrument(skip(self, token, reason))]
    async fn reject_booking(
        &self,
        token: &AdminToken,
        booking_id: i64,
        reason: String,
    ) -> Result<(), AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/{booking_id}/reject");
        let body = RejectBody { reason };
        self.mutate_expect_success(self.client.put(&url), token, Some(&body))
            .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn booking_details(
        &self,
        token: &AdminToken,
        booking_id: i64,
    ) -> Result<BookingDetails, AvailabilityServiceError> {
        let base_url = &self.base_url;
        let url = format!("{base_url}/api/bookings/{booking_id}/details");
        self.get_enveloped(&url, Some(token)).await
    }
}
