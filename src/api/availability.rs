//! Availability Client
//!
//! Fetches the service list and the calendar of bookable dates. The
//! response is a one-shot snapshot; there is no caching beyond the value
//! the caller keeps.

use super::types::BookingSnapshot;
use super::{AvailabilityProvider, build_http_client, endpoint};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const PUBLIC_BOOKING_PATH: &str = "/appointment/public";

const DATES_FIELD: &str = "availableDates";

/// The deployed server wraps the snapshot in `{"data": ...}`; a bare
/// snapshot is accepted too. Either way the calendar must be present, so
/// an error envelope or a broken snapshot is a fetch failure rather than
/// an empty calendar.
fn parse_snapshot(mut body: Value) -> Result<BookingSnapshot> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    let snapshot = if body.get("data").is_some() {
        body["data"].take()
    } else {
        body
    };

    if snapshot.get(DATES_FIELD).is_none() {
        let reason = message.unwrap_or_else(|| format!("response has no {}", DATES_FIELD));
        return Err(BookingError::Fetch(reason));
    }

    serde_json::from_value(snapshot)
        .map_err(|e| BookingError::Fetch(format!("failed to parse booking data: {}", e)))
}

pub struct AvailabilityClient {
    http: Client,
    url: String,
}

impl AvailabilityClient {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self> {
        Ok(Self::with_client(build_http_client(timeout_secs)?, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: endpoint(base_url, PUBLIC_BOOKING_PATH),
        }
    }
}

#[async_trait]
impl AvailabilityProvider for AvailabilityClient {
    async fn fetch_booking_data(&self) -> Result<BookingSnapshot> {
        tracing::debug!("Fetching booking data from {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BookingError::Fetch(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Booking data request returned {}: {}", status, body);
            return Err(BookingError::Fetch(format!("server returned {}", status)));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| BookingError::Fetch(format!("failed to parse booking data: {}", e)))?;
        let snapshot = parse_snapshot(body)?;

        tracing::info!(
            "Loaded {} services and {} dates ({} bookable)",
            snapshot.services.len(),
            snapshot.available_dates.len(),
            snapshot.bookable_dates().count()
        );

        Ok(snapshot)
    }
}
