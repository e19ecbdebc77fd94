//! Booking API Module
//!
//! HTTP clients for the salon's booking server and the traits the wizard
//! talks to, so tests can swap in fakes.

pub mod availability;
pub mod submission;
pub mod types;

pub use availability::AvailabilityClient;
pub use submission::SubmissionClient;
pub use types::{
    Attachment, AvailableDate, BookingPayload, BookingReceipt, BookingRequest, BookingSnapshot,
    ContactMethod, DateType, RemoteService,
};

use crate::config::ApiConfig;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Source of the service catalog and calendar
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    async fn fetch_booking_data(&self) -> Result<BookingSnapshot>;
}

/// Destination for completed bookings
#[async_trait]
pub trait BookingSubmitter: Send + Sync {
    async fn submit(&self, request: &BookingRequest) -> Result<BookingReceipt>;
}

/// Build the shared HTTP client. Without a configured timeout the
/// transport default applies.
pub(crate) fn build_http_client(timeout_secs: Option<u64>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| BookingError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Join the configured base URL with an endpoint path
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Both clients sharing one connection pool
pub fn clients_from_config(config: &ApiConfig) -> Result<(AvailabilityClient, SubmissionClient)> {
    let http = build_http_client(config.timeout_secs)?;
    Ok((
        AvailabilityClient::with_client(http.clone(), &config.base_url),
        SubmissionClient::with_client(http, &config.base_url),
    ))
}
