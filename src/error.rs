//! Error Types
//!
//! Error taxonomy for the booking flow. Every failure the wizard can hit
//! maps onto one of four recoverable categories: the booking data could
//! not be fetched, a local validation check failed, the server rejected
//! the booking, or the draft storage could not be written.

use thiserror::Error;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FetchFailed,
    Validation,
    AttachmentTooLarge,
    SubmissionFailed,
    Storage,
    Config,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchFailed => "fetch_failed",
            Self::Validation => "validation",
            Self::AttachmentTooLarge => "attachment_too_large",
            Self::SubmissionFailed => "submission_failed",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }
}

/// Local validation failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select at least one treatment")]
    NoCoreService,

    #[error("Unknown {kind} '{id}'")]
    UnknownItem { kind: &'static str, id: String },

    #[error("Tick \"Need a removal?\" before adding a removal")]
    RemovalsNotEnabled,

    #[error("Select a date")]
    MissingDate,

    #[error("{0} is not available for booking")]
    DateUnavailable(String),

    #[error("Select a time")]
    MissingTime,

    #[error("{time} is not an available time on {date}")]
    TimeUnavailable { date: String, time: String },

    #[error("Booking data has not been loaded yet")]
    ScheduleNotLoaded,

    #[error("Enter your name")]
    MissingName,

    #[error("Enter your email address")]
    MissingEmail,

    #[error("Enter your phone number")]
    MissingPhone,

    #[error("File size exceeds {limit_mb}MB limit")]
    AttachmentTooLarge { size: usize, limit_mb: usize },

    #[error("Step {0} is not available yet")]
    StepNotVisible(usize),

    #[error("Step {0} is still being processed")]
    TransitionPending(usize),

    #[error("A booking is already being submitted")]
    SubmissionInFlight,
}

/// Storage backend failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode draft entry '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Main error type for the booking library
#[derive(Debug, Error)]
pub enum BookingError {
    /// Booking data (catalog or calendar) could not be fetched.
    #[error("Failed to load booking data: {0}")]
    Fetch(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Server rejected the booking or the request never completed.
    /// The message is shown to the user verbatim.
    #[error("Booking failed: {0}")]
    Submission(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Fetch(_) => ErrorCode::FetchFailed,
            Self::Validation(ValidationError::AttachmentTooLarge { .. }) => {
                ErrorCode::AttachmentTooLarge
            }
            Self::Validation(_) => ErrorCode::Validation,
            Self::Submission(_) => ErrorCode::SubmissionFailed,
            Self::Storage(_) => ErrorCode::Storage,
            Self::Config(_) => ErrorCode::Config,
        }
    }

    /// Whether a manual retry of the same action can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Submission(_))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
