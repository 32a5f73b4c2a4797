use chrono::NaiveDate;
use thiserror::Error;

/// Failure to turn a single recurring definition into an event.
///
/// These are always local to one definition: callers record them next to
/// the definition and carry on with the rest of the batch.
#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Unrecognized schedule: '{0}'")]
    UnrecognizedSchedule(String),

    #[error("Unknown season: '{0}'")]
    UnknownSeason(String),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u8),

    #[error("No valid anchor for '{recurrence}' between {start} and {end}")]
    NoValidAnchor {
        recurrence: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid generation window: {start} is after {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Unknown timezone: '{0}'")]
    UnknownTimezone(String),

    #[error("Invalid start time: '{0}' (expected HH:MM)")]
    InvalidStartTime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(#[from] calripper_rfc::error::RfcError),
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RecurrenceError(#[from] RecurrenceError),

    #[error("Source loading error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
