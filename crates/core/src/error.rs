//! Unified error types for calendar and report operations.
//!
//! Error codes:
//! - RANGE_001: Invalid date range
//! - CAL_001-002: Calendar coverage errors
//! - DATA_001-003: Data source errors

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Calendar coverage error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageErrorCode {
    /// CAL_001: Requested range is not covered by the calendar table
    RequestOutsideCalendar,
    /// CAL_002: Order data references dates outside the calendar table
    OrdersOutsideCalendar,
}

impl CoverageErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequestOutsideCalendar => "CAL_001",
            Self::OrdersOutsideCalendar => "CAL_002",
        }
    }
}

/// Data source error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataErrorCode {
    /// DATA_001: Data source unreachable or query failed
    Unavailable,
    /// DATA_002: Data source returned malformed rows
    Malformed,
    /// DATA_003: Failed to write the calendar table
    WriteFailed,
}

impl DataErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "DATA_001",
            Self::Malformed => "DATA_002",
            Self::WriteFailed => "DATA_003",
        }
    }
}

/// Unified error type for calendar and report operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Start date falls after end date.
    #[error("[RANGE_001] start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Calendar does not cover the requested range or the order data.
    #[error("[{code}] {message}")]
    MissingCalendarRange { code: &'static str, message: String },

    /// Underlying data source failed or returned bad data.
    #[error("[{code}] {message}")]
    DataAccess { code: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid range error.
    pub fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidRange { start, end }
    }

    /// Create a calendar coverage error.
    pub fn coverage(code: CoverageErrorCode, msg: impl Into<String>) -> Self {
        Self::MissingCalendarRange {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Create a data access error.
    pub fn data(code: DataErrorCode, msg: impl Into<String>) -> Self {
        Self::DataAccess {
            code: code.code(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidRange { .. } => 2,
            Self::MissingCalendarRange { .. } => 3,
            Self::DataAccess { .. } => 4,
            Self::Config(_) => 1,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRange { .. } => Some("RANGE_001"),
            Self::MissingCalendarRange { code, .. } => Some(code),
            Self::DataAccess { code, .. } => Some(code),
            Self::Config(_) => None,
        }
    }
}
