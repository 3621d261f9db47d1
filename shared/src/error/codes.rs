//! Unified error codes for the utility back office
//!
//! This module defines all error codes returned by the utility server.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Bill errors
//! - 5xxx: Connection errors
//! - 6xxx: Consumer errors
//! - 7xxx: Settings errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Bill ====================
    /// Bill not found
    BillNotFound = 4001,
    /// A bill for this connection and month already exists
    BillAlreadyExists = 4002,
    /// Meter reading is lower than the previous reading
    MeterReadingDecreased = 4003,
    /// Meter reading is negative or not a finite number
    MeterReadingInvalid = 4004,
    /// Unknown bill status
    BillStatusInvalid = 4005,
    /// Status transition rejected by the configured policy
    BillStatusTransitionDenied = 4006,
    /// Only the most recent bill of a connection may change its reading
    BillReadingLocked = 4007,
    /// Billing month or due date could not be parsed
    BillDateInvalid = 4008,

    // ==================== 5xxx: Connection ====================
    /// Connection not found
    ConnectionNotFound = 5001,
    /// Meter number already registered
    MeterNumberExists = 5002,

    // ==================== 6xxx: Consumer ====================
    /// Consumer not found
    ConsumerNotFound = 6001,
    /// Consumer email already registered
    ConsumerEmailExists = 6002,

    // ==================== 7xxx: Settings ====================
    /// Unknown settings key
    SettingKeyInvalid = 7001,
    /// Settings value outside the range accepted for its key
    SettingValueOutOfRange = 7002,
    /// History window outside the accepted range
    SettingHistoryRangeInvalid = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Bill
            ErrorCode::BillNotFound => "Bill not found",
            ErrorCode::BillAlreadyExists => "A bill for this month already exists",
            ErrorCode::MeterReadingDecreased => {
                "Meter reading cannot be lower than previous reading"
            }
            ErrorCode::MeterReadingInvalid => "Meter reading must be a non-negative number",
            ErrorCode::BillStatusInvalid => "Invalid bill status",
            ErrorCode::BillStatusTransitionDenied => "Bill status transition is not permitted",
            ErrorCode::BillReadingLocked => {
                "Only the most recent bill of a connection can change its reading"
            }
            ErrorCode::BillDateInvalid => "Invalid billing date",

            // Connection
            ErrorCode::ConnectionNotFound => "Connection not found",
            ErrorCode::MeterNumberExists => "Meter number already exists",

            // Consumer
            ErrorCode::ConsumerNotFound => "Consumer not found",
            ErrorCode::ConsumerEmailExists => "Consumer email already exists",

            // Settings
            ErrorCode::SettingKeyInvalid => "Unknown settings key",
            ErrorCode::SettingValueOutOfRange => "Settings value is out of range",
            ErrorCode::SettingHistoryRangeInvalid => "History window is out of range",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Bill
            4001 => Ok(ErrorCode::BillNotFound),
            4002 => Ok(ErrorCode::BillAlreadyExists),
            4003 => Ok(ErrorCode::MeterReadingDecreased),
            4004 => Ok(ErrorCode::MeterReadingInvalid),
            4005 => Ok(ErrorCode::BillStatusInvalid),
            4006 => Ok(ErrorCode::BillStatusTransitionDenied),
            4007 => Ok(ErrorCode::BillReadingLocked),
            4008 => Ok(ErrorCode::BillDateInvalid),

            // Connection
            5001 => Ok(ErrorCode::ConnectionNotFound),
            5002 => Ok(ErrorCode::MeterNumberExists),

            // Consumer
            6001 => Ok(ErrorCode::ConsumerNotFound),
            6002 => Ok(ErrorCode::ConsumerEmailExists),

            // Settings
            7001 => Ok(ErrorCode::SettingKeyInvalid),
            7002 => Ok(ErrorCode::SettingValueOutOfRange),
            7003 => Ok(ErrorCode::SettingHistoryRangeInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
