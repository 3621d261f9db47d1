//! Billing error types

use shared::error::{AppError, ErrorCode};
use shared::models::BillStatus;
use thiserror::Error;

use super::money;
use crate::db::repository::RepoError;
use crate::utils::time::DateParseError;

/// Coarse classification shared by billing and settings errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    Storage,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    UnknownKey(String),

    #[error("{0}")]
    ValueOutOfRange(String),

    #[error("months must be between 1 and {max}, got {got}")]
    MonthsOutOfRange { got: u32, max: u32 },

    #[error(transparent)]
    InvalidDate(#[from] DateParseError),

    #[error("Settings storage error: {0}")]
    Storage(#[from] RepoError),
}

impl SettingsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Storage,
            _ => ErrorKind::InvalidInput,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownKey(_) => ErrorCode::SettingKeyInvalid,
            Self::ValueOutOfRange(_) => ErrorCode::SettingValueOutOfRange,
            Self::MonthsOutOfRange { .. } => ErrorCode::SettingHistoryRangeInvalid,
            Self::InvalidDate(_) => ErrorCode::InvalidFormat,
            Self::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            SettingsError::MonthsOutOfRange { got, max } => {
                app.with_detail("months", got).with_detail("max", max)
            }
            SettingsError::InvalidDate(e) => app.with_detail("input", e.input),
            _ => app,
        }
    }
}

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Bill {0} not found")]
    BillNotFound(i64),

    #[error("Connection {0} not found")]
    ConnectionNotFound(i64),

    #[error("A bill for this month already exists")]
    DuplicateMonth { connection_id: i64, month_of: i64 },

    #[error("Meter reading cannot be lower than previous reading ({previous})")]
    ReadingDecreased { previous: f64, reading: f64 },

    #[error("Meter reading must be a finite number between 0 and {max}, got {0}", max = money::MAX_METER_READING)]
    InvalidReading(f64),

    #[error("Amount for {consumed} m³ at {rate} per m³ is out of range")]
    ChargeOutOfRange { consumed: f64, rate: f64 },

    #[error("{0}")]
    InvalidStatus(String),

    #[error("Bill status cannot change from {from} to {to}")]
    TransitionDenied { from: BillStatus, to: BillStatus },

    #[error("Meter reading can only be changed on the most recent bill of a connection")]
    ReadingLocked { bill_id: i64, latest_bill_id: i64 },

    #[error("Invalid {field}: {source}")]
    InvalidDate {
        field: &'static str,
        source: DateParseError,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Billing storage error: {0}")]
    Storage(#[from] RepoError),
}

impl BillingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BillNotFound(_) | Self::ConnectionNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateMonth { .. } => ErrorKind::Conflict,
            Self::ReadingDecreased { .. }
            | Self::InvalidReading(_)
            | Self::ChargeOutOfRange { .. }
            | Self::InvalidStatus(_)
            | Self::TransitionDenied { .. }
            | Self::ReadingLocked { .. }
            | Self::InvalidDate { .. } => ErrorKind::InvalidInput,
            Self::Settings(e) => e.kind(),
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BillNotFound(_) => ErrorCode::BillNotFound,
            Self::ConnectionNotFound(_) => ErrorCode::ConnectionNotFound,
            Self::DuplicateMonth { .. } => ErrorCode::BillAlreadyExists,
            Self::ReadingDecreased { .. } => ErrorCode::MeterReadingDecreased,
            Self::InvalidReading(_) => ErrorCode::MeterReadingInvalid,
            Self::ChargeOutOfRange { .. } => ErrorCode::ValueOutOfRange,
            Self::InvalidStatus(_) => ErrorCode::BillStatusInvalid,
            Self::TransitionDenied { .. } => ErrorCode::BillStatusTransitionDenied,
            Self::ReadingLocked { .. } => ErrorCode::BillReadingLocked,
            Self::InvalidDate { .. } => ErrorCode::BillDateInvalid,
            Self::Settings(e) => e.code(),
            Self::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        if let BillingError::Settings(inner) = err {
            return inner.into();
        }
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            BillingError::BillNotFound(id) => app.with_detail("bill_id", id),
            BillingError::ConnectionNotFound(id) => app.with_detail("connection_id", id),
            BillingError::DuplicateMonth {
                connection_id,
                month_of,
            } => app
                .with_detail("connection_id", connection_id)
                .with_detail("month_of", month_of),
            BillingError::ReadingDecreased { previous, reading } => app
                .with_detail("previous_reading", previous)
                .with_detail("meter_reading", reading),
            BillingError::ChargeOutOfRange { consumed, rate } => app
                .with_detail("consumed_units", consumed)
                .with_detail("charge_per_cubic_meter", rate),
            BillingError::TransitionDenied { from, to } => app
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            BillingError::ReadingLocked { latest_bill_id, .. } => {
                app.with_detail("latest_bill_id", latest_bill_id)
            }
            BillingError::InvalidDate { field, source } => app
                .with_detail("field", field)
                .with_detail("input", source.input),
            _ => app,
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_kinds_map_to_http_statuses() {
        let cases: Vec<(BillingError, ErrorKind, StatusCode)> = vec![
            (BillingError::BillNotFound(1), ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (
                BillingError::DuplicateMonth {
                    connection_id: 1,
                    month_of: 0,
                },
                ErrorKind::Conflict,
                StatusCode::CONFLICT,
            ),
            (
                BillingError::ReadingDecreased {
                    previous: 120.0,
                    reading: 100.0,
                },
                ErrorKind::InvalidInput,
                StatusCode::BAD_REQUEST,
            ),
            (
                BillingError::Storage(RepoError::Database("disk I/O error".into())),
                ErrorKind::Storage,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            let app: AppError = err.into();
            assert_eq!(app.http_status(), status);
        }
    }

    #[test]
    fn test_settings_error_passes_through_billing() {
        let err = BillingError::from(SettingsError::UnknownKey("nope".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::SettingKeyInvalid);
    }

    #[test]
    fn test_reading_decreased_carries_previous_reading() {
        let app: AppError = BillingError::ReadingDecreased {
            previous: 120.0,
            reading: 100.0,
        }
        .into();
        let details = app.details.unwrap();
        assert_eq!(details["previous_reading"], serde_json::json!(120.0));
    }
}
