//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Bill errors
/// - 5xxx: Connection errors
/// - 6xxx: Consumer errors
/// - 7xxx: Settings errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Bill errors (4xxx)
    Bill,
    /// Connection errors (5xxx)
    Connection,
    /// Consumer errors (6xxx)
    Consumer,
    /// Settings errors (7xxx)
    Settings,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Bill,
            5000..6000 => Self::Connection,
            6000..7000 => Self::Consumer,
            7000..8000 => Self::Settings,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Bill => "bill",
            Self::Connection => "connection",
            Self::Consumer => "consumer",
            Self::Settings => "settings",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Bill);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Connection);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Consumer);
        assert_eq!(ErrorCategory::from_code(7003), ErrorCategory::Settings);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::BillNotFound.category(), ErrorCategory::Bill);
        assert_eq!(
            ErrorCode::MeterNumberExists.category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            ErrorCode::ConsumerEmailExists.category(),
            ErrorCategory::Consumer
        );
        assert_eq!(
            ErrorCode::SettingKeyInvalid.category(),
            ErrorCategory::Settings
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Bill).unwrap();
        assert_eq!(json, "\"bill\"");
        let category: ErrorCategory = serde_json::from_str("\"settings\"").unwrap();
        assert_eq!(category, ErrorCategory::Settings);
    }
}
