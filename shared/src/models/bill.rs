//! Bill Model (账单)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::connection::ConnectionDetail;
use crate::types::DateInput;

/// Bill payment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum BillStatus {
    #[default]
    Unpaid,
    Paid,
    Overdue,
}

impl BillStatus {
    pub const ALL: [BillStatus; 3] = [BillStatus::Unpaid, BillStatus::Paid, BillStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(format!(
                "invalid bill status '{other}', expected one of: unpaid, paid, overdue"
            )),
        }
    }
}

/// Bill entity (one billing month of one connection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: i64,
    pub connection_id: i64,
    /// 账期：当月第一天 00:00:00 UTC (Unix millis)
    pub month_of: i64,
    /// 缴费截止时间 (Unix millis)
    pub due_date: i64,
    /// 累计表读数
    pub meter_reading: f64,
    /// 开单时冻结的单价
    pub charge_per_cubic_meter: f64,
    pub consumed_units: f64,
    pub amount: f64,
    pub status: BillStatus,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create bill payload
///
/// `status` stays a string so an unknown value is reported as a validation
/// error by the billing engine rather than as a JSON rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillCreate {
    pub connection_id: i64,
    pub month_of: DateInput,
    pub due_date: DateInput,
    pub meter_reading: f64,
    #[serde(default)]
    pub status: Option<String>,
}

/// Update bill payload (non-status fields only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillUpdate {
    #[serde(default)]
    pub due_date: Option<DateInput>,
    #[serde(default)]
    pub meter_reading: Option<f64>,
}

/// Update bill status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillStatusUpdate {
    pub status: String,
}

/// Bill populated with its connection and owning consumer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetail {
    #[serde(flatten)]
    pub bill: Bill,
    pub connection: ConnectionDetail,
}

/// Bill list filters (query string)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillQuery {
    pub connection_id: Option<i64>,
    pub consumer_id: Option<i64>,
    pub status: Option<BillStatus>,
    /// Inclusive lower bound on `month_of` (Unix millis)
    pub month_from: Option<i64>,
    /// Inclusive upper bound on `month_of` (Unix millis)
    pub month_to: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
