//! Bill status transitions

use shared::models::BillStatus;
use std::fmt;
use std::str::FromStr;

/// Which status changes `update_bill_status` accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any status may follow any other
    #[default]
    Permissive,
    /// Only unpaid → paid, unpaid → overdue and overdue → paid
    ForwardOnly,
}

impl StatusPolicy {
    /// Same-status updates are always allowed
    pub fn allows(&self, from: BillStatus, to: BillStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            Self::Permissive => true,
            Self::ForwardOnly => matches!(
                (from, to),
                (BillStatus::Unpaid, BillStatus::Paid)
                    | (BillStatus::Unpaid, BillStatus::Overdue)
                    | (BillStatus::Overdue, BillStatus::Paid)
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::ForwardOnly => "forward_only",
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "forward_only" | "forward-only" => Ok(Self::ForwardOnly),
            other => Err(format!(
                "unknown bill status policy '{other}', expected permissive or forward_only"
            )),
        }
    }
}

/// `paid_at` after moving from `from` to `to`.
///
/// Set to `now` when entering paid, cleared when leaving it, kept otherwise.
pub fn next_paid_at(
    from: BillStatus,
    to: BillStatus,
    current: Option<i64>,
    now: i64,
) -> Option<i64> {
    match (from == BillStatus::Paid, to == BillStatus::Paid) {
        (false, true) => Some(now),
        (true, false) => None,
        _ => current,
    }
}
