//! Storage seams of the billing engine
//!
//! The engine only sees these traits. SQLite-backed implementations live in
//! [`super::sqlite`], in-memory ones in [`super::memory`].

use async_trait::async_trait;
use shared::models::{Bill, BillStatus, ConnectionDetail, SettingHistoryEntry, SettingKey, Settings};

use crate::db::repository::RepoResult;

/// Bill persistence
#[async_trait]
pub trait BillLedger: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Bill>>;

    async fn find_by_connection_and_month(
        &self,
        connection_id: i64,
        month_of: i64,
    ) -> RepoResult<Option<Bill>>;

    /// Latest bill by `month_of`, any status
    async fn find_last_bill(&self, connection_id: i64) -> RepoResult<Option<Bill>>;

    /// Latest bill strictly before `before_month`
    async fn find_previous_bill(
        &self,
        connection_id: i64,
        before_month: i64,
    ) -> RepoResult<Option<Bill>>;

    /// Must fail with `RepoError::Duplicate` when (connection, month) is taken
    async fn insert(&self, bill: &Bill) -> RepoResult<()>;

    /// Write due date, reading, consumption and amount
    async fn update_fields(&self, bill: &Bill) -> RepoResult<bool>;

    async fn set_status(
        &self,
        id: i64,
        status: BillStatus,
        paid_at: Option<i64>,
        updated_at: i64,
    ) -> RepoResult<bool>;

    async fn delete(&self, id: i64) -> RepoResult<bool>;
}

/// Connection lookup
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Connection with its owning consumer, `None` if unknown
    async fn find_connection(&self, id: i64) -> RepoResult<Option<ConnectionDetail>>;
}

/// Current settings plus append-only history
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> RepoResult<Option<Settings>>;

    /// Create the all-zero singleton if absent; writes no history
    async fn init_defaults(&self, now: i64) -> RepoResult<Settings>;

    /// Set the current value and append one history entry
    async fn write_value(
        &self,
        key: SettingKey,
        value: f64,
        effective_from: i64,
    ) -> RepoResult<Settings>;

    /// History of `key`, oldest first
    async fn history(&self, key: SettingKey) -> RepoResult<Vec<SettingHistoryEntry>>;
}
