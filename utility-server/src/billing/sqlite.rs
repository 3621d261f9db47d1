//! SQLite-backed billing storage, delegating to the repository functions

use async_trait::async_trait;
use shared::models::{Bill, BillStatus, ConnectionDetail, SettingHistoryEntry, SettingKey, Settings};
use sqlx::SqlitePool;

use super::traits::{BillLedger, ConnectionRegistry, SettingsStore};
use crate::db::repository::{self, RepoResult};

#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillLedger for SqliteLedger {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Bill>> {
        repository::bill::find_by_id(&self.pool, id).await
    }

    async fn find_by_connection_and_month(
        &self,
        connection_id: i64,
        month_of: i64,
    ) -> RepoResult<Option<Bill>> {
        repository::bill::find_by_connection_and_month(&self.pool, connection_id, month_of).await
    }

    async fn find_last_bill(&self, connection_id: i64) -> RepoResult<Option<Bill>> {
        repository::bill::find_last_by_connection(&self.pool, connection_id).await
    }

    async fn find_previous_bill(
        &self,
        connection_id: i64,
        before_month: i64,
    ) -> RepoResult<Option<Bill>> {
        repository::bill::find_previous(&self.pool, connection_id, before_month).await
    }

    async fn insert(&self, bill: &Bill) -> RepoResult<()> {
        repository::bill::insert(&self.pool, bill).await
    }

    async fn update_fields(&self, bill: &Bill) -> RepoResult<bool> {
        repository::bill::update_fields(&self.pool, bill).await
    }

    async fn set_status(
        &self,
        id: i64,
        status: BillStatus,
        paid_at: Option<i64>,
        updated_at: i64,
    ) -> RepoResult<bool> {
        repository::bill::set_status(&self.pool, id, status, paid_at, updated_at).await
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        repository::bill::delete(&self.pool, id).await
    }
}

#[derive(Clone)]
pub struct SqliteConnections {
    pool: SqlitePool,
}

impl SqliteConnections {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRegistry for SqliteConnections {
    async fn find_connection(&self, id: i64) -> RepoResult<Option<ConnectionDetail>> {
        repository::connection::find_detail(&self.pool, id).await
    }
}

#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn load(&self) -> RepoResult<Option<Settings>> {
        repository::settings::find(&self.pool).await
    }

    async fn init_defaults(&self, now: i64) -> RepoResult<Settings> {
        repository::settings::init_defaults(&self.pool, now).await
    }

    async fn write_value(
        &self,
        key: SettingKey,
        value: f64,
        effective_from: i64,
    ) -> RepoResult<Settings> {
        repository::settings::write_value(&self.pool, key, value, effective_from).await
    }

    async fn history(&self, key: SettingKey) -> RepoResult<Vec<SettingHistoryEntry>> {
        repository::settings::history(&self.pool, key).await
    }
}
