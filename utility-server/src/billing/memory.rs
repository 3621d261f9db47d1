//! In-memory storage for the billing engine
//!
//! Behaves like the SQLite stores, including the (connection, month)
//! uniqueness check, without a database. Used in unit tests and handy for
//! embedding the engine elsewhere.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{Bill, BillStatus, ConnectionDetail, SettingHistoryEntry, SettingKey, Settings};

use super::traits::{BillLedger, ConnectionRegistry, SettingsStore};
use crate::db::repository::{RepoError, RepoResult};

#[derive(Default)]
pub struct MemoryLedger {
    bills: RwLock<HashMap<i64, Bill>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bills.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.read().is_empty()
    }

    fn latest_where(&self, connection_id: i64, pred: impl Fn(&Bill) -> bool) -> Option<Bill> {
        self.bills
            .read()
            .values()
            .filter(|b| b.connection_id == connection_id && pred(b))
            .max_by_key(|b| b.month_of)
            .cloned()
    }
}

#[async_trait]
impl BillLedger for MemoryLedger {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Bill>> {
        Ok(self.bills.read().get(&id).cloned())
    }

    async fn find_by_connection_and_month(
        &self,
        connection_id: i64,
        month_of: i64,
    ) -> RepoResult<Option<Bill>> {
        Ok(self
            .bills
            .read()
            .values()
            .find(|b| b.connection_id == connection_id && b.month_of == month_of)
            .cloned())
    }

    async fn find_last_bill(&self, connection_id: i64) -> RepoResult<Option<Bill>> {
        Ok(self.latest_where(connection_id, |_| true))
    }

    async fn find_previous_bill(
        &self,
        connection_id: i64,
        before_month: i64,
    ) -> RepoResult<Option<Bill>> {
        Ok(self.latest_where(connection_id, |b| b.month_of < before_month))
    }

    async fn insert(&self, bill: &Bill) -> RepoResult<()> {
        let mut bills = self.bills.write();
        let taken = bills
            .values()
            .any(|b| b.connection_id == bill.connection_id && b.month_of == bill.month_of);
        if taken || bills.contains_key(&bill.id) {
            return Err(RepoError::Duplicate(format!(
                "bill (connection_id={}, month_of={})",
                bill.connection_id, bill.month_of
            )));
        }
        bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn update_fields(&self, bill: &Bill) -> RepoResult<bool> {
        let mut bills = self.bills.write();
        let Some(stored) = bills.get_mut(&bill.id) else {
            return Ok(false);
        };
        stored.due_date = bill.due_date;
        stored.meter_reading = bill.meter_reading;
        stored.consumed_units = bill.consumed_units;
        stored.amount = bill.amount;
        stored.updated_at = bill.updated_at;
        Ok(true)
    }

    async fn set_status(
        &self,
        id: i64,
        status: BillStatus,
        paid_at: Option<i64>,
        updated_at: i64,
    ) -> RepoResult<bool> {
        let mut bills = self.bills.write();
        let Some(stored) = bills.get_mut(&id) else {
            return Ok(false);
        };
        stored.status = status;
        stored.paid_at = paid_at;
        stored.updated_at = updated_at;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.bills.write().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryConnections {
    connections: RwLock<HashMap<i64, ConnectionDetail>>,
}

impl MemoryConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, detail: ConnectionDetail) {
        self.connections.write().insert(detail.connection.id, detail);
    }
}

#[async_trait]
impl ConnectionRegistry for MemoryConnections {
    async fn find_connection(&self, id: i64) -> RepoResult<Option<ConnectionDetail>> {
        Ok(self.connections.read().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    current: RwLock<Option<Settings>>,
    history: RwLock<Vec<SettingHistoryEntry>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with pre-recorded history and no current row
    pub fn with_history(history: Vec<SettingHistoryEntry>) -> Self {
        Self {
            current: RwLock::new(None),
            history: RwLock::new(history),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> RepoResult<Option<Settings>> {
        Ok(self.current.read().clone())
    }

    async fn init_defaults(&self, now: i64) -> RepoResult<Settings> {
        let mut current = self.current.write();
        let settings = current.get_or_insert_with(|| Settings {
            updated_at: now,
            ..Settings::default()
        });
        Ok(settings.clone())
    }

    async fn write_value(
        &self,
        key: SettingKey,
        value: f64,
        effective_from: i64,
    ) -> RepoResult<Settings> {
        let mut current = self.current.write();
        let mut history = self.history.write();

        let settings = current.get_or_insert_with(Settings::default);
        key.write(settings, value);
        settings.updated_at = effective_from;

        let id = history.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        history.push(SettingHistoryEntry {
            id,
            setting_key: key,
            value,
            effective_from,
        });
        Ok(settings.clone())
    }

    async fn history(&self, key: SettingKey) -> RepoResult<Vec<SettingHistoryEntry>> {
        let mut entries: Vec<SettingHistoryEntry> = self
            .history
            .read()
            .iter()
            .filter(|e| e.setting_key == key)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.effective_from, e.id));
        Ok(entries)
    }
}
