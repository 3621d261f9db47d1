//! Billing Engine
//!
//! Creates bills from meter readings and drives their status. Reads go
//! through [`BillLedger`], [`ConnectionRegistry`] and the
//! [`SettingsService`]; the engine itself keeps no state.
//!
//! # add_bill
//!
//! ```text
//! connection exists? ─▶ normalize dates ─▶ month already billed? ─▶ last reading
//!     ─▶ consumed = reading - last ─▶ current rate (frozen) ─▶ amount ─▶ insert
//! ```
//!
//! The duplicate check is a plain read; the storage uniqueness constraint
//! catches concurrent inserts. A rejected insert counts as a duplicate month
//! only when the month is really taken.
//!
//! Readings are capped at [`money::MAX_METER_READING`] and every amount is
//! computed with checked arithmetic.

use std::sync::Arc;

use shared::models::{Bill, BillCreate, BillDetail, BillStatus, BillUpdate, SettingKey};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::error::{BillingError, BillingResult};
use super::money;
use super::settings::SettingsService;
use super::sqlite::{SqliteConnections, SqliteLedger, SqliteSettingsStore};
use super::status::{StatusPolicy, next_paid_at};
use super::traits::{BillLedger, ConnectionRegistry};
use crate::db::repository::RepoError;
use crate::utils::time;

pub struct BillingEngine {
    ledger: Arc<dyn BillLedger>,
    connections: Arc<dyn ConnectionRegistry>,
    settings: SettingsService,
    policy: StatusPolicy,
}

impl BillingEngine {
    pub fn new(
        ledger: Arc<dyn BillLedger>,
        connections: Arc<dyn ConnectionRegistry>,
        settings: SettingsService,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            ledger,
            connections,
            settings,
            policy,
        }
    }

    /// Engine over the SQLite stores sharing one pool
    pub fn with_pool(pool: SqlitePool, policy: StatusPolicy) -> Self {
        Self::new(
            Arc::new(SqliteLedger::new(pool.clone())),
            Arc::new(SqliteConnections::new(pool.clone())),
            SettingsService::new(Arc::new(SqliteSettingsStore::new(pool))),
            policy,
        )
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Create the bill of one connection for one month
    pub async fn add_bill(&self, req: BillCreate) -> BillingResult<BillDetail> {
        let connection_id = req.connection_id;
        let connection = self
            .connections
            .find_connection(connection_id)
            .await?
            .ok_or(BillingError::ConnectionNotFound(connection_id))?;

        let month_of = time::parse_month(&req.month_of).map_err(|source| BillingError::InvalidDate {
            field: "month_of",
            source,
        })?;
        let due_date = time::parse_instant(&req.due_date).map_err(|source| BillingError::InvalidDate {
            field: "due_date",
            source,
        })?;
        validate_reading(req.meter_reading)?;
        let status = match req.status.as_deref() {
            Some(s) => parse_status(s)?,
            None => BillStatus::default(),
        };

        if self
            .ledger
            .find_by_connection_and_month(connection_id, month_of)
            .await?
            .is_some()
        {
            return Err(BillingError::DuplicateMonth {
                connection_id,
                month_of,
            });
        }

        let last_reading = self
            .ledger
            .find_last_bill(connection_id)
            .await?
            .map(|b| b.meter_reading)
            .unwrap_or(0.0);
        let consumed = money::consumption(req.meter_reading, last_reading)
            .ok_or(BillingError::InvalidReading(req.meter_reading))?;
        if consumed < 0.0 {
            return Err(BillingError::ReadingDecreased {
                previous: last_reading,
                reading: req.meter_reading,
            });
        }

        let rate = self
            .settings
            .get_current_rate(SettingKey::ChargePerCubicMeter)
            .await?;
        let amount = money::charge(consumed, rate)
            .ok_or(BillingError::ChargeOutOfRange { consumed, rate })?;
        let now = now_millis();
        let bill = Bill {
            id: snowflake_id(),
            connection_id,
            month_of,
            due_date,
            meter_reading: req.meter_reading,
            charge_per_cubic_meter: rate,
            consumed_units: consumed,
            amount,
            status,
            paid_at: (status == BillStatus::Paid).then_some(now),
            created_at: now,
            updated_at: now,
        };

        match self.ledger.insert(&bill).await {
            Ok(()) => {}
            Err(RepoError::Duplicate(detail)) => {
                // Only a taken month is a conflict; anything else (id collision) is storage
                let taken = self
                    .ledger
                    .find_by_connection_and_month(connection_id, month_of)
                    .await?
                    .is_some();
                if !taken {
                    tracing::error!(
                        bill_id = bill.id,
                        connection_id,
                        month_of,
                        %detail,
                        "Bill insert rejected as duplicate but the month is free"
                    );
                    return Err(BillingError::Storage(RepoError::Duplicate(detail)));
                }
                tracing::warn!(
                    connection_id,
                    month_of,
                    "Concurrent bill insert rejected by uniqueness constraint"
                );
                return Err(BillingError::DuplicateMonth {
                    connection_id,
                    month_of,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            bill_id = bill.id,
            connection_id,
            month_of = %time::month_label(month_of),
            consumed_units = bill.consumed_units,
            rate,
            amount = bill.amount,
            status = %bill.status,
            "Bill created"
        );
        Ok(BillDetail { bill, connection })
    }

    pub async fn get_bill(&self, id: i64) -> BillingResult<BillDetail> {
        let bill = self.find_bill(id).await?;
        self.populate(bill).await
    }

    /// Change due date and/or meter reading; status has its own operation.
    ///
    /// A reading can only change on the connection's latest bill, since the
    /// next bill's consumption is measured from it. The frozen rate is kept.
    pub async fn update_bill(&self, id: i64, update: BillUpdate) -> BillingResult<BillDetail> {
        let mut bill = self.find_bill(id).await?;
        if update.due_date.is_none() && update.meter_reading.is_none() {
            return self.populate(bill).await;
        }

        if let Some(due) = &update.due_date {
            bill.due_date = time::parse_instant(due).map_err(|source| BillingError::InvalidDate {
                field: "due_date",
                source,
            })?;
        }

        if let Some(reading) = update.meter_reading {
            validate_reading(reading)?;
            if reading != bill.meter_reading {
                self.recompute_reading(&mut bill, reading).await?;
            }
        }

        bill.updated_at = now_millis();
        if !self.ledger.update_fields(&bill).await? {
            return Err(BillingError::BillNotFound(id));
        }

        tracing::info!(
            bill_id = id,
            connection_id = bill.connection_id,
            due_date = bill.due_date,
            meter_reading = bill.meter_reading,
            amount = bill.amount,
            "Bill updated"
        );
        self.populate(bill).await
    }

    /// Move a bill to `new_status` (`paid`, `unpaid` or `overdue`)
    pub async fn update_bill_status(&self, id: i64, new_status: &str) -> BillingResult<BillDetail> {
        let to = parse_status(new_status)?;
        let mut bill = self.find_bill(id).await?;
        let from = bill.status;

        if from == to {
            tracing::debug!(bill_id = id, status = %to, "Bill status unchanged");
            return self.populate(bill).await;
        }
        if !self.policy.allows(from, to) {
            return Err(BillingError::TransitionDenied { from, to });
        }
        if from == BillStatus::Paid {
            tracing::warn!(bill_id = id, from = %from, to = %to, "Paid bill re-opened");
        }

        let now = now_millis();
        let paid_at = next_paid_at(from, to, bill.paid_at, now);
        if !self.ledger.set_status(id, to, paid_at, now).await? {
            return Err(BillingError::BillNotFound(id));
        }
        bill.status = to;
        bill.paid_at = paid_at;
        bill.updated_at = now;

        tracing::info!(bill_id = id, from = %from, to = %to, paid_at = ?paid_at, "Bill status changed");
        self.populate(bill).await
    }

    /// Hard delete
    pub async fn delete_bill(&self, id: i64) -> BillingResult<()> {
        if !self.ledger.delete(id).await? {
            return Err(BillingError::BillNotFound(id));
        }
        tracing::info!(bill_id = id, "Bill deleted");
        Ok(())
    }

    async fn find_bill(&self, id: i64) -> BillingResult<Bill> {
        self.ledger
            .find_by_id(id)
            .await?
            .ok_or(BillingError::BillNotFound(id))
    }

    async fn populate(&self, bill: Bill) -> BillingResult<BillDetail> {
        let connection = self
            .connections
            .find_connection(bill.connection_id)
            .await?
            .ok_or(BillingError::ConnectionNotFound(bill.connection_id))?;
        Ok(BillDetail { bill, connection })
    }

    async fn recompute_reading(&self, bill: &mut Bill, reading: f64) -> BillingResult<()> {
        if let Some(latest) = self.ledger.find_last_bill(bill.connection_id).await? {
            if latest.id != bill.id {
                return Err(BillingError::ReadingLocked {
                    bill_id: bill.id,
                    latest_bill_id: latest.id,
                });
            }
        }

        let previous = self
            .ledger
            .find_previous_bill(bill.connection_id, bill.month_of)
            .await?
            .map(|b| b.meter_reading)
            .unwrap_or(0.0);
        let consumed =
            money::consumption(reading, previous).ok_or(BillingError::InvalidReading(reading))?;
        if consumed < 0.0 {
            return Err(BillingError::ReadingDecreased { previous, reading });
        }
        let rate = bill.charge_per_cubic_meter;
        let amount =
            money::charge(consumed, rate).ok_or(BillingError::ChargeOutOfRange { consumed, rate })?;

        bill.meter_reading = reading;
        bill.consumed_units = consumed;
        bill.amount = amount;
        Ok(())
    }
}

fn parse_status(s: &str) -> BillingResult<BillStatus> {
    s.parse().map_err(BillingError::InvalidStatus)
}

fn validate_reading(reading: f64) -> BillingResult<()> {
    if !reading.is_finite() || !(0.0..=money::MAX_METER_READING).contains(&reading) {
        return Err(BillingError::InvalidReading(reading));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::ErrorKind;
    use crate::billing::memory::{MemoryConnections, MemoryLedger, MemorySettingsStore};
    use async_trait::async_trait;
    use crate::billing::traits::SettingsStore;
    use shared::error::ErrorCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use shared::models::{
        Connection, ConnectionDetail, ConnectionStatus, ConnectionType, Consumer,
    };
    use shared::types::DateInput;
    use crate::db::repository::RepoResult;

    const JAN: i64 = 1_735_689_600_000; // 2025-01-01T00:00:00Z
    const CONN: i64 = 7_001;

    fn detail(id: i64) -> ConnectionDetail {
        ConnectionDetail {
            connection: Connection {
                id,
                consumer_id: 1,
                meter_number: format!("WM-{id}"),
                address: "Rua das Flores 12".into(),
                connection_date: 0,
                connection_type: ConnectionType::Residential,
                status: ConnectionStatus::Active,
                created_at: 0,
                updated_at: 0,
            },
            consumer: Consumer {
                id: 1,
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                phone: None,
                address: None,
                is_active: true,
                created_at: 0,
                updated_at: 0,
            },
        }
    }

    struct Fixture {
        engine: BillingEngine,
        ledger: Arc<MemoryLedger>,
    }

    async fn fixture_with(policy: StatusPolicy, rate: f64) -> Fixture {
        let ledger = Arc::new(MemoryLedger::new());
        let connections = Arc::new(MemoryConnections::new());
        connections.insert(detail(CONN));
        let settings = SettingsService::new(Arc::new(MemorySettingsStore::new()));
        settings
            .update_rate(SettingKey::ChargePerCubicMeter, rate)
            .await
            .unwrap();
        let engine = BillingEngine::new(ledger.clone(), connections, settings, policy);
        Fixture { engine, ledger }
    }

    async fn fixture() -> Fixture {
        fixture_with(StatusPolicy::Permissive, 15.0).await
    }

    fn req(month: &str, reading: f64) -> BillCreate {
        BillCreate {
            connection_id: CONN,
            month_of: DateInput::from(month),
            due_date: DateInput::from("2025-12-31"),
            meter_reading: reading,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_first_bill_consumes_from_zero() {
        let f = fixture().await;
        let detail = f.engine.add_bill(req("2025-01-05", 120.0)).await.unwrap();
        let bill = detail.bill;

        assert_eq!(bill.month_of, JAN);
        assert_eq!(bill.consumed_units, 120.0);
        assert_eq!(bill.charge_per_cubic_meter, 15.0);
        assert_eq!(bill.amount, 1800.0);
        assert_eq!(bill.status, BillStatus::Unpaid);
        assert_eq!(bill.paid_at, None);
        assert_eq!(detail.connection.connection.id, CONN);
        assert_eq!(detail.connection.consumer.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_second_bill_same_month_conflicts() {
        let f = fixture().await;
        f.engine.add_bill(req("2025-01-05", 120.0)).await.unwrap();

        let err = f.engine.add_bill(req("2025-01-20", 130.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::DuplicateMonth { month_of: JAN, .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(f.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_lower_reading_is_rejected_and_nothing_written() {
        let f = fixture().await;
        f.engine.add_bill(req("2025-01-05", 120.0)).await.unwrap();

        let err = f.engine.add_bill(req("2025-02-01", 100.0)).await.unwrap_err();
        assert!(matches!(
            err,
            BillingError::ReadingDecreased { previous, reading } if previous == 120.0 && reading == 100.0
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(f.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_consumption_is_measured_from_latest_bill() {
        let f = fixture().await;
        f.engine.add_bill(req("2025-01", 120.0)).await.unwrap();
        let feb = f.engine.add_bill(req("2025-02", 150.5)).await.unwrap().bill;
        assert_eq!(feb.consumed_units, 30.5);
        assert_eq!(feb.amount, 457.5);

        // Same reading twice is zero consumption, not an error
        let mar = f.engine.add_bill(req("2025-03", 150.5)).await.unwrap().bill;
        assert_eq!(mar.consumed_units, 0.0);
        assert_eq!(mar.amount, 0.0);
    }

    #[tokio::test]
    async fn test_rate_is_frozen_at_creation() {
        let f = fixture().await;
        let jan = f.engine.add_bill(req("2025-01", 100.0)).await.unwrap().bill;

        f.engine
            .settings()
            .update_rate(SettingKey::ChargePerCubicMeter, 20.0)
            .await
            .unwrap();

        let stored = f.engine.get_bill(jan.id).await.unwrap().bill;
        assert_eq!(stored.charge_per_cubic_meter, 15.0);
        assert_eq!(stored.amount, 1500.0);

        let feb = f.engine.add_bill(req("2025-02", 110.0)).await.unwrap().bill;
        assert_eq!(feb.charge_per_cubic_meter, 20.0);
        assert_eq!(feb.amount, 200.0);
    }

    #[tokio::test]
    async fn test_zero_rate_when_settings_never_written() {
        let ledger = Arc::new(MemoryLedger::new());
        let connections = Arc::new(MemoryConnections::new());
        connections.insert(detail(CONN));
        let engine = BillingEngine::new(
            ledger,
            connections,
            SettingsService::new(Arc::new(MemorySettingsStore::new())),
            StatusPolicy::Permissive,
        );

        let bill = engine.add_bill(req("2025-01", 42.0)).await.unwrap().bill;
        assert_eq!(bill.charge_per_cubic_meter, 0.0);
        assert_eq!(bill.amount, 0.0);
    }

    #[tokio::test]
    async fn test_input_errors() {
        let f = fixture().await;

        let mut unknown = req("2025-01", 1.0);
        unknown.connection_id = 404;
        let err = f.engine.add_bill(unknown).await.unwrap_err();
        assert!(matches!(err, BillingError::ConnectionNotFound(404)));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = f.engine.add_bill(req("January", 1.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidDate { field: "month_of", .. }));

        let mut bad_due = req("2025-01", 1.0);
        bad_due.due_date = DateInput::from("soon");
        let err = f.engine.add_bill(bad_due).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidDate { field: "due_date", .. }));

        let err = f.engine.add_bill(req("2025-01", -5.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidReading(_)));
        let err = f.engine.add_bill(req("2025-01", f64::NAN)).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidReading(_)));

        let mut bad_status = req("2025-01", 1.0);
        bad_status.status = Some("cancelled".into());
        let err = f.engine.add_bill(bad_status).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidStatus(_)));

        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_created_as_paid_sets_paid_at() {
        let f = fixture().await;
        let mut paid = req("2025-01", 10.0);
        paid.status = Some("paid".into());
        let bill = f.engine.add_bill(paid).await.unwrap().bill;
        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.paid_at, Some(bill.created_at));
    }

    /// Ledger whose duplicate lookup misses until an insert is rejected,
    /// as when two requests race
    #[derive(Default)]
    struct RacingLedger {
        inner: MemoryLedger,
        rejected: AtomicBool,
    }

    #[async_trait]
    impl BillLedger for RacingLedger {
        async fn find_by_id(&self, id: i64) -> RepoResult<Option<Bill>> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_connection_and_month(&self, c: i64, m: i64) -> RepoResult<Option<Bill>> {
            if !self.rejected.load(Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_connection_and_month(c, m).await
        }
        async fn find_last_bill(&self, _: i64) -> RepoResult<Option<Bill>> {
            Ok(None)
        }
        async fn find_previous_bill(&self, c: i64, m: i64) -> RepoResult<Option<Bill>> {
            self.inner.find_previous_bill(c, m).await
        }
        async fn insert(&self, bill: &Bill) -> RepoResult<()> {
            let result = self.inner.insert(bill).await;
            if result.is_err() {
                self.rejected.store(true, Ordering::SeqCst);
            }
            result
        }
        async fn update_fields(&self, bill: &Bill) -> RepoResult<bool> {
            self.inner.update_fields(bill).await
        }
        async fn set_status(&self, id: i64, s: BillStatus, p: Option<i64>, u: i64) -> RepoResult<bool> {
            self.inner.set_status(id, s, p, u).await
        }
        async fn delete(&self, id: i64) -> RepoResult<bool> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_storage_uniqueness_violation_is_a_conflict() {
        let connections = Arc::new(MemoryConnections::new());
        connections.insert(detail(CONN));
        let engine = BillingEngine::new(
            Arc::new(RacingLedger::default()),
            connections,
            SettingsService::new(Arc::new(MemorySettingsStore::new())),
            StatusPolicy::Permissive,
        );

        engine.add_bill(req("2025-01-05", 120.0)).await.unwrap();
        let err = engine.add_bill(req("2025-01-20", 130.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::DuplicateMonth { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    /// Ledger that rejects every insert as a duplicate key while the month stays free
    struct CollidingLedger(MemoryLedger);

    #[async_trait]
    impl BillLedger for CollidingLedger {
        async fn find_by_id(&self, id: i64) -> RepoResult<Option<Bill>> {
            self.0.find_by_id(id).await
        }
        async fn find_by_connection_and_month(&self, c: i64, m: i64) -> RepoResult<Option<Bill>> {
            self.0.find_by_connection_and_month(c, m).await
        }
        async fn find_last_bill(&self, c: i64) -> RepoResult<Option<Bill>> {
            self.0.find_last_bill(c).await
        }
        async fn find_previous_bill(&self, c: i64, m: i64) -> RepoResult<Option<Bill>> {
            self.0.find_previous_bill(c, m).await
        }
        async fn insert(&self, bill: &Bill) -> RepoResult<()> {
            Err(RepoError::Duplicate(format!("bill id {}", bill.id)))
        }
        async fn update_fields(&self, bill: &Bill) -> RepoResult<bool> {
            self.0.update_fields(bill).await
        }
        async fn set_status(&self, id: i64, s: BillStatus, p: Option<i64>, u: i64) -> RepoResult<bool> {
            self.0.set_status(id, s, p, u).await
        }
        async fn delete(&self, id: i64) -> RepoResult<bool> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_id_collision_is_a_storage_error_not_a_conflict() {
        let connections = Arc::new(MemoryConnections::new());
        connections.insert(detail(CONN));
        let engine = BillingEngine::new(
            Arc::new(CollidingLedger(MemoryLedger::new())),
            connections,
            SettingsService::new(Arc::new(MemorySettingsStore::new())),
            StatusPolicy::Permissive,
        );

        let err = engine.add_bill(req("2025-01-05", 120.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::Storage(RepoError::Duplicate(_))));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_reading_above_maximum_is_rejected() {
        let f = fixture().await;

        let err = f.engine.add_bill(req("2025-01", 1e30)).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidReading(r) if r == 1e30));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(f.ledger.is_empty());

        let err = f
            .engine
            .add_bill(req("2025-01", money::MAX_METER_READING * 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidReading(_)));

        // The cap itself is accepted and later lower readings still fail
        f.engine
            .add_bill(req("2025-01", money::MAX_METER_READING))
            .await
            .unwrap();
        let err = f.engine.add_bill(req("2025-02", 5.0)).await.unwrap_err();
        assert!(matches!(err, BillingError::ReadingDecreased { .. }));
        assert_eq!(f.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_amount_is_rejected_without_writing() {
        // Store written directly, skipping the rate validator
        let store = Arc::new(MemorySettingsStore::new());
        store
            .write_value(SettingKey::ChargePerCubicMeter, 1e20, 0)
            .await
            .unwrap();
        let ledger = Arc::new(MemoryLedger::new());
        let connections = Arc::new(MemoryConnections::new());
        connections.insert(detail(CONN));
        let engine = BillingEngine::new(
            ledger.clone(),
            connections,
            SettingsService::new(store),
            StatusPolicy::Permissive,
        );

        let err = engine.add_bill(req("2025-01", 1e10)).await.unwrap_err();
        assert!(matches!(err, BillingError::ChargeOutOfRange { rate, .. } if rate == 1e20));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.code(), ErrorCode::ValueOutOfRange);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_rate_above_maximum_is_rejected() {
        let f = fixture().await;
        let err = f
            .engine
            .settings()
            .update_rate(SettingKey::ChargePerCubicMeter, 1e20)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::billing::SettingsError::ValueOutOfRange(_)));
    }

    #[tokio::test]
    async fn test_paid_then_unpaid_clears_paid_at() {
        let f = fixture().await;
        let id = f.engine.add_bill(req("2025-01", 10.0)).await.unwrap().bill.id;

        let paid = f.engine.update_bill_status(id, "paid").await.unwrap().bill;
        assert_eq!(paid.status, BillStatus::Paid);
        let paid_at = paid.paid_at.unwrap();

        // Same status: succeeds, paid_at kept
        let again = f.engine.update_bill_status(id, "paid").await.unwrap().bill;
        assert_eq!(again.paid_at, Some(paid_at));

        let unpaid = f.engine.update_bill_status(id, "unpaid").await.unwrap().bill;
        assert_eq!(unpaid.status, BillStatus::Unpaid);
        assert_eq!(unpaid.paid_at, None);

        let stored = f.engine.get_bill(id).await.unwrap().bill;
        assert_eq!(stored.paid_at, None);
    }

    #[tokio::test]
    async fn test_overdue_keeps_paid_at_empty() {
        let f = fixture().await;
        let id = f.engine.add_bill(req("2025-01", 10.0)).await.unwrap().bill.id;
        let overdue = f.engine.update_bill_status(id, "overdue").await.unwrap().bill;
        assert_eq!(overdue.status, BillStatus::Overdue);
        assert_eq!(overdue.paid_at, None);
    }

    #[tokio::test]
    async fn test_status_errors() {
        let f = fixture().await;
        let id = f.engine.add_bill(req("2025-01", 10.0)).await.unwrap().bill.id;

        let err = f.engine.update_bill_status(id, "refunded").await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidStatus(_)));

        let err = f.engine.update_bill_status(999, "paid").await.unwrap_err();
        assert!(matches!(err, BillingError::BillNotFound(999)));
    }

    #[tokio::test]
    async fn test_forward_only_policy_blocks_reopening() {
        let f = fixture_with(StatusPolicy::ForwardOnly, 15.0).await;
        let id = f.engine.add_bill(req("2025-01", 10.0)).await.unwrap().bill.id;

        f.engine.update_bill_status(id, "overdue").await.unwrap();
        f.engine.update_bill_status(id, "paid").await.unwrap();

        let err = f.engine.update_bill_status(id, "unpaid").await.unwrap_err();
        assert!(matches!(
            err,
            BillingError::TransitionDenied {
                from: BillStatus::Paid,
                to: BillStatus::Unpaid
            }
        ));
        let stored = f.engine.get_bill(id).await.unwrap().bill;
        assert_eq!(stored.status, BillStatus::Paid);
        assert!(stored.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_update_reading_on_latest_bill_recomputes() {
        let f = fixture().await;
        f.engine.add_bill(req("2025-01", 100.0)).await.unwrap();
        let feb = f.engine.add_bill(req("2025-02", 110.0)).await.unwrap().bill;

        // Later rate changes do not leak into the recomputation
        f.engine
            .settings()
            .update_rate(SettingKey::ChargePerCubicMeter, 99.0)
            .await
            .unwrap();

        let update = BillUpdate {
            meter_reading: Some(125.0),
            due_date: Some(DateInput::from("2025-03-10")),
        };
        let updated = f.engine.update_bill(feb.id, update).await.unwrap().bill;
        assert_eq!(updated.consumed_units, 25.0);
        assert_eq!(updated.amount, 375.0);
        assert_eq!(updated.charge_per_cubic_meter, 15.0);
        assert_eq!(
            updated.due_date,
            time::parse_instant(&DateInput::from("2025-03-10")).unwrap()
        );
        assert_eq!(updated.status, feb.status);

        let err = f
            .engine
            .update_bill(
                feb.id,
                BillUpdate {
                    meter_reading: Some(90.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::ReadingDecreased { previous, .. } if previous == 100.0));
    }

    #[tokio::test]
    async fn test_update_reading_on_older_bill_is_locked() {
        let f = fixture().await;
        let jan = f.engine.add_bill(req("2025-01", 100.0)).await.unwrap().bill;
        let feb = f.engine.add_bill(req("2025-02", 110.0)).await.unwrap().bill;

        let update = BillUpdate {
            meter_reading: Some(105.0),
            ..Default::default()
        };
        let err = f.engine.update_bill(jan.id, update).await.unwrap_err();
        assert!(matches!(
            err,
            BillingError::ReadingLocked { latest_bill_id, .. } if latest_bill_id == feb.id
        ));

        // Due date alone is fine on any bill
        let update = BillUpdate {
            due_date: Some(DateInput::from("2025-02-15")),
            ..Default::default()
        };
        assert!(f.engine.update_bill(jan.id, update).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_bill() {
        let f = fixture().await;
        let id = f.engine.add_bill(req("2025-01", 10.0)).await.unwrap().bill.id;

        f.engine.delete_bill(id).await.unwrap();
        assert!(matches!(
            f.engine.get_bill(id).await,
            Err(BillingError::BillNotFound(_))
        ));
        assert!(matches!(
            f.engine.delete_bill(id).await,
            Err(BillingError::BillNotFound(_))
        ));

        // The month is free again
        assert!(f.engine.add_bill(req("2025-01", 10.0)).await.is_ok());
    }
}
