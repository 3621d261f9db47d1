//! Settings Repository
//!
//! `settings` holds one row (id = 1) with the current values;
//! `settings_history` is append-only.

use super::{RepoError, RepoResult};
use shared::models::{SettingHistoryEntry, SettingKey, Settings};
use sqlx::SqlitePool;

fn column(key: SettingKey) -> &'static str {
    match key {
        SettingKey::ChargePerCubicMeter => "charge_per_cubic_meter",
        SettingKey::SurchargeRate => "surcharge_rate",
    }
}

pub async fn find(pool: &SqlitePool) -> RepoResult<Option<Settings>> {
    let row = sqlx::query_as::<_, Settings>(
        "SELECT charge_per_cubic_meter, surcharge_rate, updated_at FROM settings WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create the singleton with all values at 0 unless it already exists.
/// No history entry is written.
pub async fn init_defaults(pool: &SqlitePool, now: i64) -> RepoResult<Settings> {
    sqlx::query(
        "INSERT OR IGNORE INTO settings (id, charge_per_cubic_meter, surcharge_rate, updated_at) VALUES (1, 0, 0, ?)",
    )
    .bind(now)
    .execute(pool)
    .await?;
    find(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to initialize settings".into()))
}

/// Set the current value of `key` and append a history entry, in one transaction
pub async fn write_value(
    pool: &SqlitePool,
    key: SettingKey,
    value: f64,
    effective_from: i64,
) -> RepoResult<Settings> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT OR IGNORE INTO settings (id, charge_per_cubic_meter, surcharge_rate, updated_at) VALUES (1, 0, 0, ?)",
    )
    .bind(effective_from)
    .execute(&mut *tx)
    .await?;

    let sql = format!(
        "UPDATE settings SET {} = ?1, updated_at = ?2 WHERE id = 1",
        column(key)
    );
    sqlx::query(&sql)
        .bind(value)
        .bind(effective_from)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO settings_history (setting_key, value, effective_from) VALUES (?1, ?2, ?3)",
    )
    .bind(key)
    .bind(value)
    .bind(effective_from)
    .execute(&mut *tx)
    .await?;

    let settings = sqlx::query_as::<_, Settings>(
        "SELECT charge_per_cubic_meter, surcharge_rate, updated_at FROM settings WHERE id = 1",
    )
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(settings)
}

/// All history entries of `key`, oldest first (insertion order breaks ties)
pub async fn history(pool: &SqlitePool, key: SettingKey) -> RepoResult<Vec<SettingHistoryEntry>> {
    let rows = sqlx::query_as::<_, SettingHistoryEntry>(
        "SELECT id, setting_key, value, effective_from FROM settings_history WHERE setting_key = ? ORDER BY effective_from ASC, id ASC",
    )
    .bind(key)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::pool;

    #[tokio::test]
    async fn test_init_defaults_is_idempotent_and_writes_no_history() {
        let pool = pool().await;
        assert!(find(&pool).await.unwrap().is_none());

        let first = init_defaults(&pool, 100).await.unwrap();
        let second = init_defaults(&pool, 200).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.charge_per_cubic_meter, 0.0);
        assert!(
            history(&pool, SettingKey::ChargePerCubicMeter)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_write_value_updates_current_and_appends_history() {
        let pool = pool().await;

        let s = write_value(&pool, SettingKey::ChargePerCubicMeter, 12.5, 1_000).await.unwrap();
        assert_eq!(s.charge_per_cubic_meter, 12.5);
        assert_eq!(s.surcharge_rate, 0.0);

        write_value(&pool, SettingKey::SurchargeRate, 0.05, 2_000).await.unwrap();
        let s = write_value(&pool, SettingKey::ChargePerCubicMeter, 15.0, 3_000).await.unwrap();
        assert_eq!(s.charge_per_cubic_meter, 15.0);
        assert_eq!(s.surcharge_rate, 0.05);
        assert_eq!(s.updated_at, 3_000);

        let charge = history(&pool, SettingKey::ChargePerCubicMeter).await.unwrap();
        let values: Vec<f64> = charge.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![12.5, 15.0]);
        assert!(charge.iter().all(|e| e.setting_key == SettingKey::ChargePerCubicMeter));

        let surcharge = history(&pool, SettingKey::SurchargeRate).await.unwrap();
        assert_eq!(surcharge.len(), 1);
    }
}
