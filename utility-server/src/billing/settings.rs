//! Versioned billing settings
//!
//! Current values live in a singleton, every change also lands in an
//! append-only history so past rates can be answered for any date.

use std::sync::Arc;

use shared::models::{MonthlyRate, SettingHistoryEntry, SettingKey, Settings};
use shared::util::now_millis;

use super::error::{SettingsError, SettingsResult};
use super::traits::SettingsStore;
use crate::utils::time;

/// Upper bound for `get_monthly_history`
pub const MAX_HISTORY_MONTHS: u32 = 120;

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Parse a wire key (`charge_per_cubic_meter` or `chargePerCubicMeter`, ...)
    pub fn parse_key(key: &str) -> SettingsResult<SettingKey> {
        key.parse().map_err(SettingsError::UnknownKey)
    }

    /// Current settings, creating the all-zero singleton on first access
    pub async fn get_settings(&self) -> SettingsResult<Settings> {
        if let Some(settings) = self.store.load().await? {
            return Ok(settings);
        }
        let settings = self.store.init_defaults(now_millis()).await?;
        tracing::info!("Settings initialized with default values");
        Ok(settings)
    }

    pub async fn get_current_rate(&self, key: SettingKey) -> SettingsResult<f64> {
        let settings = self.get_settings().await?;
        Ok(key.read(&settings))
    }

    /// Validate, store as current and record in history effective now
    pub async fn update_rate(&self, key: SettingKey, value: f64) -> SettingsResult<f64> {
        key.validate(value).map_err(SettingsError::ValueOutOfRange)?;

        let now = now_millis();
        let previous = self.store.load().await?.map(|s| key.read(&s));
        let settings = self.store.write_value(key, value, now).await?;

        tracing::info!(
            setting_key = %key,
            previous = ?previous,
            value,
            effective_from = now,
            "Setting updated"
        );
        Ok(key.read(&settings))
    }

    /// Value of `key` in effect at `at`
    ///
    /// Before the first history entry the earliest known value applies; with
    /// no history at all the current value does.
    pub async fn get_rate_effective_at(&self, key: SettingKey, at: i64) -> SettingsResult<f64> {
        let history = self.store.history(key).await?;
        if let Some(value) = effective_at(&history, at) {
            return Ok(value);
        }
        if let Some(first) = history.first() {
            return Ok(first.value);
        }
        self.get_current_rate(key).await
    }

    /// Rate in effect at the start of each of the last `months` months,
    /// oldest first, current month last. Read only.
    pub async fn get_monthly_history(
        &self,
        key: SettingKey,
        months: u32,
    ) -> SettingsResult<Vec<MonthlyRate>> {
        if !(1..=MAX_HISTORY_MONTHS).contains(&months) {
            return Err(SettingsError::MonthsOutOfRange {
                got: months,
                max: MAX_HISTORY_MONTHS,
            });
        }
        let history = self.store.history(key).await?;
        Ok(monthly_rates(&history, now_millis(), months))
    }
}

/// Newest entry with `effective_from <= at`. `history` is oldest first.
fn effective_at(history: &[SettingHistoryEntry], at: i64) -> Option<f64> {
    history
        .iter()
        .rev()
        .find(|entry| entry.effective_from <= at)
        .map(|entry| entry.value)
}

/// Month-by-month view of `history` ending with the month of `now`
pub fn monthly_rates(history: &[SettingHistoryEntry], now: i64, months: u32) -> Vec<MonthlyRate> {
    time::trailing_month_starts(now, months)
        .into_iter()
        .map(|month_start| MonthlyRate {
            month: time::month_label(month_start),
            month_start,
            value: effective_at(history, month_start),
        })
        .collect()
}
