//! Settings API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::billing::{SettingsError, SettingsService};
use crate::core::ServerState;
use crate::server::ValidJson;
use crate::utils::{AppResult, time};
use shared::models::{EffectiveRate, MonthlyRate, Settings, SettingsUpdate};
use shared::types::DateInput;

const DEFAULT_HISTORY_MONTHS: u32 = 12;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub key: String,
    pub months: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EffectiveQuery {
    pub key: String,
    /// Defaults to now
    pub date: Option<String>,
}

/// GET /api/settings - 获取当前设置
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<Settings>> {
    let settings = state.settings().get_settings().await?;
    Ok(Json(settings))
}

/// PATCH /api/settings - 修改单项设置并记录历史
pub async fn update(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<SettingsUpdate>,
) -> AppResult<Json<Settings>> {
    let key = SettingsService::parse_key(&payload.key)?;
    state.settings().update_rate(key, payload.value).await?;
    let settings = state.settings().get_settings().await?;
    Ok(Json(settings))
}

/// GET /api/settings/history?key=xxx&months=12 - 按月查看历史费率
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<MonthlyRate>>> {
    let key = SettingsService::parse_key(&query.key)?;
    let months = query.months.unwrap_or(DEFAULT_HISTORY_MONTHS);
    let rates = state.settings().get_monthly_history(key, months).await?;
    Ok(Json(rates))
}

/// GET /api/settings/effective?key=xxx&date=2025-01-01 - 某时间点生效的费率
pub async fn effective(
    State(state): State<ServerState>,
    Query(query): Query<EffectiveQuery>,
) -> AppResult<Json<EffectiveRate>> {
    let key = SettingsService::parse_key(&query.key)?;
    let at = match query.date {
        Some(date) => time::parse_instant(&DateInput::Text(date)).map_err(SettingsError::from)?,
        None => shared::util::now_millis(),
    };
    let value = state.settings().get_rate_effective_at(key, at).await?;
    Ok(Json(EffectiveRate { key, at, value }))
}
