//! Connection API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::server::ValidJson;
use crate::db::repository::{RepoError, connection, consumer};
use crate::utils::validation::{MAX_ADDRESS_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode, time};
use shared::models::{Connection, ConnectionCreate, ConnectionDetail, ConnectionQuery, ConnectionUpdate};
use shared::{PageRequest, PaginatedResponse};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ConnectionNotFound).with_detail("connection_id", id)
}

/// GET /api/connections?consumer_id=xxx - 用水连接列表 (分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ConnectionQuery>,
) -> AppResult<Json<PaginatedResponse<Connection>>> {
    let page = PageRequest::new(query.page, query.per_page);
    let (items, total) = connection::list(&state.pool, &query, page).await?;
    Ok(Json(PaginatedResponse::new(items, page, total)))
}

/// GET /api/connections/:id - 获取单个连接 (含用户)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ConnectionDetail>> {
    let detail = connection::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail))
}

/// POST /api/connections - 新建用水连接
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<ConnectionCreate>,
) -> AppResult<(StatusCode, Json<Connection>)> {
    validate_required_text(&payload.meter_number, "meter_number", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;

    consumer::find_by_id(&state.pool, payload.consumer_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::ConsumerNotFound).with_detail("consumer_id", payload.consumer_id)
        })?;

    let connection_date = match &payload.connection_date {
        Some(date) => time::parse_instant(date).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, e.to_string())
                .with_detail("field", "connection_date")
        })?,
        None => shared::util::now_millis(),
    };

    let meter_number = payload.meter_number.trim().to_string();
    let connection = connection::create(&state.pool, payload, connection_date)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                AppError::new(ErrorCode::MeterNumberExists).with_detail("meter_number", meter_number.as_str())
            }
            other => other.into(),
        })?;

    tracing::info!(
        connection_id = connection.id,
        consumer_id = connection.consumer_id,
        meter_number = %connection.meter_number,
        "Connection created"
    );
    Ok((StatusCode::CREATED, Json(connection)))
}

/// PUT /api/connections/:id - 更新地址、类型、状态
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<ConnectionUpdate>,
) -> AppResult<Json<Connection>> {
    if let Some(address) = &payload.address {
        validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    }

    let connection = connection::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;

    tracing::info!(connection_id = id, status = ?connection.status, "Connection updated");
    Ok(Json(connection))
}
