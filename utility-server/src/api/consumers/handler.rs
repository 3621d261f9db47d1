//! Consumer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::server::ValidJson;
use crate::db::repository::{RepoError, consumer};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Consumer, ConsumerCreate, ConsumerQuery, ConsumerUpdate};
use shared::{PageRequest, PaginatedResponse};

fn map_duplicate(err: RepoError, email: &str) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::ConsumerEmailExists).with_detail("email", email),
        other => other.into(),
    }
}

/// GET /api/consumers?q=xxx - 用户列表 / 搜索 (分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ConsumerQuery>,
) -> AppResult<Json<PaginatedResponse<Consumer>>> {
    let page = PageRequest::new(query.page, query.per_page);
    let q = query.q.as_deref().filter(|q| !q.trim().is_empty());
    let (items, total) = consumer::list(&state.pool, q, page).await?;
    Ok(Json(PaginatedResponse::new(items, page, total)))
}

/// GET /api/consumers/:id - 获取单个用户
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Consumer>> {
    let consumer = consumer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConsumerNotFound).with_detail("consumer_id", id))?;
    Ok(Json(consumer))
}

/// POST /api/consumers - 创建用户
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<ConsumerCreate>,
) -> AppResult<(StatusCode, Json<Consumer>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;

    let email = payload.email.trim().to_string();
    let consumer = consumer::create(&state.pool, payload)
        .await
        .map_err(|e| map_duplicate(e, &email))?;

    tracing::info!(consumer_id = consumer.id, "Consumer created");
    Ok((StatusCode::CREATED, Json(consumer)))
}

/// PUT /api/consumers/:id - 更新用户
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<ConsumerUpdate>,
) -> AppResult<Json<Consumer>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;

    let email = payload.email.clone().unwrap_or_default();
    let consumer = consumer::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => {
                AppError::new(ErrorCode::ConsumerNotFound).with_detail("consumer_id", id)
            }
            other => map_duplicate(other, &email),
        })?;

    tracing::info!(consumer_id = id, "Consumer updated");
    Ok(Json(consumer))
}
