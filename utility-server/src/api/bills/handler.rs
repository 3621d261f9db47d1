//! Bill API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::server::ValidJson;
use crate::db::repository::bill;
use crate::utils::AppResult;
use shared::models::{Bill, BillCreate, BillDetail, BillQuery, BillStatusUpdate, BillUpdate};
use shared::{PageRequest, PaginatedResponse};

/// GET /api/bills - 账单列表 (按连接、用户、状态、账期筛选，分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<BillQuery>,
) -> AppResult<Json<PaginatedResponse<Bill>>> {
    let page = PageRequest::new(query.page, query.per_page);
    let (items, total) = bill::list(&state.pool, &query, page).await?;
    Ok(Json(PaginatedResponse::new(items, page, total)))
}

/// GET /api/bills/:id - 获取单个账单 (含连接和用户)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BillDetail>> {
    let detail = state.billing.get_bill(id).await?;
    Ok(Json(detail))
}

/// POST /api/bills - 开单
pub async fn create(
    State(state): State<ServerState>,
    ValidJson(payload): ValidJson<BillCreate>,
) -> AppResult<(StatusCode, Json<BillDetail>)> {
    let detail = state.billing.add_bill(payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/bills/:id - 修改截止日期 / 表读数
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<BillUpdate>,
) -> AppResult<Json<BillDetail>> {
    let detail = state.billing.update_bill(id, payload).await?;
    Ok(Json(detail))
}

/// PATCH /api/bills/:id/status - 修改缴费状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<BillStatusUpdate>,
) -> AppResult<Json<BillDetail>> {
    let detail = state.billing.update_bill_status(id, &payload.status).await?;
    Ok(Json(detail))
}

/// DELETE /api/bills/:id - 删除账单
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.billing.delete_bill(id).await?;
    Ok(Json(true))
}
