//! Settings API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/settings | GET | 当前设置 |
//! | /api/settings | PATCH | 修改单项设置 `{key, value}` |
//! | /api/settings/history | GET | 按月历史 `?key=&months=` |
//! | /api/settings/effective | GET | 某时间点生效值 `?key=&date=` |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get).patch(handler::update))
        .route("/history", get(handler::history))
        .route("/effective", get(handler::effective))
}
