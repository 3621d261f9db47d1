//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`bills`] - 账单接口 (开单、改单、状态、删除、列表)
//! - [`settings`] - 计费设置与历史费率
//! - [`consumers`] - 用户管理
//! - [`connections`] - 用水连接管理

pub mod bills;
pub mod connections;
pub mod consumers;
pub mod health;
pub mod settings;

pub use crate::utils::AppResult;
