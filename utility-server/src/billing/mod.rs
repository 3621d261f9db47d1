//! 计费核心 - 账单生成、用量计算、费率版本
//!
//! # 模块结构
//!
//! - [`BillingEngine`] - 开单、改单、状态流转
//! - [`SettingsService`] - 当前费率与历史费率查询
//! - [`traits`] - 存储接口 (账单 / 用水连接 / 设置)
//! - [`sqlite`] / [`memory`] - 存储接口的两种实现

pub mod engine;
pub mod error;
pub mod memory;
pub mod money;
pub mod settings;
pub mod sqlite;
pub mod status;
pub mod traits;

pub use engine::BillingEngine;
pub use error::{BillingError, BillingResult, ErrorKind, SettingsError, SettingsResult};
pub use settings::{MAX_HISTORY_MONTHS, SettingsService};
pub use status::StatusPolicy;
pub use traits::{BillLedger, ConnectionRegistry, SettingsStore};
