//! Utility Server - 水务后台计费服务
//!
//! # 架构概述
//!
//! - **计费** (`billing`): 开单、用量计算、状态流转、费率版本
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (sqlx)
//! - **HTTP API** (`api`): RESTful 接口 (账单、设置、用户、用水连接)
//!
//! # 模块结构
//!
//! ```text
//! utility-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── billing/       # 计费引擎、设置服务、存储接口
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件
//! ├── server/        # 中间件
//! ├── utils/         # 日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod billing;
pub mod core;
pub mod db;
pub mod routes;
pub mod server;
pub mod utils;

// Re-export 公共类型
pub use billing::{BillingEngine, SettingsService, StatusPolicy};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`，按配置初始化日志
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    // .env 不存在不算错误
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
  __  ____  _ ___ __
 / / / / /_(_) (_) /___ __
/ /_/ / __/ / / / __/ // /
\____/\__/_/_/_/\__/\_, /
    ___  _ ____    /___/
   / _ )(_) / (_)__  ___ _
  / _  / / / / / _ \/ _ `/
 /____/_/_/_/_/_//_/\_, /
                   /___/
    "#
    );
}
