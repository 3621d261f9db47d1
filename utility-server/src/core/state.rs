//! 服务器状态 - 所有 handler 共享

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::billing::{BillingEngine, SettingsService};
use crate::core::{Config, Result};
use crate::db::DbService;

/// 服务器状态 - 持有配置、连接池和计费引擎
///
/// Clone 成本低 (内部均为 Arc / 连接池句柄)
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池 (CRUD 直接使用)
    pub pool: SqlitePool,
    /// 计费引擎 (开单、改单、状态流转)
    pub billing: Arc<BillingEngine>,
}

impl ServerState {
    /// 基于已打开的数据库构造状态
    pub fn new(config: Config, db: DbService) -> Self {
        let billing = Arc::new(BillingEngine::with_pool(db.pool.clone(), config.status_policy));
        Self {
            config,
            pool: db.pool,
            billing,
        }
    }

    /// 打开配置中的数据库文件并构造状态
    pub async fn initialize(config: &Config) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = DbService::new(&config.database_path).await?;
        tracing::info!(
            database = %config.database_path,
            status_policy = %config.status_policy,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db))
    }

    /// 费率设置服务
    pub fn settings(&self) -> &SettingsService {
        self.billing.settings()
    }
}
