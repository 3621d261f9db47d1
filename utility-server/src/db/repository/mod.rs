//! Repository Module
//!
//! CRUD over the SQLite tables. Every function takes `&SqlitePool` and
//! returns [`RepoResult`]; dates arrive here already normalized to millis.

pub mod bill;
pub mod connection;
pub mod consumer;
pub mod settings;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::DbService;
    use shared::models::{Connection, ConnectionCreate, Consumer, ConsumerCreate};
    use sqlx::SqlitePool;

    pub async fn pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    pub async fn seed_consumer(pool: &SqlitePool, email: &str) -> Consumer {
        super::consumer::create(
            pool,
            ConsumerCreate {
                name: "Ana Souza".into(),
                email: email.into(),
                phone: Some("+55 11 5555-0101".into()),
                address: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn seed_connection(pool: &SqlitePool, consumer_id: i64, meter: &str) -> Connection {
        super::connection::create(
            pool,
            ConnectionCreate {
                consumer_id,
                meter_number: meter.into(),
                address: "Rua das Flores 12".into(),
                connection_date: None,
                connection_type: None,
            },
            1_700_000_000_000,
        )
        .await
        .unwrap()
    }
}
