//! Connection Repository

use super::{RepoError, RepoResult, consumer};
use shared::PageRequest;
use shared::models::{Connection, ConnectionCreate, ConnectionDetail, ConnectionQuery, ConnectionUpdate};
use sqlx::SqlitePool;

const CONNECTION_SELECT: &str = "SELECT id, consumer_id, meter_number, address, connection_date, connection_type, status, created_at, updated_at FROM connection";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Connection>> {
    let sql = format!("{CONNECTION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Connection>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Connection together with its owning consumer
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<ConnectionDetail>> {
    let Some(connection) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let consumer = consumer::find_by_id(pool, connection.consumer_id)
        .await?
        .ok_or_else(|| {
            RepoError::Database(format!(
                "Connection {id} references missing consumer {}",
                connection.consumer_id
            ))
        })?;
    Ok(Some(ConnectionDetail {
        connection,
        consumer,
    }))
}

pub async fn list(
    pool: &SqlitePool,
    query: &ConnectionQuery,
    page: PageRequest,
) -> RepoResult<(Vec<Connection>, u64)> {
    let filter = "WHERE (?1 IS NULL OR consumer_id = ?1) AND (?2 IS NULL OR status = ?2)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM connection {filter}"))
        .bind(query.consumer_id)
        .bind(query.status)
        .fetch_one(pool)
        .await?;

    let sql = format!("{CONNECTION_SELECT} {filter} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4");
    let rows = sqlx::query_as::<_, Connection>(&sql)
        .bind(query.consumer_id)
        .bind(query.status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    Ok((rows, total as u64))
}

/// Insert a connection. `connection_date` is already resolved to millis.
pub async fn create(
    pool: &SqlitePool,
    data: ConnectionCreate,
    connection_date: i64,
) -> RepoResult<Connection> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO connection (id, consumer_id, meter_number, address, connection_date, connection_type, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active', ?7, ?7)",
    )
    .bind(id)
    .bind(data.consumer_id)
    .bind(data.meter_number.trim())
    .bind(data.address.trim())
    .bind(connection_date)
    .bind(data.connection_type.unwrap_or_default())
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create connection".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ConnectionUpdate) -> RepoResult<Connection> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE connection SET address = COALESCE(?1, address), connection_type = COALESCE(?2, connection_type), status = COALESCE(?3, status), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.address.as_deref().map(str::trim))
    .bind(data.connection_type)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Connection {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Connection {id} not found")))
}
