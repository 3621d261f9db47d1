//! Consumer Repository

use super::{RepoError, RepoResult};
use shared::PageRequest;
use shared::models::{Consumer, ConsumerCreate, ConsumerUpdate};
use sqlx::SqlitePool;

const CONSUMER_SELECT: &str =
    "SELECT id, name, email, phone, address, is_active, created_at, updated_at FROM consumer";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Consumer>> {
    let sql = format!("{CONSUMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Consumer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Page of consumers, newest first. `q` matches name, email or phone.
pub async fn list(
    pool: &SqlitePool,
    q: Option<&str>,
    page: PageRequest,
) -> RepoResult<(Vec<Consumer>, u64)> {
    let pattern = q.map(|q| format!("%{}%", q.trim()));
    let filter = "WHERE (?1 IS NULL OR name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM consumer {filter}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    let sql = format!("{CONSUMER_SELECT} {filter} ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3");
    let rows = sqlx::query_as::<_, Consumer>(&sql)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    Ok((rows, total as u64))
}

pub async fn create(pool: &SqlitePool, data: ConsumerCreate) -> RepoResult<Consumer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO consumer (id, name, email, phone, address, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.email.trim())
    .bind(&data.phone)
    .bind(&data.address)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create consumer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ConsumerUpdate) -> RepoResult<Consumer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE consumer SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), address = COALESCE(?4, address), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.email.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Consumer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Consumer {id} not found")))
}
