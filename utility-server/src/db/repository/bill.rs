//! Bill Repository
//!
//! Plain storage for bills. Consumption, amounts and status rules live in
//! the billing engine; this layer only reads and writes rows.

use super::RepoResult;
use shared::PageRequest;
use shared::models::{Bill, BillQuery, BillStatus};
use sqlx::SqlitePool;

const BILL_SELECT: &str = "SELECT b.id, b.connection_id, b.month_of, b.due_date, b.meter_reading, b.charge_per_cubic_meter, b.consumed_units, b.amount, b.status, b.paid_at, b.created_at, b.updated_at FROM bill b";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Bill>> {
    let sql = format!("{BILL_SELECT} WHERE b.id = ?");
    let row = sqlx::query_as::<_, Bill>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_connection_and_month(
    pool: &SqlitePool,
    connection_id: i64,
    month_of: i64,
) -> RepoResult<Option<Bill>> {
    let sql = format!("{BILL_SELECT} WHERE b.connection_id = ? AND b.month_of = ?");
    let row = sqlx::query_as::<_, Bill>(&sql)
        .bind(connection_id)
        .bind(month_of)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Latest bill of a connection by billing month, regardless of status
pub async fn find_last_by_connection(
    pool: &SqlitePool,
    connection_id: i64,
) -> RepoResult<Option<Bill>> {
    let sql = format!("{BILL_SELECT} WHERE b.connection_id = ? ORDER BY b.month_of DESC LIMIT 1");
    let row = sqlx::query_as::<_, Bill>(&sql)
        .bind(connection_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Latest bill of a connection strictly before `before_month`
pub async fn find_previous(
    pool: &SqlitePool,
    connection_id: i64,
    before_month: i64,
) -> RepoResult<Option<Bill>> {
    let sql = format!(
        "{BILL_SELECT} WHERE b.connection_id = ? AND b.month_of < ? ORDER BY b.month_of DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Bill>(&sql)
        .bind(connection_id)
        .bind(before_month)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert(pool: &SqlitePool, bill: &Bill) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO bill (id, connection_id, month_of, due_date, meter_reading, charge_per_cubic_meter, consumed_units, amount, status, paid_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(bill.id)
    .bind(bill.connection_id)
    .bind(bill.month_of)
    .bind(bill.due_date)
    .bind(bill.meter_reading)
    .bind(bill.charge_per_cubic_meter)
    .bind(bill.consumed_units)
    .bind(bill.amount)
    .bind(bill.status)
    .bind(bill.paid_at)
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Persist the editable, non-status fields of a bill
pub async fn update_fields(pool: &SqlitePool, bill: &Bill) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE bill SET due_date = ?1, meter_reading = ?2, consumed_units = ?3, amount = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(bill.due_date)
    .bind(bill.meter_reading)
    .bind(bill.consumed_units)
    .bind(bill.amount)
    .bind(bill.updated_at)
    .bind(bill.id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: BillStatus,
    paid_at: Option<i64>,
    updated_at: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE bill SET status = ?1, paid_at = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(status)
        .bind(paid_at)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM bill WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Filtered page of bills, newest billing month first
pub async fn list(
    pool: &SqlitePool,
    query: &BillQuery,
    page: PageRequest,
) -> RepoResult<(Vec<Bill>, u64)> {
    let from = "FROM bill b JOIN connection c ON c.id = b.connection_id";
    let filter = "WHERE (?1 IS NULL OR b.connection_id = ?1) AND (?2 IS NULL OR c.consumer_id = ?2) AND (?3 IS NULL OR b.status = ?3) AND (?4 IS NULL OR b.month_of >= ?4) AND (?5 IS NULL OR b.month_of <= ?5)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {from} {filter}"))
        .bind(query.connection_id)
        .bind(query.consumer_id)
        .bind(query.status)
        .bind(query.month_from)
        .bind(query.month_to)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT b.id, b.connection_id, b.month_of, b.due_date, b.meter_reading, b.charge_per_cubic_meter, b.consumed_units, b.amount, b.status, b.paid_at, b.created_at, b.updated_at {from} {filter} ORDER BY b.month_of DESC, b.id DESC LIMIT ?6 OFFSET ?7"
    );
    let rows = sqlx::query_as::<_, Bill>(&sql)
        .bind(query.connection_id)
        .bind(query.consumer_id)
        .bind(query.status)
        .bind(query.month_from)
        .bind(query.month_to)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    Ok((rows, total as u64))
}
