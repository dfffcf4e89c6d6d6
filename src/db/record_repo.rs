//! Queries over the PowerDNS `records` table.
use serde::Serialize;
use sqlx::{SqliteExecutor, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Record {
    pub id: i64,
    pub domain_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub rtype: String,
    pub content: String,
    pub ttl: i64,
    pub prio: i64,
    pub disabled: bool,
}

/// Values written by [`insert`] and [`update`].
#[derive(Debug, Clone, Copy)]
pub struct NewRecord<'a> {
    pub domain_id: i64,
    pub name: &'a str,
    pub rtype: &'a str,
    pub content: &'a str,
    pub ttl: u32,
    pub prio: u16,
}

const RECORD_COLUMNS: &str = "id, domain_id, name, type, content, ttl, prio, disabled";

pub async fn find_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Record>> {
    sqlx::query_as(&format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_by_zone(db: &SqlitePool, zone_id: i64) -> sqlx::Result<Vec<Record>> {
    sqlx::query_as(&format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE domain_id = ? ORDER BY name, type, id"
    ))
    .bind(zone_id)
    .fetch_all(db)
    .await
}

/// Whether an identical (name, type, content) record is already stored.
pub async fn record_exists(
    db: &SqlitePool,
    zone_id: i64,
    name: &str,
    rtype: &str,
    content: &str,
) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM records
        WHERE domain_id = ? AND lower(name) = lower(?) AND type = ? AND content = ?
        "#,
    )
    .bind(zone_id)
    .bind(name)
    .bind(rtype)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(cnt.0 > 0)
}

/// Whether a CNAME named `name` exists, ignoring record `exclude`.
pub async fn cname_exists(db: &SqlitePool, name: &str, exclude: Option<i64>) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM records WHERE lower(name) = lower(?) AND type = 'CNAME' AND id != ?",
    )
    .bind(name)
    .bind(exclude.unwrap_or(-1))
    .fetch_one(db)
    .await?;
    Ok(cnt.0 > 0)
}

/// Whether any record at all is named `name`, ignoring record `exclude`.
pub async fn other_record_at(
    db: &SqlitePool,
    name: &str,
    exclude: Option<i64>,
) -> sqlx::Result<bool> {
    let cnt: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM records WHERE lower(name) = lower(?) AND id != ?")
            .bind(name)
            .bind(exclude.unwrap_or(-1))
            .fetch_one(db)
            .await?;
    Ok(cnt.0 > 0)
}

/// Whether an MX or NS record has `name` as its target.
pub async fn mx_or_ns_pointing_to(db: &SqlitePool, name: &str) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM records WHERE lower(content) = lower(?) AND type IN ('MX', 'NS')",
    )
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(cnt.0 > 0)
}

pub async fn soa_exists_in_zone(
    db: &SqlitePool,
    zone_id: i64,
    exclude: Option<i64>,
) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM records WHERE domain_id = ? AND type = 'SOA' AND id != ?",
    )
    .bind(zone_id)
    .bind(exclude.unwrap_or(-1))
    .fetch_one(db)
    .await?;
    Ok(cnt.0 > 0)
}

/// `(id, content)` of the zone's SOA record.
pub async fn soa_of_zone<'e>(
    db: impl SqliteExecutor<'e>,
    zone_id: i64,
) -> sqlx::Result<Option<(i64, String)>> {
    sqlx::query_as("SELECT id, content FROM records WHERE domain_id = ? AND type = 'SOA' LIMIT 1")
        .bind(zone_id)
        .fetch_optional(db)
        .await
}

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, rec: NewRecord<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(
        r#"
        INSERT INTO records (domain_id, name, type, content, ttl, prio, disabled)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(rec.domain_id)
    .bind(rec.name)
    .bind(rec.rtype)
    .bind(rec.content)
    .bind(i64::from(rec.ttl))
    .bind(i64::from(rec.prio))
    .execute(db)
    .await?;
    Ok(res.last_insert_rowid())
}

pub async fn update<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    rec: NewRecord<'_>,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE records
        SET name = ?, type = ?, content = ?, ttl = ?, prio = ?
        WHERE id = ?
        "#,
    )
    .bind(rec.name)
    .bind(rec.rtype)
    .bind(rec.content)
    .bind(i64::from(rec.ttl))
    .bind(i64::from(rec.prio))
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn update_content<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
    content: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE records SET content = ? WHERE id = ?")
        .bind(content)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM records WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
