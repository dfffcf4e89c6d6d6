//! Queries over `domains` and the `zones` ownership table.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ZoneKind {
    Master,
    Slave,
    Native,
}

impl ZoneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Master => "MASTER",
            ZoneKind::Slave => "SLAVE",
            ZoneKind::Native => "NATIVE",
        }
    }
}

impl FromStr for ZoneKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MASTER" => Ok(ZoneKind::Master),
            "SLAVE" => Ok(ZoneKind::Slave),
            "NATIVE" => Ok(ZoneKind::Native),
            other => anyhow::bail!("unknown zone type: {other}"),
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    pub master: Option<String>,
}

impl Zone {
    pub fn is_reverse(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".arpa")
    }
}

fn zone_from_row(row: &sqlx::sqlite::SqliteRow) -> Zone {
    Zone {
        id: row.get("id"),
        name: row.get("name"),
        kind: row
            .get::<String, _>("type")
            .parse()
            .unwrap_or(ZoneKind::Native),
        master: row.get("master"),
    }
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<Zone>> {
    let row = sqlx::query("SELECT id, name, type, master FROM domains WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.as_ref().map(zone_from_row))
}

pub async fn exists_by_name(db: &SqlitePool, name: &str) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM domains WHERE name = ?")
        .bind(name)
        .fetch_one(db)
        .await?;
    Ok(cnt.0 > 0)
}

/// `(id, name)` of every reverse zone, longest name first.
pub async fn reverse_zones(db: &SqlitePool) -> sqlx::Result<Vec<(i64, String)>> {
    sqlx::query_as(
        "SELECT id, name FROM domains WHERE name LIKE '%.arpa' ORDER BY length(name) DESC",
    )
    .fetch_all(db)
    .await
}

/// Zones visible to `owner`, or all zones when `owner` is `None`.
pub async fn list(db: &SqlitePool, owner: Option<i64>) -> sqlx::Result<Vec<Zone>> {
    let rows = match owner {
        Some(owner) => {
            sqlx::query(
                r#"
                SELECT DISTINCT d.id, d.name, d.type, d.master
                FROM domains d
                JOIN zones z ON z.domain_id = d.id
                WHERE z.owner = ?
                ORDER BY d.name
                "#,
            )
            .bind(owner)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query("SELECT id, name, type, master FROM domains ORDER BY name")
                .fetch_all(db)
                .await?
        }
    };
    Ok(rows.iter().map(zone_from_row).collect())
}

pub async fn is_owner(db: &SqlitePool, zone_id: i64, user_id: i64) -> sqlx::Result<bool> {
    let cnt: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM zones WHERE domain_id = ? AND owner = ?")
            .bind(zone_id)
            .bind(user_id)
            .fetch_one(db)
            .await?;
    Ok(cnt.0 > 0)
}

/// Insert the `domains` row and its ownership entry.
pub async fn insert(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    kind: ZoneKind,
    master: Option<&str>,
    owner: i64,
) -> sqlx::Result<i64> {
    let res = sqlx::query("INSERT INTO domains (name, type, master) VALUES (?, ?, ?)")
        .bind(name)
        .bind(kind.as_str())
        .bind(master)
        .execute(&mut **tx)
        .await?;
    let zone_id = res.last_insert_rowid();

    sqlx::query("INSERT INTO zones (domain_id, owner, comment) VALUES (?, ?, '')")
        .bind(zone_id)
        .bind(owner)
        .execute(&mut **tx)
        .await?;

    Ok(zone_id)
}

/// Remove a zone with its records, ownership and template links.
pub async fn delete(tx: &mut Transaction<'_, Sqlite>, zone_id: i64) -> sqlx::Result<()> {
    for stmt in [
        "DELETE FROM zones WHERE domain_id = ?",
        "DELETE FROM records WHERE domain_id = ?",
        "DELETE FROM records_zone_templ WHERE domain_id = ?",
        "DELETE FROM domains WHERE id = ?",
    ] {
        sqlx::query(stmt).bind(zone_id).execute(&mut **tx).await?;
    }
    Ok(())
}
