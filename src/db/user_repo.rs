//! Repository functions for manipulating rows in the `users` table.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// How far a user may edit zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermEdit {
    /// Every zone.
    All,
    /// Zones the user owns.
    Own,
    /// Owned zones, but not their SOA or NS records.
    OwnAsClient,
    /// Read only.
    None,
}

impl PermEdit {
    pub fn as_str(self) -> &'static str {
        match self {
            PermEdit::All => "all",
            PermEdit::Own => "own",
            PermEdit::OwnAsClient => "own_as_client",
            PermEdit::None => "none",
        }
    }
}

impl FromStr for PermEdit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PermEdit::All),
            "own" => Ok(PermEdit::Own),
            "own_as_client" => Ok(PermEdit::OwnAsClient),
            "none" => Ok(PermEdit::None),
            other => anyhow::bail!("unknown edit permission: {other}"),
        }
    }
}

impl fmt::Display for PermEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level representation of a stored user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
    pub perm_edit: PermEdit,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Determine whether a username is taken.
pub async fn exists(db: &SqlitePool, username: &str) -> sqlx::Result<bool> {
    let cnt: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(db)
        .await?;
    Ok(cnt.0 > 0)
}

pub async fn find_by_username(db: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT
            id,
            username,
            password_hash,
            fullname,
            perm_edit,
            active,
            created_at,
            updated_at,
            last_login_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    // Unknown permission strings fall back to read-only.
    let perm_edit = row
        .get::<String, _>("perm_edit")
        .parse()
        .unwrap_or(PermEdit::None);

    Ok(Some(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        fullname: row.get("fullname"),
        perm_edit,
        active: row.get::<i64, _>("active") != 0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        last_login_at: row.get("last_login_at"),
    }))
}

/// Create a new active user.
pub async fn insert(
    db: &SqlitePool,
    username: &str,
    password_hash: &str,
    fullname: &str,
    perm_edit: PermEdit,
) -> sqlx::Result<i64> {
    let now = Utc::now();

    let res = sqlx::query(
        r#"
        INSERT INTO users (
            username,
            password_hash,
            fullname,
            perm_edit,
            active,
            created_at,
            updated_at,
            last_login_at
        ) VALUES (?, ?, ?, ?, 1, ?, ?, NULL)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(fullname)
    .bind(perm_edit.as_str())
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(res.last_insert_rowid())
}

/// Update the user's last successful login timestamp.
pub async fn update_last_login(db: &SqlitePool, user_id: i64) -> sqlx::Result<()> {
    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE users
        SET last_login_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(())
}
