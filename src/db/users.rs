use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::models::*;
use super::row_helpers::map_user_row;

/// User database operations. `scope` restricts a query to one condominium.
pub struct UserRepo;

impl UserRepo {
    pub async fn list(pool: &Pool<Sqlite>, scope: Option<i64>) -> Result<Vec<User>> {
        let rows = match scope {
            Some(condominium_id) => {
                sqlx::query("SELECT * FROM users WHERE condominium_id = ? ORDER BY username")
                    .bind(condominium_id)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM users ORDER BY username")
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows.iter().map(map_user_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn get_by_username(pool: &Pool<Sqlite>, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        condominium_id: Option<i64>,
        req: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (condominium_id, username, full_name, role, unit, password_hash, enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(condominium_id)
        .bind(&req.username)
        .bind(&req.full_name)
        .bind(req.role.as_str())
        .bind(req.unit.as_deref().unwrap_or(""))
        .bind(password_hash)
        .bind(req.enabled as i32)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("User not found after creation")
    }

    pub async fn update(
        pool: &Pool<Sqlite>,
        id: i64,
        req: &UpdateUserRequest,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, full_name = ?, role = ?, unit = ?, enabled = ?,
                password_hash = COALESCE(?, password_hash), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.username)
        .bind(&req.full_name)
        .bind(req.role.as_str())
        .bind(req.unit.as_deref().unwrap_or(""))
        .bind(req.enabled as i32)
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("User", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("User not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("User", &id.to_string()).into());
        }
        Ok(())
    }
}

/// Refresh token database operations
pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    pub async fn create(pool: &Pool<Sqlite>, token: &str, user_id: i64, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, expires_at, revoked, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn get(pool: &Pool<Sqlite>, token: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query("SELECT token, user_id, expires_at, revoked FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| {
            let revoked: i32 = r.get("revoked");
            RefreshToken {
                token: r.get("token"),
                user_id: r.get("user_id"),
                expires_at: r.get("expires_at"),
                revoked: revoked == 1,
            }
        }))
    }

    /// Mark a token revoked. Returns false when it was unknown or already revoked.
    pub async fn revoke(pool: &Pool<Sqlite>, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token = ? AND revoked = 0")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_expired_before(pool: &Pool<Sqlite>, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
