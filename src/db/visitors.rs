use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Pool, QueryBuilder, Sqlite};

use crate::models::*;
use super::row_helpers::{map_authorization_row, map_entry_row};

/// Visitor authorization database operations
pub struct AuthorizationRepo;

impl AuthorizationRepo {
    pub async fn list(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        resident_id: Option<i64>,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<VisitorAuthorization>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM visitor_authorizations WHERE condominium_id = ");
        qb.push_bind(condominium_id);
        if let Some(resident_id) = resident_id {
            qb.push(" AND resident_id = ").push_bind(resident_id);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(pool).await?;
        Ok(rows.iter().map(map_authorization_row).collect())
    }

    /// Every non-revoked authorization of a condominium, for gate search
    pub async fn list_active(pool: &Pool<Sqlite>, condominium_id: i64) -> Result<Vec<VisitorAuthorization>> {
        let rows = sqlx::query(
            "SELECT * FROM visitor_authorizations WHERE condominium_id = ? AND is_active = 1",
        )
        .bind(condominium_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_authorization_row).collect())
    }

    pub async fn get<'e, E>(executor: E, condominium_id: i64, id: i64) -> Result<Option<VisitorAuthorization>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query("SELECT * FROM visitor_authorizations WHERE id = ? AND condominium_id = ?")
            .bind(id)
            .bind(condominium_id)
            .fetch_optional(executor)
            .await?;
        Ok(row.as_ref().map(map_authorization_row))
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        resident_id: i64,
        req: &CreateAuthorizationRequest,
    ) -> Result<VisitorAuthorization> {
        let now = Utc::now();
        let recurring_days = serde_json::to_string(&req.recurring_days)?;
        let result = sqlx::query(
            r#"
            INSERT INTO visitor_authorizations (condominium_id, resident_id, visitor_name, identification_number,
                vehicle_plate, authorization_type, valid_from, valid_until, recurring_days, daily_from, daily_until,
                notes, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(condominium_id)
        .bind(resident_id)
        .bind(&req.visitor_name)
        .bind(req.identification_number.as_deref().unwrap_or(""))
        .bind(req.vehicle_plate.as_deref().unwrap_or(""))
        .bind(req.authorization_type.as_str())
        .bind(req.valid_from)
        .bind(req.valid_until)
        .bind(&recurring_days)
        .bind(req.daily_from)
        .bind(req.daily_until)
        .bind(req.notes.as_deref().unwrap_or(""))
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, condominium_id, result.last_insert_rowid())
            .await?
            .context("Authorization not found after creation")
    }

    pub async fn revoke(pool: &Pool<Sqlite>, condominium_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE visitor_authorizations SET is_active = 0, updated_at = ? WHERE id = ? AND condominium_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(condominium_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Authorization", &id.to_string()).into());
        }
        Ok(())
    }

    /// Consume a single-use authorization. False when it was already consumed.
    pub async fn mark_used<'e, E>(executor: E, id: i64, at: DateTime<Utc>) -> Result<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE visitor_authorizations SET used_at = ?, updated_at = ? WHERE id = ? AND used_at IS NULL",
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Gate log database operations
pub struct EntryRepo;

impl EntryRepo {
    pub async fn insert<'e, E>(executor: E, condominium_id: i64, entry: &NewVisitorEntry, at: DateTime<Utc>) -> Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO visitor_entries (condominium_id, visitor_name, identification_number, vehicle_plate,
                destination, entry_at, authorization_id, is_authorized, registered_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(condominium_id)
        .bind(&entry.visitor_name)
        .bind(entry.identification_number.as_deref().unwrap_or(""))
        .bind(entry.vehicle_plate.as_deref().unwrap_or(""))
        .bind(&entry.destination)
        .bind(at)
        .bind(entry.authorization_id)
        .bind(entry.is_authorized as i32)
        .bind(entry.registered_by)
        .bind(at)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(pool: &Pool<Sqlite>, condominium_id: i64, id: i64) -> Result<Option<VisitorEntry>> {
        let row = sqlx::query("SELECT * FROM visitor_entries WHERE id = ? AND condominium_id = ?")
            .bind(id)
            .bind(condominium_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_entry_row))
    }

    /// List entries, newest first. `window` bounds `entry_at` to `[start, end)`.
    pub async fn list(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        active: Option<bool>,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<VisitorEntry>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM visitor_entries WHERE condominium_id = ");
        qb.push_bind(condominium_id);
        match active {
            Some(true) => {
                qb.push(" AND exit_at IS NULL");
            }
            Some(false) => {
                qb.push(" AND exit_at IS NOT NULL");
            }
            None => {}
        }
        if let Some((start, end)) = window {
            qb.push(" AND entry_at >= ").push_bind(start);
            qb.push(" AND entry_at < ").push_bind(end);
        }
        qb.push(" ORDER BY entry_at DESC, id DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(pool).await?;
        Ok(rows.iter().map(map_entry_row).collect())
    }

    /// Stamp the exit time. False when the visitor had already left.
    pub async fn check_out(pool: &Pool<Sqlite>, condominium_id: i64, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE visitor_entries SET exit_at = ? WHERE id = ? AND condominium_id = ? AND exit_at IS NULL",
        )
        .bind(at)
        .bind(id)
        .bind(condominium_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
