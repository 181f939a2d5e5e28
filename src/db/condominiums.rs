use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_condominium_row;

pub struct CondominiumRepo;

impl CondominiumRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Condominium>> {
        let rows = sqlx::query("SELECT * FROM condominiums ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_condominium_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Condominium>> {
        let row = sqlx::query("SELECT * FROM condominiums WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_condominium_row))
    }

    pub async fn get_by_name(pool: &Pool<Sqlite>, name: &str) -> Result<Option<Condominium>> {
        let row = sqlx::query("SELECT * FROM condominiums WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_condominium_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateCondominiumRequest) -> Result<Condominium> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO condominiums (name, address, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(req.address.as_deref().unwrap_or(""))
        .bind(&req.status)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get(pool, new_id)
            .await?
            .context("Condominium not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateCondominiumRequest) -> Result<Condominium> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE condominiums SET name = ?, address = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(req.address.as_deref().unwrap_or(""))
        .bind(&req.status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Condominium", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Condominium not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM condominiums WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Condominium", &id.to_string()).into());
        }
        Ok(())
    }
}
