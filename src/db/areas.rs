use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_area_row;

/// Reservable area database operations, always scoped to a condominium
pub struct AreaRepo;

impl AreaRepo {
    pub async fn list(pool: &Pool<Sqlite>, condominium_id: i64, include_inactive: bool) -> Result<Vec<ReservationArea>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM reservation_areas
            WHERE condominium_id = ? AND (is_active = 1 OR ?)
            ORDER BY name
            "#,
        )
        .bind(condominium_id)
        .bind(include_inactive)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_area_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, condominium_id: i64, id: i64) -> Result<Option<ReservationArea>> {
        let row = sqlx::query("SELECT * FROM reservation_areas WHERE id = ? AND condominium_id = ?")
            .bind(id)
            .bind(condominium_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_area_row))
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        req: &CreateAreaRequest,
        slot_minutes: u32,
    ) -> Result<ReservationArea> {
        let now = Utc::now();
        let allowed_days = serde_json::to_string(&req.allowed_days)?;
        let result = sqlx::query(
            r#"
            INSERT INTO reservation_areas (condominium_id, name, area_type, capacity, behavior, allowed_days,
                available_from, available_until, slot_minutes, requires_approval, max_hours_per_reservation,
                rules, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(condominium_id)
        .bind(&req.name)
        .bind(&req.area_type)
        .bind(req.capacity)
        .bind(req.behavior.as_str())
        .bind(&allowed_days)
        .bind(req.available_from)
        .bind(req.available_until)
        .bind(slot_minutes as i64)
        .bind(req.requires_approval as i32)
        .bind(req.max_hours_per_reservation.map(|h| h as i64))
        .bind(req.rules.as_deref().unwrap_or(""))
        .bind(req.is_active as i32)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, condominium_id, result.last_insert_rowid())
            .await?
            .context("Area not found after creation")
    }

    pub async fn update(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        id: i64,
        req: &CreateAreaRequest,
        slot_minutes: u32,
    ) -> Result<ReservationArea> {
        let now = Utc::now();
        let allowed_days = serde_json::to_string(&req.allowed_days)?;
        let result = sqlx::query(
            r#"
            UPDATE reservation_areas
            SET name = ?, area_type = ?, capacity = ?, behavior = ?, allowed_days = ?,
                available_from = ?, available_until = ?, slot_minutes = ?, requires_approval = ?,
                max_hours_per_reservation = ?, rules = ?, is_active = ?, updated_at = ?
            WHERE id = ? AND condominium_id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.area_type)
        .bind(req.capacity)
        .bind(req.behavior.as_str())
        .bind(&allowed_days)
        .bind(req.available_from)
        .bind(req.available_until)
        .bind(slot_minutes as i64)
        .bind(req.requires_approval as i32)
        .bind(req.max_hours_per_reservation.map(|h| h as i64))
        .bind(req.rules.as_deref().unwrap_or(""))
        .bind(req.is_active as i32)
        .bind(now)
        .bind(id)
        .bind(condominium_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Area", &id.to_string()).into());
        }

        Self::get(pool, condominium_id, id)
            .await?
            .context("Area not found after update")
    }

    /// Soft delete: the area stops accepting bookings but keeps its history
    pub async fn deactivate(pool: &Pool<Sqlite>, condominium_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE reservation_areas SET is_active = 0, updated_at = ? WHERE id = ? AND condominium_id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(condominium_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Area", &id.to_string()).into());
        }
        Ok(())
    }
}
