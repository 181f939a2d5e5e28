use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Pool, QueryBuilder, Sqlite};

use crate::availability::rules::BookingRequest;
use crate::models::*;
use super::row_helpers::map_reservation_row;

/// Reservation database operations
pub struct ReservationRepo;

impl ReservationRepo {
    pub async fn list(
        pool: &Pool<Sqlite>,
        condominium_id: i64,
        filter: &ReservationFilter,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<Reservation>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM reservations WHERE condominium_id = ");
        qb.push_bind(condominium_id);
        if let Some(resident_id) = filter.resident_id {
            qb.push(" AND resident_id = ").push_bind(resident_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(area_id) = filter.area_id {
            qb.push(" AND area_id = ").push_bind(area_id);
        }
        if let Some(date) = filter.date {
            qb.push(" AND date = ").push_bind(date);
        }
        qb.push(" ORDER BY date DESC, start_time DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build().fetch_all(pool).await?;
        Ok(rows.iter().map(map_reservation_row).collect())
    }

    pub async fn get<'e, E>(executor: E, condominium_id: i64, id: i64) -> Result<Option<Reservation>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query("SELECT * FROM reservations WHERE id = ? AND condominium_id = ?")
            .bind(id)
            .bind(condominium_id)
            .fetch_optional(executor)
            .await?;
        Ok(row.as_ref().map(map_reservation_row))
    }

    /// Pending and approved reservations holding time on an area for one date
    pub async fn list_active_for_area_date<'e, E>(executor: E, area_id: i64, date: NaiveDate) -> Result<Vec<Reservation>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query(
            r#"
            SELECT * FROM reservations
            WHERE area_id = ? AND date = ? AND status IN ('pending', 'approved')
            ORDER BY start_time
            "#,
        )
        .bind(area_id)
        .bind(date)
        .fetch_all(executor)
        .await?;
        Ok(rows.iter().map(map_reservation_row).collect())
    }

    /// Pending reservations dated on or before `date`, across all condominiums
    pub async fn list_pending_through(pool: &Pool<Sqlite>, date: NaiveDate) -> Result<Vec<Reservation>> {
        let rows = sqlx::query("SELECT * FROM reservations WHERE status = 'pending' AND date <= ?")
            .bind(date)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_reservation_row).collect())
    }

    pub async fn insert<'e, E>(
        executor: E,
        condominium_id: i64,
        area_id: i64,
        booking: &BookingRequest,
        purpose: Option<&str>,
        status: ReservationStatus,
    ) -> Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (condominium_id, area_id, resident_id, date, start_time, end_time,
                guests_count, purpose, status, cancellation_reason, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '', ?, ?)
            "#,
        )
        .bind(condominium_id)
        .bind(area_id)
        .bind(booking.resident_id)
        .bind(booking.date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.guests_count)
        .bind(purpose.unwrap_or(""))
        .bind(status.as_str())
        .bind(now)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn set_status<'e, E>(
        executor: E,
        condominium_id: i64,
        id: i64,
        status: ReservationStatus,
        reason: Option<&str>,
    ) -> Result<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, cancellation_reason = COALESCE(?, cancellation_reason), updated_at = ?
            WHERE id = ? AND condominium_id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(Utc::now())
        .bind(id)
        .bind(condominium_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Reservation", &id.to_string()).into());
        }
        Ok(())
    }

    pub async fn get_required(pool: &Pool<Sqlite>, condominium_id: i64, id: i64) -> Result<Reservation> {
        Self::get(pool, condominium_id, id)
            .await?
            .context("Reservation not found after update")
    }
}
