use anyhow::Result;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

/// Per-condominium settings document operations
pub struct SettingsRepo;

impl SettingsRepo {
    /// Fetch a condominium's settings, writing the defaults on first access
    pub async fn get(pool: &Pool<Sqlite>, condominium_id: i64) -> Result<CondominiumSettings> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM condominium_settings WHERE condominium_id = ?")
            .bind(condominium_id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some((data,)) => Ok(serde_json::from_str(&data)?),
            None => {
                let defaults = CondominiumSettings::default();
                Self::update(pool, condominium_id, &defaults).await?;
                Ok(defaults)
            }
        }
    }

    pub async fn update(pool: &Pool<Sqlite>, condominium_id: i64, settings: &CondominiumSettings) -> Result<()> {
        let data = serde_json::to_string(settings)?;
        sqlx::query(
            r#"
            INSERT INTO condominium_settings (condominium_id, data, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(condominium_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(condominium_id)
        .bind(&data)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }
}
