use axum::{
    extract::State,
    Json,
};
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::*;
use crate::utils::parse_timezone;
use crate::AppState;

use super::ApiError;

/// Accepted double-submit window for check-ins, in seconds
pub const CHECKIN_DEDUP_RANGE: RangeInclusive<u64> = 1..=3600;

/// Get the caller's condominium settings
pub async fn get_settings(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CondominiumSettings>, ApiError> {
    let settings = state.store.get_settings(auth.condominium_id()?).await?;
    Ok(Json(settings))
}

/// Replace the caller's condominium settings
pub async fn update_settings(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<CondominiumSettings>,
) -> Result<Json<CondominiumSettings>, ApiError> {
    auth.require(&[Role::Admin])?;
    let condominium_id = auth.condominium_id()?;

    if parse_timezone(&settings.timezone).is_none() {
        return Err(ApiError::bad_request(format!("unknown timezone '{}'", settings.timezone)));
    }
    if settings.working_hours.start >= settings.working_hours.end {
        return Err(ApiError::bad_request("working_hours.start must be before working_hours.end"));
    }
    if settings.reservations.default_slot_minutes == 0 {
        return Err(ApiError::bad_request("reservations.default_slot_minutes must be positive"));
    }
    if !CHECKIN_DEDUP_RANGE.contains(&settings.visits.checkin_dedup_seconds) {
        return Err(ApiError::bad_request(format!(
            "visits.checkin_dedup_seconds must be between {} and {}",
            CHECKIN_DEDUP_RANGE.start(),
            CHECKIN_DEDUP_RANGE.end()
        )));
    }

    state.store.update_settings(condominium_id, &settings).await?;
    tracing::info!("Updated settings for condominium {}", condominium_id);
    Ok(Json(settings))
}
