use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::availability;
use crate::models::*;
use crate::utils::{local_now, valid_weekdays};
use crate::AppState;

use super::{created, ApiError};

/// Validate an area definition and resolve its slot width
fn validate(req: &CreateAreaRequest, settings: &CondominiumSettings) -> Result<u32, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.available_from >= req.available_until {
        return Err(ApiError::bad_request("available_from must be before available_until"));
    }
    if !valid_weekdays(&req.allowed_days) {
        return Err(ApiError::bad_request("allowed_days must contain weekday numbers 0-6"));
    }
    if req.capacity < 0 {
        return Err(ApiError::bad_request("capacity cannot be negative"));
    }
    if req.behavior == AreaBehavior::Capacity && req.capacity == 0 {
        return Err(ApiError::bad_request("capacity areas need a positive capacity"));
    }
    if req.max_hours_per_reservation == Some(0) {
        return Err(ApiError::bad_request("max_hours_per_reservation must be positive"));
    }

    let slot_minutes = req
        .slot_minutes
        .unwrap_or(settings.reservations.default_slot_minutes);
    if slot_minutes == 0 {
        return Err(ApiError::bad_request("slot_minutes must be positive"));
    }
    Ok(slot_minutes)
}

pub async fn list_areas(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AreaListQuery>,
) -> Result<Json<Vec<ReservationArea>>, ApiError> {
    let condominium_id = auth.condominium_id()?;
    let include_inactive = query.include_inactive && auth.role() == Role::Admin;
    let areas = state.store.list_areas(condominium_id, include_inactive).await?;
    Ok(Json(areas))
}

pub async fn get_area(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationArea>, ApiError> {
    let area = state
        .store
        .get_area(auth.condominium_id()?, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Area"))?;
    Ok(Json(area))
}

pub async fn create_area(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAreaRequest>,
) -> Result<(StatusCode, Json<ReservationArea>), ApiError> {
    auth.require(&[Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    let settings = state.store.get_settings(condominium_id).await?;
    let slot_minutes = validate(&req, &settings)?;

    let area = state.store.create_area(condominium_id, &req, slot_minutes).await?;
    tracing::info!("Created {} area '{}' (id={})", area.behavior.as_str(), area.name, area.id);
    Ok(created(area))
}

pub async fn update_area(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateAreaRequest>,
) -> Result<Json<ReservationArea>, ApiError> {
    auth.require(&[Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    let settings = state.store.get_settings(condominium_id).await?;
    let slot_minutes = validate(&req, &settings)?;

    let area = state.store.update_area(condominium_id, id, &req, slot_minutes).await?;
    Ok(Json(area))
}

/// DELETE deactivates, keeping reservation history intact
pub async fn delete_area(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    auth.require(&[Role::Admin])?;
    state.store.deactivate_area(auth.condominium_id()?, id).await?;
    tracing::info!("Deactivated area {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/areas/:id/availability?date=YYYY-MM-DD
pub async fn get_availability(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<DayAvailability>, ApiError> {
    let condominium_id = auth.condominium_id()?;
    let area = state
        .store
        .get_area(condominium_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Area"))?;
    let settings = state.store.get_settings(condominium_id).await?;
    let reservations = state.store.list_active_reservations(area.id, query.date).await?;

    let day = availability::compute_day(
        &area,
        query.date,
        &reservations,
        local_now(&settings),
        Some(auth.user_id()?),
    );
    Ok(Json(day))
}
