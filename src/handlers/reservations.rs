use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::availability::rules::{self, BookingRequest};
use crate::models::*;
use crate::utils::{clean_optional, local_now};
use crate::AppState;

use super::{created, ApiError, PaginationQuery};

fn reason_of(body: Option<Json<StatusChangeRequest>>) -> Option<String> {
    body.and_then(|Json(req)| clean_optional(req.reason))
}

/// Load a reservation the caller is allowed to see
async fn get_visible(state: &AppState, auth: &AuthUser, id: i64) -> Result<Reservation, ApiError> {
    let reservation = state
        .store
        .get_reservation(auth.condominium_id()?, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation"))?;
    if auth.role() == Role::Resident && reservation.resident_id != auth.user_id()? {
        return Err(ApiError::not_found("Reservation"));
    }
    Ok(reservation)
}

pub async fn list_reservations(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReservationListQuery>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let condominium_id = auth.condominium_id()?;
    let resident_id = match auth.role() {
        Role::Resident => Some(auth.user_id()?),
        _ => None,
    };
    let filter = ReservationFilter {
        resident_id,
        status: query.status,
        area_id: query.area_id,
        date: query.date,
    };
    let (limit, offset) = page.sanitize();
    let reservations = state
        .store
        .list_reservations(condominium_id, &filter, limit, offset)
        .await?;
    Ok(Json(reservations))
}

pub async fn get_reservation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, ApiError> {
    Ok(Json(get_visible(&state, &auth, id).await?))
}

/// POST /api/reservations
pub async fn create_reservation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    auth.require(&[Role::Resident, Role::Admin])?;
    let condominium_id = auth.condominium_id()?;

    let resident_id = match (auth.role(), req.resident_id) {
        (Role::Admin, Some(resident_id)) => {
            state
                .store
                .get_user(resident_id)
                .await?
                .filter(|u| u.condominium_id == Some(condominium_id) && u.role == Role::Resident)
                .ok_or_else(|| ApiError::bad_request("resident_id does not name a resident"))?;
            resident_id
        }
        _ => auth.user_id()?,
    };

    let area = state
        .store
        .get_area(condominium_id, req.area_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Area"))?;
    let settings = state.store.get_settings(condominium_id).await?;

    let booking = BookingRequest {
        resident_id,
        date: req.date,
        start_time: req.start_time,
        end_time: rules::resolve_end_time(&area, req.start_time, req.end_time),
        guests_count: req.guests_count,
    };
    let purpose = clean_optional(req.purpose);

    let reservation = state
        .store
        .book_reservation(&area, &settings, &booking, purpose.as_deref(), local_now(&settings))
        .await?;

    tracing::info!(
        "Reservation {} on '{}' {} {}-{} ({})",
        reservation.id,
        area.name,
        reservation.date,
        reservation.start_time,
        reservation.end_time,
        reservation.status.as_str()
    );
    Ok(created(reservation))
}

/// POST /api/reservations/:id/approve
pub async fn approve_reservation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, ApiError> {
    auth.require(&[Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    let reservation = state
        .store
        .get_reservation(condominium_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation"))?;
    let area = state
        .store
        .get_area(condominium_id, reservation.area_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Area"))?;

    let approved = state.store.approve_reservation(&area, id).await?;
    tracing::info!("Reservation {} approved", id);
    Ok(Json(approved))
}

/// POST /api/reservations/:id/reject
pub async fn reject_reservation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Option<Json<StatusChangeRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    auth.require(&[Role::Admin])?;
    let reason = reason_of(body);

    let rejected = state
        .store
        .transition_reservation(
            auth.condominium_id()?,
            id,
            ReservationStatus::Rejected,
            reason.as_deref(),
            rules::check_reject,
        )
        .await?;
    tracing::info!("Reservation {} rejected", id);
    Ok(Json(rejected))
}

/// POST /api/reservations/:id/cancel
pub async fn cancel_reservation(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Option<Json<StatusChangeRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    auth.require(&[Role::Resident, Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    get_visible(&state, &auth, id).await?;

    let settings = state.store.get_settings(condominium_id).await?;
    let now = local_now(&settings);
    let reason = reason_of(body);

    let cancelled = state
        .store
        .transition_reservation(
            condominium_id,
            id,
            ReservationStatus::Cancelled,
            reason.as_deref(),
            |r| rules::check_cancel(r, now),
        )
        .await?;
    tracing::info!("Reservation {} cancelled by user {}", id, auth.claims.username);
    Ok(Json(cancelled))
}
