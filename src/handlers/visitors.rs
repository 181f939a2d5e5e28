use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthUser;
use crate::checkin::{self, matching, validity, CheckinError};
use crate::models::*;
use crate::utils::{clean_optional, local_day_bounds, valid_weekdays};
use crate::AppState;

use super::{created, ApiError, PaginationQuery};

// ========== Authorizations ==========

fn validate_authorization(req: &CreateAuthorizationRequest) -> Result<(), ApiError> {
    if req.visitor_name.trim().is_empty() {
        return Err(ApiError::bad_request("visitor_name is required"));
    }
    if let (Some(from), Some(until)) = (req.valid_from, req.valid_until) {
        if from >= until {
            return Err(ApiError::bad_request("valid_from must be before valid_until"));
        }
    }
    if let (Some(from), Some(until)) = (req.daily_from, req.daily_until) {
        if from >= until {
            return Err(ApiError::bad_request("daily_from must be before daily_until"));
        }
    }
    if !valid_weekdays(&req.recurring_days) {
        return Err(ApiError::bad_request("recurring_days must contain weekday numbers 0-6"));
    }
    if req.authorization_type == AuthorizationType::Recurring && req.recurring_days.is_empty() {
        return Err(ApiError::bad_request("recurring authorizations need at least one day"));
    }
    if req.authorization_type == AuthorizationType::Extended && req.valid_until.is_none() {
        return Err(ApiError::bad_request("extended authorizations need valid_until"));
    }
    Ok(())
}

/// Load an authorization the caller is allowed to see
async fn get_visible(state: &AppState, auth: &AuthUser, id: i64) -> Result<VisitorAuthorization, ApiError> {
    let authorization = state
        .store
        .get_authorization(auth.condominium_id()?, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Authorization"))?;
    if auth.role() == Role::Resident && authorization.resident_id != auth.user_id()? {
        return Err(ApiError::not_found("Authorization"));
    }
    Ok(authorization)
}

pub async fn list_authorizations(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Vec<AuthorizationView>>, ApiError> {
    auth.require(&[Role::Resident, Role::Admin, Role::Guard])?;
    let condominium_id = auth.condominium_id()?;
    let resident_id = match auth.role() {
        Role::Resident => Some(auth.user_id()?),
        _ => None,
    };
    let (limit, offset) = page.sanitize();

    let settings = state.store.get_settings(condominium_id).await?;
    let now = Utc::now();
    let views = state
        .store
        .list_authorizations(condominium_id, resident_id, limit, offset)
        .await?
        .into_iter()
        .map(|a| validity::view(a, &settings, now))
        .collect();
    Ok(Json(views))
}

pub async fn create_authorization(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<CreateAuthorizationRequest>,
) -> Result<(StatusCode, Json<AuthorizationView>), ApiError> {
    let condominium_id = auth.condominium_id()?;
    req.visitor_name = req.visitor_name.trim().to_string();
    req.identification_number = clean_optional(req.identification_number.take());
    req.vehicle_plate = clean_optional(req.vehicle_plate.take());
    req.notes = clean_optional(req.notes.take());
    validate_authorization(&req)?;

    let resident_id = match auth.role() {
        Role::Resident => auth.user_id()?,
        Role::Admin | Role::Guard => {
            if auth.role() == Role::Guard && req.authorization_type != AuthorizationType::Manual {
                return Err(ApiError::forbidden("guards can only create manual authorizations"));
            }
            let resident_id = req
                .resident_id
                .ok_or_else(|| ApiError::bad_request("resident_id is required"))?;
            state
                .store
                .get_user(resident_id)
                .await?
                .filter(|u| u.condominium_id == Some(condominium_id) && u.role == Role::Resident)
                .ok_or_else(|| ApiError::bad_request("resident_id does not name a resident"))?;
            resident_id
        }
        Role::Superadmin => return Err(ApiError::forbidden("insufficient permissions")),
    };

    let authorization = state
        .store
        .create_authorization(condominium_id, resident_id, &req)
        .await?;
    tracing::info!(
        "Created {} authorization {} for '{}'",
        authorization.authorization_type.as_str(),
        authorization.id,
        authorization.visitor_name
    );

    let settings = state.store.get_settings(condominium_id).await?;
    Ok(created(validity::view(authorization, &settings, Utc::now())))
}

/// GET /api/visitors/authorizations/search?q=
pub async fn search_authorizations(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthorizationSearchQuery>,
) -> Result<Json<Vec<AuthorizationView>>, ApiError> {
    auth.require(&[Role::Guard, Role::Admin])?;
    if query.q.trim().chars().count() < matching::MIN_QUERY_LEN {
        return Ok(Json(Vec::new()));
    }

    let condominium_id = auth.condominium_id()?;
    let settings = state.store.get_settings(condominium_id).await?;
    let candidates = state.store.list_active_authorizations(condominium_id).await?;
    Ok(Json(matching::search(candidates, &query.q, &settings, Utc::now())))
}

pub async fn get_authorization(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AuthorizationView>, ApiError> {
    let authorization = get_visible(&state, &auth, id).await?;
    let settings = state.store.get_settings(authorization.condominium_id).await?;
    Ok(Json(validity::view(authorization, &settings, Utc::now())))
}

/// DELETE revokes the authorization
pub async fn revoke_authorization(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    auth.require(&[Role::Resident, Role::Admin])?;
    let authorization = get_visible(&state, &auth, id).await?;
    state
        .store
        .revoke_authorization(authorization.condominium_id, id)
        .await?;
    tracing::info!("Revoked authorization {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// ========== Gate log ==========

/// POST /api/visitors/check-in
///
/// A second submission for the same authorization (or the same walk-in) inside
/// the condominium's dedup window is refused with 409.
pub async fn check_in(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<VisitorEntry>), ApiError> {
    auth.require(&[Role::Guard, Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    let settings = state.store.get_settings(condominium_id).await?;
    if !settings.visits.enabled {
        return Err(CheckinError::VisitsDisabled.into());
    }

    let key = match req.authorization_id {
        Some(id) => checkin::authorization_key(condominium_id, id),
        None => {
            if !settings.visits.allow_manual_entries {
                return Err(CheckinError::ManualEntriesDisabled.into());
            }
            let name = req.visitor_name.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                return Err(CheckinError::MissingVisitor.into());
            }
            checkin::walk_in_key(condominium_id, name, req.identification_number.as_deref())
        }
    };

    let ttl = Duration::from_secs(settings.visits.checkin_dedup_seconds);
    if !state.recent_checkins.try_claim(&key, ttl) {
        return Err(CheckinError::InProgress.into());
    }

    match record_check_in(&state, &auth, condominium_id, &settings, req).await {
        Ok(entry) => {
            tracing::info!(
                "Check-in {} for '{}' (authorized={})",
                entry.id,
                entry.visitor_name,
                entry.is_authorized
            );
            Ok(created(entry))
        }
        Err(e) => {
            state.recent_checkins.release(&key);
            Err(e)
        }
    }
}

async fn record_check_in(
    state: &AppState,
    auth: &AuthUser,
    condominium_id: i64,
    settings: &CondominiumSettings,
    req: CheckInRequest,
) -> Result<VisitorEntry, ApiError> {
    let now = Utc::now();
    let registered_by = auth.user_id()?;
    let mut destination = req.destination.trim().to_string();

    let authorization = match req.authorization_id {
        Some(id) => {
            let authorization = state
                .store
                .get_authorization(condominium_id, id)
                .await?
                .ok_or_else(|| ApiError::not_found("Authorization"))?;
            checkin::check_authorization(&authorization, settings, now)?;
            Some(authorization)
        }
        None => None,
    };

    let entry = match &authorization {
        Some(a) => {
            if destination.is_empty() {
                if let Some(resident) = state.store.get_user(a.resident_id).await? {
                    destination = resident.unit.unwrap_or(resident.full_name);
                }
            }
            NewVisitorEntry {
                visitor_name: clean_optional(req.visitor_name).unwrap_or_else(|| a.visitor_name.clone()),
                identification_number: clean_optional(req.identification_number)
                    .or_else(|| a.identification_number.clone()),
                vehicle_plate: clean_optional(req.vehicle_plate).or_else(|| a.vehicle_plate.clone()),
                destination,
                authorization_id: Some(a.id),
                is_authorized: true,
                registered_by,
            }
        }
        None => NewVisitorEntry {
            visitor_name: clean_optional(req.visitor_name).ok_or(CheckinError::MissingVisitor)?,
            identification_number: clean_optional(req.identification_number),
            vehicle_plate: clean_optional(req.vehicle_plate),
            destination,
            authorization_id: None,
            is_authorized: false,
            registered_by,
        },
    };

    Ok(state
        .store
        .record_check_in(condominium_id, authorization.as_ref(), &entry, now)
        .await?)
}

pub async fn list_entries(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntryListQuery>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Vec<VisitorEntry>>, ApiError> {
    auth.require(&[Role::Guard, Role::Admin])?;
    let condominium_id = auth.condominium_id()?;
    let window = match query.date {
        Some(date) => {
            let settings = state.store.get_settings(condominium_id).await?;
            Some(local_day_bounds(&settings, date))
        }
        None => None,
    };
    let (limit, offset) = page.sanitize();
    let entries = state
        .store
        .list_entries(condominium_id, query.active, window, limit, offset)
        .await?;
    Ok(Json(entries))
}

/// POST /api/visitors/entries/:id/check-out
pub async fn check_out(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<VisitorEntry>, ApiError> {
    auth.require(&[Role::Guard, Role::Admin])?;
    let entry = state
        .store
        .check_out_entry(auth.condominium_id()?, id, Utc::now())
        .await?;
    tracing::info!("Check-out {} for '{}'", entry.id, entry.visitor_name);
    Ok(Json(entry))
}
