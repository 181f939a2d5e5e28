use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{auth::AuthUser, handlers::{created, ApiError}, models::*, AppState};

fn validate(req: &CreateCondominiumRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if !condominium_status::is_valid(&req.status) {
        return Err(ApiError::bad_request("status must be 'active' or 'inactive'"));
    }
    Ok(())
}

pub async fn list_condominiums(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Condominium>>, ApiError> {
    auth.require(&[Role::Superadmin])?;
    Ok(Json(state.store.list_condominiums().await?))
}

pub async fn get_condominium(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Condominium>, ApiError> {
    auth.require(&[Role::Superadmin])?;
    let condominium = state.store.get_condominium(id).await?
        .ok_or_else(|| ApiError::not_found("Condominium"))?;
    Ok(Json(condominium))
}

pub async fn create_condominium(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCondominiumRequest>,
) -> Result<(StatusCode, Json<Condominium>), ApiError> {
    auth.require(&[Role::Superadmin])?;
    validate(&req)?;
    if state.store.get_condominium_by_name(&req.name).await?.is_some() {
        return Err(ApiError::conflict("A condominium with this name already exists"));
    }
    let condominium = state.store.create_condominium(&req).await?;
    tracing::info!("Created condominium '{}' (id={})", condominium.name, condominium.id);
    Ok(created(condominium))
}

pub async fn update_condominium(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateCondominiumRequest>,
) -> Result<Json<Condominium>, ApiError> {
    auth.require(&[Role::Superadmin])?;
    validate(&req)?;
    if let Some(existing) = state.store.get_condominium_by_name(&req.name).await? {
        if existing.id != id {
            return Err(ApiError::conflict("A condominium with this name already exists"));
        }
    }
    Ok(Json(state.store.update_condominium(id, &req).await?))
}

pub async fn delete_condominium(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    auth.require(&[Role::Superadmin])?;
    state.store.delete_condominium(id).await?;
    tracing::info!("Deleted condominium {}", id);
    Ok(StatusCode::NO_CONTENT)
}
