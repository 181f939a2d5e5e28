use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json};
use crate::{auth::AuthUser, models::*, handlers::{ApiError, created}, AppState};

/// Superadmins manage every account; tenant admins only their own condominium
fn scope(auth: &AuthUser) -> Result<Option<i64>, ApiError> {
    match auth.role() {
        Role::Superadmin => Ok(None),
        Role::Admin => Ok(Some(auth.condominium_id()?)),
        _ => Err(ApiError::forbidden("insufficient permissions")),
    }
}

async fn get_scoped(state: &AppState, scope: Option<i64>, id: i64) -> Result<User, ApiError> {
    state.store.get_user(id).await?
        .filter(|u| scope.is_none() || u.condominium_id == scope)
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn list_users(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let scope = scope(&auth)?;
    let users = state.store.list_users(scope).await?;
    Ok(Json(users))
}

pub async fn get_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let scope = scope(&auth)?;
    Ok(Json(get_scoped(&state, scope, id).await?))
}

pub async fn create_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let scope = scope(&auth)?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let condominium_id = match (scope, req.role) {
        (Some(_), Role::Superadmin) => {
            return Err(ApiError::forbidden("only superadmins can create superadmins"));
        }
        (Some(own), _) => Some(own),
        (None, Role::Superadmin) => None,
        (None, _) => Some(
            req.condominium_id
                .ok_or_else(|| ApiError::bad_request("condominium_id is required"))?,
        ),
    };
    if let Some(id) = condominium_id {
        if state.store.get_condominium(id).await?.is_none() {
            return Err(ApiError::bad_request("condominium does not exist"));
        }
    }

    if state.store.get_user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::conflict("A user with this username already exists"));
    }
    let user = state.store.create_user(condominium_id, &req).await?;
    tracing::info!("Created {} user '{}'", user.role.as_str(), user.username);
    Ok(created(user))
}

pub async fn update_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let scope = scope(&auth)?;
    if req.username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if scope.is_some() && req.role == Role::Superadmin {
        return Err(ApiError::forbidden("only superadmins can grant superadmin"));
    }
    get_scoped(&state, scope, id).await?;

    // Check for username uniqueness (excluding self)
    if let Some(existing) = state.store.get_user_by_username(&req.username).await? {
        if existing.id != id {
            return Err(ApiError::conflict("A user with this username already exists"));
        }
    }
    let user = state.store.update_user(id, &req).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let scope = scope(&auth)?;
    // Prevent self-deletion
    if auth.user_id()? == id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }
    get_scoped(&state, scope, id).await?;
    state.store.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
