use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::auth::{encode_token, AuthUser};
use crate::models::{Claims, LoginRequest, RefreshRequest, TokenResponse, User};
use crate::AppState;

use super::ApiError;

/// Sign an access token and persist a fresh refresh token for `user`
async fn issue_tokens(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let now = Utc::now();
    let ttl = state.config.access_token_ttl_secs;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role,
        condominium_id: user.condominium_id,
        exp: (now + Duration::seconds(ttl)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let access_token = encode_token(&claims, &state.config.jwt_secret)
        .map_err(|e| ApiError::internal(format!("token generation error: {}", e)))?;

    let refresh_token = uuid::Uuid::new_v4().to_string();
    let refresh_expires = now + Duration::seconds(state.config.refresh_token_ttl_secs);
    state
        .store
        .create_refresh_token(&refresh_token, user.id, refresh_expires)
        .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: ttl,
        user,
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let user = state
        .store
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|_| ApiError::internal("password verification error"))?;
    if !valid {
        tracing::info!("Failed login for '{}'", req.username);
        return Err(ApiError::unauthorized("invalid credentials"));
    }
    if !user.enabled {
        return Err(ApiError::unauthorized("account disabled"));
    }

    tracing::info!("User '{}' logged in", user.username);
    Ok(Json(issue_tokens(&state, user).await?))
}

/// POST /api/auth/refresh, rotating the refresh token
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let stored = state
        .store
        .get_refresh_token(&req.refresh_token)
        .await?
        .filter(|t| !t.revoked && t.expires_at > Utc::now())
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    // losing a concurrent rotation means someone else already used it
    if !state.store.revoke_refresh_token(&stored.token).await? {
        return Err(ApiError::unauthorized("invalid refresh token"));
    }

    let user = state
        .store
        .get_user(stored.user_id)
        .await?
        .filter(|u| u.enabled)
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    Ok(Json(issue_tokens(&state, user).await?))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    state.store.revoke_refresh_token(&req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .get_user(auth.user_id()?)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}
