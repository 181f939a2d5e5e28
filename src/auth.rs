use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::handlers::{ApiError, ErrorResponse};
use crate::models::{Claims, Role};
use crate::AppState;

/// Extractor that validates JWT and provides the authenticated user's claims.
///
/// Add `auth: AuthUser` to a handler's parameters to require authentication.
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// Condominium every tenant-scoped request operates on.
    ///
    /// Superadmins carry none and are refused here.
    pub fn condominium_id(&self) -> Result<i64, ApiError> {
        self.claims
            .condominium_id
            .ok_or_else(|| ApiError::forbidden("no condominium associated with this account"))
    }

    /// Fail with 403 unless the caller holds one of `roles`
    pub fn require(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.claims.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden("insufficient permissions"))
        }
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = decode_token(token, &state.config.jwt_secret).ok_or(AuthError::InvalidToken)?;
        Ok(AuthUser { claims })
    }
}

/// Sign an access token for `claims`
pub fn encode_token(claims: &Claims, secret: &str) -> jsonwebtoken::errors::Result<String> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, condominium_id: Option<i64>) -> Claims {
        let now = chrono::Utc::now().timestamp() as usize;
        Claims {
            sub: "7".into(),
            username: "guard1".into(),
            role,
            condominium_id,
            exp: now + 600,
            iat: now,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let token = encode_token(&claims(Role::Guard, Some(3)), "s3cret").unwrap();
        let decoded = decode_token(&token, "s3cret").unwrap();
        assert_eq!(decoded.role, Role::Guard);
        assert_eq!(decoded.condominium_id, Some(3));
        assert!(decode_token(&token, "other").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut c = claims(Role::Admin, Some(1));
        c.exp = 1_000;
        c.iat = 900;
        let token = encode_token(&c, "s3cret").unwrap();
        assert!(decode_token(&token, "s3cret").is_none());
    }

    #[test]
    fn test_role_and_tenant_guards() {
        let guard = AuthUser { claims: claims(Role::Guard, Some(3)) };
        assert!(guard.require(&[Role::Admin, Role::Guard]).is_ok());
        assert!(guard.require(&[Role::Admin]).is_err());
        assert_eq!(guard.condominium_id().ok(), Some(3));
        assert_eq!(guard.user_id().ok(), Some(7));

        let root = AuthUser { claims: claims(Role::Superadmin, None) };
        assert!(root.condominium_id().is_err());
    }
}
