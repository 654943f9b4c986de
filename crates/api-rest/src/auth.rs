//! Bearer token extractor for protected routes.

use crate::error::ApiError;
use crate::AppState;
use api_shared::auth::{bearer_token, verify_token};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use raktmap_core::{Requester, Role};
use uuid::Uuid;

/// The caller behind a valid bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Access denied"))
        }
    }

    pub fn requester(&self) -> Requester {
        Requester {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| bearer_token(value).ok())
            .ok_or(ApiError::Unauthorized("No token provided"))?;

        let claims = verify_token(&state.auth, token).map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            ApiError::Forbidden("Invalid token")
        })?;
        let role = claims
            .role
            .parse()
            .map_err(|_| ApiError::Forbidden("Invalid token"))?;

        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role,
            name: claims.name,
        })
    }
}
