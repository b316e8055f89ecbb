//! Authentication middleware for bearer token validation
//!
//! The middleware resolves the bearer token into an [`AuthUser`] actor and
//! attaches it to the request. Handlers receive the actor explicitly instead
//! of consulting any ambient session state; the coordinator capability is
//! re-read from the database on every request so promotions and demotions
//! take effect immediately.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// The authenticated principal acting on a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_coordinator: bool,
    pub department_id: Option<Uuid>,
}

impl AuthUser {
    /// Capability check for coordinator-only operations
    pub fn require_coordinator(&self) -> Result<(), ApiError> {
        if self.is_coordinator {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied)
        }
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(auth) = auth.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(auth.token())
        .map_err(|err| {
            debug!("Token validation failed: {}", err);
            ApiError::Unauthorized
        })?;

    let account = state
        .user_repository
        .find_account(claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let user = AuthUser {
        id: account.id,
        username: account.username,
        is_coordinator: account.is_coordinator,
        department_id: account.department_id,
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(is_coordinator: bool) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "maria".to_string(),
            is_coordinator,
            department_id: None,
        }
    }

    #[test]
    fn test_require_coordinator() {
        assert!(actor(true).require_coordinator().is_ok());
        assert!(matches!(
            actor(false).require_coordinator(),
            Err(ApiError::PermissionDenied)
        ));
    }
}
