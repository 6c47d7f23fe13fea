use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::manager::user_manager::{self, UserManager};
use crate::manager::{Profile, Role};
use crate::AppState;

/// Resolves the bearer token to a user and attaches the password-free
/// profile to the request. Everything past the public login/register
/// endpoints runs behind this.
pub async fn require_user<B>(
    State(state): State<Arc<AppState>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated("Not authorized, no token"))?;

    let user_id = state
        .tokens
        .resolve(token)
        .map_err(|_| ApiError::Unauthenticated("Not authorized, token failed"))?;

    // A valid token for a user that has since been deleted is still a 401.
    let user = UserManager::new(&state.pool)
        .profile_by_id(user_id)
        .await
        .map_err(|err| match err {
            user_manager::Error::DoesNotExist => {
                ApiError::Unauthenticated("Not authorized, token failed")
            }
            other => other.into(),
        })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Role gate layered inside [`require_user`].
pub async fn require_admin<B>(req: Request<B>, next: Next<B>) -> Result<Response, ApiError> {
    match req.extensions().get::<Profile>() {
        Some(user) if user.role == Role::Admin => Ok(next.run(req).await),
        _ => Err(ApiError::Forbidden("Not authorized as an admin")),
    }
}
