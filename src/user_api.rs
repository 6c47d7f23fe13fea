use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::manager::user_manager::{self, UserManager};
use crate::manager::{Profile, Role};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/", routing::get(list_users))
        .route("/deleteUserById", routing::delete(delete_user))
        .route_layer(middleware::from_fn(auth::require_admin));

    let protected = Router::new()
        .route("/profile", routing::get(profile))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/register", routing::post(register))
        .route("/login", routing::post(login))
        .route("/logout", routing::post(logout))
        .merge(protected)
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    username: String,
    email: String,
    password: String,
    role: Role,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = UserManager::new(&state.pool)
        .register(&form.username, &form.email, &form.password, form.role)
        .await?;
    let token = state.tokens.issue(profile.id)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "profile": profile })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = UserManager::new(&state.pool)
        .verify_credentials(&credentials.email, &credentials.password)
        .await
        .map_err(|err| match err {
            // An unknown email reads the same as a bad password.
            user_manager::Error::DoesNotExist => {
                ApiError::Unauthenticated("Invalid email or password")
            }
            other => other.into(),
        })?;
    let token = state.tokens.issue(profile.id)?;

    Ok(Json(json!({ "token": token, "profile": profile })))
}

async fn logout() -> impl IntoResponse {
    // Tokens are stateless; the client discards its copy.
    Json(json!({ "message": "Logged out successfully" }))
}

async fn profile(Extension(user): Extension<Profile>) -> Json<Profile> {
    Json(user)
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(UserManager::new(&state.pool).list().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserForm {
    user_id: i64,
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DeleteUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    UserManager::new(&state.pool).delete(form.user_id).await?;
    Ok(Json(
        json!({ "message": "User deleted", "userId": form.user_id }),
    ))
}
