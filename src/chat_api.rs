use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::manager::chat_manager::ChatManager;
use crate::manager::{ChatMessageWithAuthor, Profile};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sendMessage", routing::post(send_message))
        .route("/getChatMessages", routing::post(chat_messages))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageForm {
    project_id: i64,
    message: String,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<SendMessageForm>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = ChatManager::new(&state.pool)
        .send(&user, form.project_id, &form.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message sent successfully", "chat": chat })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdForm {
    project_id: i64,
}

async fn chat_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<ProjectIdForm>,
) -> Result<Json<Vec<ChatMessageWithAuthor>>, ApiError> {
    Ok(Json(
        ChatManager::new(&state.pool)
            .list(&user, form.project_id)
            .await?,
    ))
}
