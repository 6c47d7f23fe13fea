use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::manager::workspace_manager::WorkspaceManager;
use crate::manager::{Profile, Workspace, WorkspaceUserWithEmail};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/createworkspace", routing::post(create_workspace))
        .route("/addUsersToWorkspace", routing::post(add_users))
        .route("/getworkspaces", routing::get(all_workspaces))
        .route("/removeuserfromworkspace", routing::delete(remove_user))
        .route("/deleteworkspace", routing::delete(delete_workspace))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/getworkspacebyid", routing::get(workspace_by_id))
        .route("/getworkspacesofuser", routing::get(workspaces_of_user))
        .route(
            "/getworkspaceusersofspecificworkspace",
            routing::get(users_of_workspace),
        )
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceForm {
    workspace_name: String,
}

async fn create_workspace(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<CreateWorkspaceForm>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = WorkspaceManager::new(&state.pool)
        .create(&form.workspace_name, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersForm {
    workspace_id: i64,
    user_ids: Vec<i64>,
}

async fn add_users(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AddUsersForm>,
) -> Result<impl IntoResponse, ApiError> {
    if form.user_ids.is_empty() {
        return Err(ApiError::Validation(
            "Please provide an array of user IDs".to_owned(),
        ));
    }

    let memberships = WorkspaceManager::new(&state.pool)
        .add_users(form.workspace_id, &form.user_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Users successfully added to the workspace",
            "workspaceUsers": memberships,
        })),
    ))
}

async fn all_workspaces(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Workspace>>, ApiError> {
    Ok(Json(WorkspaceManager::new(&state.pool).all().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUserForm {
    workspace_id: i64,
    user_id: i64,
}

async fn remove_user(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RemoveUserForm>,
) -> Result<impl IntoResponse, ApiError> {
    WorkspaceManager::new(&state.pool)
        .remove_user(form.workspace_id, form.user_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User removed from workspace", "userId": form.user_id })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceIdQuery {
    workspace_id: i64,
}

async fn workspace_by_id(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceIdQuery>,
) -> Result<Json<Workspace>, ApiError> {
    Ok(Json(
        WorkspaceManager::new(&state.pool)
            .by_id(query.workspace_id)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWorkspaceForm {
    workspace_id: i64,
}

async fn delete_workspace(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DeleteWorkspaceForm>,
) -> Result<impl IntoResponse, ApiError> {
    WorkspaceManager::new(&state.pool)
        .delete(form.workspace_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Workspace deleted", "workspaceId": form.workspace_id })),
    ))
}

async fn workspaces_of_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
) -> Result<Json<Vec<Workspace>>, ApiError> {
    Ok(Json(
        WorkspaceManager::new(&state.pool).of_user(user.id).await?,
    ))
}

async fn users_of_workspace(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceIdQuery>,
) -> Result<Json<Vec<WorkspaceUserWithEmail>>, ApiError> {
    Ok(Json(
        WorkspaceManager::new(&state.pool)
            .users_of(query.workspace_id)
            .await?,
    ))
}
