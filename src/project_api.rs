use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::manager::project_manager::ProjectManager;
use crate::manager::{Profile, Project, ProjectMemberWithEmail, ProjectWithLead};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/createproject", routing::post(create_project))
        .route("/deleteproject", routing::delete(delete_project))
        .route("/getallprojectsbyadmin", routing::get(projects_by_admin))
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/getallprojectsbyteamlead", routing::post(projects_by_lead))
        .route("/addMembersInProject", routing::post(add_members))
        .route("/getprojectsbyuser", routing::get(projects_of_user))
        .route("/getprojectmembers", routing::post(project_members))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectForm {
    project_name: String,
    workspace_id: i64,
    team_lead_id: i64,
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CreateProjectForm>,
) -> Result<impl IntoResponse, ApiError> {
    let project = ProjectManager::new(&state.pool)
        .create(&form.project_name, form.workspace_id, form.team_lead_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Project created successfully", "project": project })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectForm {
    project_id: i64,
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DeleteProjectForm>,
) -> Result<impl IntoResponse, ApiError> {
    ProjectManager::new(&state.pool)
        .delete(form.project_id)
        .await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceIdQuery {
    workspace_id: i64,
}

async fn projects_by_admin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WorkspaceIdQuery>,
) -> Result<Json<Vec<ProjectWithLead>>, ApiError> {
    Ok(Json(
        ProjectManager::new(&state.pool)
            .by_workspace(query.workspace_id)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsByLeadForm {
    workspace_id: i64,
    team_lead_id: i64,
}

async fn projects_by_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<ProjectsByLeadForm>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(
        ProjectManager::new(&state.pool)
            .by_team_lead(&user, form.workspace_id, form.team_lead_id)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMembersForm {
    project_id: i64,
    user_ids: Vec<i64>,
}

async fn add_members(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<AddMembersForm>,
) -> Result<impl IntoResponse, ApiError> {
    if form.user_ids.is_empty() {
        return Err(ApiError::Validation(
            "Please provide an array of user IDs".to_owned(),
        ));
    }

    let members = ProjectManager::new(&state.pool)
        .add_members(&user, form.project_id, &form.user_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Users successfully added in the project",
            "projectMembers": members,
        })),
    ))
}

async fn projects_of_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
) -> Result<Json<Vec<ProjectWithLead>>, ApiError> {
    Ok(Json(
        ProjectManager::new(&state.pool).of_user(user.id).await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdForm {
    project_id: i64,
}

async fn project_members(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ProjectIdForm>,
) -> Result<Json<Vec<ProjectMemberWithEmail>>, ApiError> {
    Ok(Json(
        ProjectManager::new(&state.pool)
            .members(form.project_id)
            .await?,
    ))
}
