use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::manager::task_manager::TaskManager;
use crate::manager::{Profile, Task, TaskStatus, TaskWithAssignee};
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/assigntask", routing::post(assign_task))
        .route("/getalltasksinproject", routing::post(all_tasks_in_project))
        .route("/gettasksbyuser", routing::post(tasks_by_user))
        .route("/gettaskbyid", routing::post(task_by_id))
        .route("/updatetaskstatus", routing::put(update_status))
        .route("/updatetaskestimatedtime", routing::put(update_estimated_time))
        .route(
            "/getcompletedtasksinproject",
            routing::post(completed_tasks_in_project),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskForm {
    task_name: String,
    #[serde(default)]
    description: String,
    project_id: i64,
    assigned_to: Option<i64>,
}

async fn assign_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<AssignTaskForm>,
) -> Result<impl IntoResponse, ApiError> {
    let task = TaskManager::new(&state.pool)
        .assign(
            &user,
            &form.task_name,
            &form.description,
            form.project_id,
            form.assigned_to,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task assigned successfully", "task": task })),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdForm {
    project_id: i64,
}

async fn all_tasks_in_project(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ProjectIdForm>,
) -> Result<Json<Vec<TaskWithAssignee>>, ApiError> {
    Ok(Json(
        TaskManager::new(&state.pool)
            .all_in_project(form.project_id)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksByUserForm {
    project_id: i64,
    user_id: i64,
}

async fn tasks_by_user(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TasksByUserForm>,
) -> Result<Json<Vec<TaskWithAssignee>>, ApiError> {
    Ok(Json(
        TaskManager::new(&state.pool)
            .by_user(form.project_id, form.user_id)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdForm {
    task_id: i64,
}

async fn task_by_id(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TaskIdForm>,
) -> Result<Json<TaskWithAssignee>, ApiError> {
    Ok(Json(TaskManager::new(&state.pool).by_id(form.task_id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusForm {
    task_id: i64,
    task_status: TaskStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<UpdateStatusForm>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(
        TaskManager::new(&state.pool)
            .update_status(&user, form.task_id, form.task_status)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEstimatedTimeForm {
    task_id: i64,
    estimated_time: f64,
}

async fn update_estimated_time(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<Profile>,
    Json(form): Json<UpdateEstimatedTimeForm>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(
        TaskManager::new(&state.pool)
            .update_estimated_time(&user, form.task_id, form.estimated_time)
            .await?,
    ))
}

async fn completed_tasks_in_project(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ProjectIdForm>,
) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(
        TaskManager::new(&state.pool)
            .completed_in_project(form.project_id)
            .await?,
    ))
}
