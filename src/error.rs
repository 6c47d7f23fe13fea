use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::manager::{
    chat_manager, project_manager, task_manager, token_manager, user_manager, workspace_manager,
};

/// The full failure taxonomy. Every handler funnels its manager errors into
/// this type so equivalent failures always map to the same status and the
/// same `{"error": ...}` body shape.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthenticated(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.to_owned()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_owned()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_owned()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.to_owned()),
            ApiError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<user_manager::Error> for ApiError {
    fn from(err: user_manager::Error) -> Self {
        use user_manager::Error::*;
        match err {
            UsernameTaken => ApiError::Conflict("username already exists"),
            EmailTaken => ApiError::Conflict("email already exists"),
            WrongPassword => ApiError::Unauthenticated("Invalid email or password"),
            DoesNotExist => ApiError::NotFound("User not found"),
            OwnsWorkspaces => ApiError::Conflict("user still owns workspaces"),
            Hashing(err) => ApiError::Internal(err.into()),
            DatabaseError(err) => ApiError::Internal(err.into()),
        }
    }
}

impl From<token_manager::Error> for ApiError {
    fn from(err: token_manager::Error) -> Self {
        let token_manager::Error::Invalid(err) = err;
        ApiError::Internal(err.into())
    }
}

impl From<workspace_manager::Error> for ApiError {
    fn from(err: workspace_manager::Error) -> Self {
        use workspace_manager::Error::*;
        match err {
            NameTaken => ApiError::Conflict("workspace name already exists"),
            DoesNotExist => ApiError::NotFound("Workspace not found"),
            UnknownUser => ApiError::NotFound("User not found"),
            DatabaseError(err) => ApiError::Internal(err.into()),
        }
    }
}

impl From<project_manager::Error> for ApiError {
    fn from(err: project_manager::Error) -> Self {
        use project_manager::Error::*;
        match err {
            DoesNotExist => ApiError::NotFound("Project not found"),
            WorkspaceDoesNotExist => ApiError::NotFound("Workspace not found"),
            LeadNotInWorkspace => {
                ApiError::Validation("team lead is not a member of the workspace".to_owned())
            }
            NotLead => ApiError::Forbidden("Not authorized as the team lead"),
            UnknownUser => ApiError::NotFound("User not found"),
            DatabaseError(err) => ApiError::Internal(err.into()),
        }
    }
}

impl From<task_manager::Error> for ApiError {
    fn from(err: task_manager::Error) -> Self {
        use task_manager::Error::*;
        match err {
            DoesNotExist => ApiError::NotFound("Task not found"),
            ProjectDoesNotExist => ApiError::NotFound("Project not found"),
            AssigneeNotMember => {
                ApiError::Validation("assignee is not a member of this project".to_owned())
            }
            NotAllowed => ApiError::Forbidden("Not authorized to modify this task"),
            NoCompletedTasks => ApiError::NotFound("No completed tasks found for this project"),
            DatabaseError(err) => ApiError::Internal(err.into()),
        }
    }
}

impl From<chat_manager::Error> for ApiError {
    fn from(err: chat_manager::Error) -> Self {
        use chat_manager::Error::*;
        match err {
            NotMember => ApiError::Forbidden("You are not a member of this project"),
            DatabaseError(err) => ApiError::Internal(err.into()),
        }
    }
}
