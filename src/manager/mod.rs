use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod chat_manager;
pub mod project_manager;
pub mod task_manager;
pub mod token_manager;
pub mod user_manager;
pub mod workspace_manager;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    #[sqlx(rename = "Not Started")]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Full user row. The password hash never leaves the manager layer; anything
/// wire-facing goes through [`Profile`].
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    password: String,
    pub role: Role,
    pub date_created: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub date_created: NaiveDateTime,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            date_created: user.date_created,
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: i64,
    pub workspace_name: String,
    pub admin_id: i64,
    pub date_created: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceUser {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub date_added: NaiveDateTime,
}

/// Membership row joined with the member's email, for workspace rosters.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceUserWithEmail {
    pub id: i64,
    pub workspace_id: i64,
    pub user_id: i64,
    pub email: String,
    pub date_added: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub workspace_id: i64,
    pub team_lead_id: Option<i64>,
    pub date_created: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithLead {
    pub id: i64,
    pub project_name: String,
    pub workspace_id: i64,
    pub team_lead_id: Option<i64>,
    pub team_lead_email: Option<String>,
    pub date_created: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub date_added: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberWithEmail {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub email: String,
    pub date_added: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub task_name: String,
    pub description: String,
    pub project_id: i64,
    pub assigned_to: Option<i64>,
    pub estimated_time: f64,
    pub task_status: TaskStatus,
    pub date_created: NaiveDateTime,
}

/// Task row joined with the assignee's username and email, for listings.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAssignee {
    pub id: i64,
    pub task_name: String,
    pub description: String,
    pub project_id: i64,
    pub assigned_to: Option<i64>,
    pub assignee_username: Option<String>,
    pub assignee_email: Option<String>,
    pub estimated_time: f64,
    pub task_status: TaskStatus,
    pub date_created: NaiveDateTime,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub project_id: i64,
    pub user_id: Option<i64>,
    pub message: String,
    pub date_sent: NaiveDateTime,
}

/// Chat row joined with the author's username. The username is null when the
/// author account has since been deleted.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageWithAuthor {
    pub id: i64,
    pub project_id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub message: String,
    pub date_sent: NaiveDateTime,
}
