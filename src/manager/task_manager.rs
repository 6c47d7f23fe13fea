use super::{Profile, Role, Task, TaskStatus, TaskWithAssignee};

pub struct TaskManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> TaskManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub enum Error {
    DoesNotExist,
    ProjectDoesNotExist,
    AssigneeNotMember,
    NotAllowed,
    NoCompletedTasks,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::DoesNotExist,
            _ => Error::DatabaseError(err),
        }
    }
}

const SELECT_WITH_ASSIGNEE: &str =
    "SELECT t.id, t.task_name, t.description, t.project_id, t.assigned_to, \
            u.username AS assignee_username, u.email AS assignee_email, \
            t.estimated_time, t.task_status, t.date_created \
     FROM Task t \
     LEFT JOIN User u ON u.id = t.assigned_to";

impl TaskManager<'_> {
    /// Creates a task in its initial state. Only the project's team lead or
    /// an admin may create one, and the assignee (when given) must be a
    /// member of the project.
    pub async fn assign(
        &self,
        caller: &Profile,
        task_name: &str,
        description: &str,
        project_id: i64,
        assigned_to: Option<i64>,
    ) -> Result<Task, Error> {
        let team_lead_id: Option<i64> =
            sqlx::query_scalar("SELECT team_lead_id FROM Project WHERE id = ?")
                .bind(project_id)
                .fetch_optional(self.pool)
                .await?
                .ok_or(Error::ProjectDoesNotExist)?;

        if caller.role != Role::Admin && team_lead_id != Some(caller.id) {
            return Err(Error::NotAllowed);
        }

        if let Some(user_id) = assigned_to {
            let is_member: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT id FROM ProjectMember WHERE project_id = ? AND user_id = ?)",
            )
            .bind(project_id)
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
            if !is_member {
                return Err(Error::AssigneeNotMember);
            }
        }

        Ok(sqlx::query_as(
            "INSERT INTO Task(task_name, description, project_id, assigned_to) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(task_name)
        .bind(description)
        .bind(project_id)
        .bind(assigned_to)
        .fetch_one(self.pool)
        .await?)
    }

    pub async fn all_in_project(&self, project_id: i64) -> Result<Vec<TaskWithAssignee>, Error> {
        Ok(
            sqlx::query_as(&format!("{SELECT_WITH_ASSIGNEE} WHERE t.project_id = ? ORDER BY t.id"))
                .bind(project_id)
                .fetch_all(self.pool)
                .await?,
        )
    }

    pub async fn by_user(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Vec<TaskWithAssignee>, Error> {
        Ok(sqlx::query_as(&format!(
            "{SELECT_WITH_ASSIGNEE} WHERE t.project_id = ? AND t.assigned_to = ? ORDER BY t.id"
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn by_id(&self, task_id: i64) -> Result<TaskWithAssignee, Error> {
        sqlx::query_as(&format!("{SELECT_WITH_ASSIGNEE} WHERE t.id = ?"))
            .bind(task_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(Error::DoesNotExist)
    }

    pub async fn update_status(
        &self,
        caller: &Profile,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<Task, Error> {
        self.authorize_mutation(caller, task_id).await?;

        // Unconditional overwrite; concurrent updates are last-write-wins.
        Ok(sqlx::query_as("UPDATE Task SET task_status = ? WHERE id = ? RETURNING *")
            .bind(status)
            .bind(task_id)
            .fetch_one(self.pool)
            .await?)
    }

    pub async fn update_estimated_time(
        &self,
        caller: &Profile,
        task_id: i64,
        hours: f64,
    ) -> Result<Task, Error> {
        self.authorize_mutation(caller, task_id).await?;

        Ok(sqlx::query_as("UPDATE Task SET estimated_time = ? WHERE id = ? RETURNING *")
            .bind(hours)
            .bind(task_id)
            .fetch_one(self.pool)
            .await?)
    }

    /// Completed tasks drive the project progress figure. An empty result is
    /// reported distinctly so callers can tell "0% done" from a failed fetch.
    pub async fn completed_in_project(&self, project_id: i64) -> Result<Vec<Task>, Error> {
        let tasks: Vec<Task> = sqlx::query_as(
            "SELECT * FROM Task WHERE project_id = ? AND task_status = 'Completed' ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await?;

        if tasks.is_empty() {
            return Err(Error::NoCompletedTasks);
        }
        Ok(tasks)
    }

    /// Task mutation is restricted to the assignee, the project's team lead,
    /// and admins.
    async fn authorize_mutation(&self, caller: &Profile, task_id: i64) -> Result<(), Error> {
        let (assigned_to, team_lead_id): (Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT t.assigned_to, p.team_lead_id FROM Task t \
             JOIN Project p ON p.id = t.project_id \
             WHERE t.id = ?",
        )
        .bind(task_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(Error::DoesNotExist)?;

        if caller.role == Role::Admin
            || assigned_to == Some(caller.id)
            || team_lead_id == Some(caller.id)
        {
            Ok(())
        } else {
            Err(Error::NotAllowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::chat_manager::ChatManager;
    use crate::manager::project_manager::ProjectManager;
    use crate::manager::user_manager::UserManager;
    use crate::manager::workspace_manager::WorkspaceManager;

    async fn profile(pool: &sqlx::SqlitePool, id: i64) -> Profile {
        UserManager::new(pool).profile_by_id(id).await.unwrap()
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_assign_by_lead(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        let task = TaskManager::new(&pool)
            .assign(&bob, "Write onboarding doc", "First draft", 1, Some(3))
            .await
            .unwrap();

        assert_eq!(task.task_status, TaskStatus::NotStarted);
        assert_eq!(task.estimated_time, 0.0);
        assert_eq!(task.assigned_to, Some(3));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn err_assign_by_plain_member(pool: sqlx::SqlitePool) {
        let carol = profile(&pool, 3).await;
        assert!(matches!(
            TaskManager::new(&pool)
                .assign(&carol, "Write onboarding doc", "", 1, Some(3))
                .await,
            Err(Error::NotAllowed)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn err_assignee_outside_project(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        assert!(matches!(
            TaskManager::new(&pool)
                .assign(&bob, "Write onboarding doc", "", 1, Some(4))
                .await,
            Err(Error::AssigneeNotMember)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn ok_status_update_by_assignee(pool: sqlx::SqlitePool) {
        let carol = profile(&pool, 3).await;
        let manager = TaskManager::new(&pool);

        let task = manager
            .update_status(&carol, 1, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(task.task_status, TaskStatus::InProgress);

        let task = manager
            .update_status(&carol, 1, TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(task.task_status, TaskStatus::Completed);

        let completed = manager.completed_in_project(1).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, 1);
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn err_status_update_by_outsider(pool: sqlx::SqlitePool) {
        let dave = profile(&pool, 4).await;
        assert!(matches!(
            TaskManager::new(&pool)
                .update_status(&dave, 1, TaskStatus::Completed)
                .await,
            Err(Error::NotAllowed)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn ok_status_update_by_admin(pool: sqlx::SqlitePool) {
        let alice = profile(&pool, 1).await;
        assert!(TaskManager::new(&pool)
            .update_status(&alice, 1, TaskStatus::InProgress)
            .await
            .is_ok());
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn err_status_update_missing_task(pool: sqlx::SqlitePool) {
        let alice = profile(&pool, 1).await;
        assert!(matches!(
            TaskManager::new(&pool)
                .update_status(&alice, 999, TaskStatus::Completed)
                .await,
            Err(Error::DoesNotExist)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn ok_update_estimated_time_by_lead(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        let task = TaskManager::new(&pool)
            .update_estimated_time(&bob, 1, 7.5)
            .await
            .unwrap();
        assert_eq!(task.estimated_time, 7.5);
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn completed_empty_is_distinct_from_failure(pool: sqlx::SqlitePool) {
        // Fixture tasks exist but none are completed.
        assert!(matches!(
            TaskManager::new(&pool).completed_in_project(1).await,
            Err(Error::NoCompletedTasks)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn ok_tasks_by_user_with_assignee(pool: sqlx::SqlitePool) {
        let tasks = TaskManager::new(&pool).by_user(1, 3).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].assignee_username.as_deref(), Some("carol"));
    }

    // Full lifecycle: workspace -> members -> project -> task -> chat,
    // ending at 100% progress.
    #[sqlx::test(fixtures("users"))]
    async fn ok_full_project_flow(pool: sqlx::SqlitePool) {
        let alice = profile(&pool, 1).await;
        let bob = profile(&pool, 2).await;
        let carol = profile(&pool, 3).await;

        let workspace = WorkspaceManager::new(&pool).create("W1", 1).await.unwrap();
        WorkspaceManager::new(&pool)
            .add_users(workspace.id, &[2, 3])
            .await
            .unwrap();

        let project = ProjectManager::new(&pool)
            .create("P1", workspace.id, 2)
            .await
            .unwrap();
        ProjectManager::new(&pool)
            .add_members(&bob, project.id, &[2, 3])
            .await
            .unwrap();

        let task_manager = TaskManager::new(&pool);
        let task = task_manager
            .assign(&bob, "T1", "first task", project.id, Some(3))
            .await
            .unwrap();
        assert_eq!(task.task_status, TaskStatus::NotStarted);

        task_manager
            .update_status(&carol, task.id, TaskStatus::InProgress)
            .await
            .unwrap();
        task_manager
            .update_status(&carol, task.id, TaskStatus::Completed)
            .await
            .unwrap();

        let all = task_manager.all_in_project(project.id).await.unwrap();
        let completed = task_manager
            .completed_in_project(project.id)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(completed.len(), 1);
        // progress: completed / total
        assert_eq!(completed.len() * 100 / all.len(), 100);

        ChatManager::new(&pool)
            .send(&carol, project.id, "done!")
            .await
            .unwrap();
        let messages = ChatManager::new(&pool)
            .list(&alice, project.id)
            .await;
        // alice is not a project member, so even the admin cannot read chat
        assert!(messages.is_err());
    }
}
