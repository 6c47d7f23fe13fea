use super::{Profile, Project, ProjectMember, ProjectMemberWithEmail, ProjectWithLead, Role};

pub struct ProjectManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> ProjectManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub enum Error {
    DoesNotExist,
    WorkspaceDoesNotExist,
    LeadNotInWorkspace,
    NotLead,
    UnknownUser,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Error::DoesNotExist;
        }
        if let Some(db) = err.as_database_error() {
            if db.is_foreign_key_violation() {
                return Error::UnknownUser;
            }
        }
        Error::DatabaseError(err)
    }
}

impl ProjectManager<'_> {
    /// Creates a project inside a workspace. The designated team lead must
    /// already hold a membership in that workspace.
    pub async fn create(
        &self,
        name: &str,
        workspace_id: i64,
        team_lead_id: i64,
    ) -> Result<Project, Error> {
        let workspace_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT id FROM Workspace WHERE id = ?)")
                .bind(workspace_id)
                .fetch_one(self.pool)
                .await?;
        if !workspace_exists {
            return Err(Error::WorkspaceDoesNotExist);
        }

        let lead_is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT id FROM WorkspaceUser WHERE workspace_id = ? AND user_id = ?)",
        )
        .bind(workspace_id)
        .bind(team_lead_id)
        .fetch_one(self.pool)
        .await?;
        if !lead_is_member {
            return Err(Error::LeadNotInWorkspace);
        }

        Ok(sqlx::query_as(
            "INSERT INTO Project(project_name, workspace_id, team_lead_id) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(workspace_id)
        .bind(team_lead_id)
        .fetch_one(self.pool)
        .await?)
    }

    pub async fn by_id(&self, project_id: i64) -> Result<Project, Error> {
        sqlx::query_as("SELECT * FROM Project WHERE id = ?")
            .bind(project_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(Error::DoesNotExist)
    }

    pub async fn delete(&self, project_id: i64) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM TeamChat WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM Task WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ProjectMember WHERE project_id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM Project WHERE id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::DoesNotExist);
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn by_workspace(&self, workspace_id: i64) -> Result<Vec<ProjectWithLead>, Error> {
        Ok(sqlx::query_as(
            "SELECT p.id, p.project_name, p.workspace_id, p.team_lead_id, \
                    u.email AS team_lead_email, p.date_created \
             FROM Project p \
             LEFT JOIN User u ON u.id = p.team_lead_id \
             WHERE p.workspace_id = ? ORDER BY p.id",
        )
        .bind(workspace_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Lead-scoped listing. A standard caller may only query their own
    /// projects; admins may query any lead's.
    pub async fn by_team_lead(
        &self,
        caller: &Profile,
        workspace_id: i64,
        team_lead_id: i64,
    ) -> Result<Vec<Project>, Error> {
        if caller.role != Role::Admin && caller.id != team_lead_id {
            return Err(Error::NotLead);
        }

        Ok(sqlx::query_as(
            "SELECT * FROM Project WHERE workspace_id = ? AND team_lead_id = ? ORDER BY id",
        )
        .bind(workspace_id)
        .bind(team_lead_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// Bulk membership insert, restricted to the project's team lead or an
    /// admin. Idempotent like the workspace-level equivalent.
    pub async fn add_members(
        &self,
        caller: &Profile,
        project_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<ProjectMember>, Error> {
        let project = self.by_id(project_id).await?;
        if caller.role != Role::Admin && project.team_lead_id != Some(caller.id) {
            return Err(Error::NotLead);
        }

        let mut tx = self.pool.begin().await?;
        for user_id in user_ids {
            sqlx::query("INSERT OR IGNORE INTO ProjectMember(project_id, user_id) VALUES (?, ?)")
                .bind(project_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let mut members = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let row: ProjectMember =
                sqlx::query_as("SELECT * FROM ProjectMember WHERE project_id = ? AND user_id = ?")
                    .bind(project_id)
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            members.push(row);
        }

        tx.commit().await?;
        Ok(members)
    }

    pub async fn of_user(&self, user_id: i64) -> Result<Vec<ProjectWithLead>, Error> {
        Ok(sqlx::query_as(
            "SELECT p.id, p.project_name, p.workspace_id, p.team_lead_id, \
                    u.email AS team_lead_email, p.date_created \
             FROM Project p \
             JOIN ProjectMember pm ON pm.project_id = p.id \
             LEFT JOIN User u ON u.id = p.team_lead_id \
             WHERE pm.user_id = ? ORDER BY p.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn members(&self, project_id: i64) -> Result<Vec<ProjectMemberWithEmail>, Error> {
        Ok(sqlx::query_as(
            "SELECT pm.id, pm.project_id, pm.user_id, u.email, pm.date_added \
             FROM ProjectMember pm \
             JOIN User u ON u.id = pm.user_id \
             WHERE pm.project_id = ? ORDER BY pm.id",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::user_manager::UserManager;

    async fn profile(pool: &sqlx::SqlitePool, id: i64) -> Profile {
        UserManager::new(pool).profile_by_id(id).await.unwrap()
    }

    #[sqlx::test(fixtures("users", "workspaces"))]
    async fn ok_create_project(pool: sqlx::SqlitePool) {
        let project = ProjectManager::new(&pool)
            .create("Apollo", 1, 2)
            .await
            .unwrap();
        assert_eq!(project.project_name, "Apollo");
        assert_eq!(project.team_lead_id, Some(2));
    }

    #[sqlx::test(fixtures("users", "workspaces"))]
    async fn err_lead_outside_workspace(pool: sqlx::SqlitePool) {
        // dave holds no membership in workspace 1
        assert!(matches!(
            ProjectManager::new(&pool).create("Apollo", 1, 4).await,
            Err(Error::LeadNotInWorkspace)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces"))]
    async fn err_unknown_workspace(pool: sqlx::SqlitePool) {
        assert!(matches!(
            ProjectManager::new(&pool).create("Apollo", 999, 2).await,
            Err(Error::WorkspaceDoesNotExist)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_by_team_lead_self(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        let projects = ProjectManager::new(&pool)
            .by_team_lead(&bob, 1, 2)
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn err_by_team_lead_foreign_caller(pool: sqlx::SqlitePool) {
        let carol = profile(&pool, 3).await;
        assert!(matches!(
            ProjectManager::new(&pool).by_team_lead(&carol, 1, 2).await,
            Err(Error::NotLead)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_by_team_lead_admin_caller(pool: sqlx::SqlitePool) {
        let alice = profile(&pool, 1).await;
        assert!(ProjectManager::new(&pool)
            .by_team_lead(&alice, 1, 2)
            .await
            .is_ok());
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_add_members_is_idempotent(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        let manager = ProjectManager::new(&pool);
        manager.add_members(&bob, 1, &[2, 3]).await.unwrap();
        manager.add_members(&bob, 1, &[2, 3]).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ProjectMember")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn err_add_members_by_plain_member(pool: sqlx::SqlitePool) {
        let carol = profile(&pool, 3).await;
        assert!(matches!(
            ProjectManager::new(&pool).add_members(&carol, 1, &[4]).await,
            Err(Error::NotLead)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_projects_of_user_with_lead(pool: sqlx::SqlitePool) {
        let projects = ProjectManager::new(&pool).of_user(3).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].team_lead_email.as_deref(), Some("bob@example.com"));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn ok_members_with_email(pool: sqlx::SqlitePool) {
        let members = ProjectManager::new(&pool).members(1).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().any(|m| m.email == "carol@example.com"));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks", "chats"))]
    async fn ok_delete_project_cascades(pool: sqlx::SqlitePool) {
        ProjectManager::new(&pool).delete(1).await.unwrap();

        for table in ["Project", "ProjectMember", "Task", "TeamChat"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table} not emptied");
        }
    }

    #[sqlx::test(fixtures("users", "workspaces"))]
    async fn err_delete_missing_project(pool: sqlx::SqlitePool) {
        assert!(matches!(
            ProjectManager::new(&pool).delete(999).await,
            Err(Error::DoesNotExist)
        ));
    }
}
