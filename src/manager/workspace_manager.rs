use super::{Workspace, WorkspaceUser, WorkspaceUserWithEmail};

pub struct WorkspaceManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> WorkspaceManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub enum Error {
    NameTaken,
    DoesNotExist,
    UnknownUser,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Error::DoesNotExist;
        }
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return Error::NameTaken;
            }
            if db.is_foreign_key_violation() {
                return Error::UnknownUser;
            }
        }
        Error::DatabaseError(err)
    }
}

impl WorkspaceManager<'_> {
    pub async fn create(&self, name: &str, admin_id: i64) -> Result<Workspace, Error> {
        Ok(sqlx::query_as(
            "INSERT INTO Workspace(workspace_name, admin_id) VALUES (?, ?) RETURNING *",
        )
        .bind(name)
        .bind(admin_id)
        .fetch_one(self.pool)
        .await?)
    }

    /// Bulk membership insert. Already-present members are skipped, so the
    /// call is idempotent; unknown user ids fail the whole batch.
    pub async fn add_users(
        &self,
        workspace_id: i64,
        user_ids: &[i64],
    ) -> Result<Vec<WorkspaceUser>, Error> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT id FROM Workspace WHERE id = ?)")
                .bind(workspace_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(Error::DoesNotExist);
        }

        for user_id in user_ids {
            sqlx::query("INSERT OR IGNORE INTO WorkspaceUser(workspace_id, user_id) VALUES (?, ?)")
                .bind(workspace_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let mut memberships = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let row: WorkspaceUser =
                sqlx::query_as("SELECT * FROM WorkspaceUser WHERE workspace_id = ? AND user_id = ?")
                    .bind(workspace_id)
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            memberships.push(row);
        }

        tx.commit().await?;
        Ok(memberships)
    }

    pub async fn remove_user(&self, workspace_id: i64, user_id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM WorkspaceUser WHERE workspace_id = ? AND user_id = ?")
            .bind(workspace_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<Workspace>, Error> {
        Ok(sqlx::query_as("SELECT * FROM Workspace ORDER BY id")
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn by_id(&self, workspace_id: i64) -> Result<Workspace, Error> {
        sqlx::query_as("SELECT * FROM Workspace WHERE id = ?")
            .bind(workspace_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(Error::DoesNotExist)
    }

    /// Deletes the workspace and everything under it: memberships, projects,
    /// project members, tasks and chat, in one transaction. Deleting an
    /// unknown id is a no-op.
    pub async fn delete(&self, workspace_id: i64) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM TeamChat WHERE project_id IN (SELECT id FROM Project WHERE workspace_id = ?)",
        )
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM Task WHERE project_id IN (SELECT id FROM Project WHERE workspace_id = ?)",
        )
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "DELETE FROM ProjectMember WHERE project_id IN (SELECT id FROM Project WHERE workspace_id = ?)",
        )
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM Project WHERE workspace_id = ?")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM WorkspaceUser WHERE workspace_id = ?")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM Workspace WHERE id = ?")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn of_user(&self, user_id: i64) -> Result<Vec<Workspace>, Error> {
        Ok(sqlx::query_as(
            "SELECT w.* FROM Workspace w \
             JOIN WorkspaceUser wu ON wu.workspace_id = w.id \
             WHERE wu.user_id = ? ORDER BY w.id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?)
    }

    pub async fn users_of(&self, workspace_id: i64) -> Result<Vec<WorkspaceUserWithEmail>, Error> {
        Ok(sqlx::query_as(
            "SELECT wu.id, wu.workspace_id, wu.user_id, u.email, wu.date_added \
             FROM WorkspaceUser wu \
             JOIN User u ON u.id = wu.user_id \
             WHERE wu.workspace_id = ? ORDER BY wu.id",
        )
        .bind(workspace_id)
        .fetch_all(self.pool)
        .await?)
    }
}
