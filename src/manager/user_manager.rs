use super::{Profile, Role, User};

/// Cost factor for the salted password hash.
const HASH_COST: u32 = 10;

#[derive(Clone)]
pub struct UserManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> UserManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub enum Error {
    UsernameTaken,
    EmailTaken,
    WrongPassword,
    DoesNotExist,
    OwnsWorkspaces,
    Hashing(bcrypt::BcryptError),
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

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Hashing(err)
    }
}

impl UserManager<'_> {
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Profile, Error> {
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT id FROM User WHERE username = ?)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        if username_taken {
            return Err(Error::UsernameTaken);
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT id FROM User WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        if email_taken {
            return Err(Error::EmailTaken);
        }

        let hash = bcrypt::hash(password, HASH_COST)?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO User(username, email, password, role) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(email)
        .bind(&hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err.as_database_error() {
            // The pre-checks race with concurrent registrations; the unique
            // indexes are the backstop.
            Some(db) if db.is_unique_violation() => Error::UsernameTaken,
            _ => Error::DatabaseError(err),
        })?;

        self.profile_by_id(id).await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Profile, Error> {
        let user: User = sqlx::query_as("SELECT * FROM User WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        if bcrypt::verify(password, &user.password)? {
            Ok(user.into())
        } else {
            Err(Error::WrongPassword)
        }
    }

    pub async fn profile_by_id(&self, id: i64) -> Result<Profile, Error> {
        Ok(sqlx::query_as(
            "SELECT id, username, email, role, date_created FROM User WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?)
    }

    pub async fn list(&self) -> Result<Vec<Profile>, Error> {
        Ok(
            sqlx::query_as("SELECT id, username, email, role, date_created FROM User ORDER BY id")
                .fetch_all(self.pool)
                .await?,
        )
    }

    /// Deletes a user and everything that references them: memberships go
    /// away, assigned tasks become unassigned, chat authorship and project
    /// leadership become null. Refuses while the user still owns workspaces.
    pub async fn delete(&self, user_id: i64) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        let owns_workspaces: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT id FROM Workspace WHERE admin_id = ?)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if owns_workspaces {
            return Err(Error::OwnsWorkspaces);
        }

        sqlx::query("DELETE FROM WorkspaceUser WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ProjectMember WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE Task SET assigned_to = NULL WHERE assigned_to = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE TeamChat SET user_id = NULL WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE Project SET team_lead_id = NULL WHERE team_lead_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM User WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(Error::DoesNotExist);
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn ok_register_then_login(pool: sqlx::SqlitePool) {
        let manager = UserManager::new(&pool);
        let profile = manager
            .register("erin", "erin@example.com", "hunter2", Role::Standard)
            .await
            .unwrap();
        assert_eq!(profile.username, "erin");
        assert_eq!(profile.role, Role::Standard);

        assert!(manager
            .verify_credentials("erin@example.com", "hunter2")
            .await
            .is_ok());
    }

    #[sqlx::test]
    async fn err_wrong_password(pool: sqlx::SqlitePool) {
        let manager = UserManager::new(&pool);
        manager
            .register("erin", "erin@example.com", "hunter2", Role::Standard)
            .await
            .unwrap();

        assert!(matches!(
            manager
                .verify_credentials("erin@example.com", "*******")
                .await,
            Err(Error::WrongPassword)
        ));
    }

    #[sqlx::test]
    async fn err_unknown_email(pool: sqlx::SqlitePool) {
        assert!(matches!(
            UserManager::new(&pool)
                .verify_credentials("ghost@example.com", "hunter2")
                .await,
            Err(Error::DoesNotExist)
        ));
    }

    #[sqlx::test(fixtures("users"))]
    async fn err_username_taken(pool: sqlx::SqlitePool) {
        assert!(matches!(
            UserManager::new(&pool)
                .register("alice", "new@example.com", "hunter2", Role::Standard)
                .await,
            Err(Error::UsernameTaken)
        ));
    }

    #[sqlx::test(fixtures("users"))]
    async fn err_email_taken(pool: sqlx::SqlitePool) {
        assert!(matches!(
            UserManager::new(&pool)
                .register("newname", "alice@example.com", "hunter2", Role::Standard)
                .await,
            Err(Error::EmailTaken)
        ));
    }

    #[sqlx::test]
    async fn profile_serializes_without_password(pool: sqlx::SqlitePool) {
        let profile = UserManager::new(&pool)
            .register("erin", "erin@example.com", "hunter2", Role::Standard)
            .await
            .unwrap();

        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["username"], "erin");
    }

    #[sqlx::test(fixtures("users", "workspaces"))]
    async fn err_delete_workspace_owner(pool: sqlx::SqlitePool) {
        assert!(matches!(
            UserManager::new(&pool).delete(1).await,
            Err(Error::OwnsWorkspaces)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "tasks"))]
    async fn ok_delete_user_cascades(pool: sqlx::SqlitePool) {
        UserManager::new(&pool).delete(3).await.unwrap();

        let memberships: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM WorkspaceUser WHERE user_id = 3")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(memberships, 0);

        let project_memberships: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ProjectMember WHERE user_id = 3")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(project_memberships, 0);

        let still_assigned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM Task WHERE assigned_to = 3")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(still_assigned, 0);
    }

    #[sqlx::test(fixtures("users"))]
    async fn err_delete_missing_user(pool: sqlx::SqlitePool) {
        assert!(matches!(
            UserManager::new(&pool).delete(999).await,
            Err(Error::DoesNotExist)
        ));
    }
}
