use super::{ChatMessage, ChatMessageWithAuthor, Profile};

pub struct ChatManager<'a> {
    pool: &'a sqlx::SqlitePool,
}

impl<'a> ChatManager<'a> {
    pub fn new(pool: &'a sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub enum Error {
    NotMember,
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::DatabaseError(err)
    }
}

impl ChatManager<'_> {
    /// Appends a message. Only recorded project members may write, admins
    /// included only when they hold a membership themselves.
    pub async fn send(
        &self,
        author: &Profile,
        project_id: i64,
        message: &str,
    ) -> Result<ChatMessage, Error> {
        self.check_membership(project_id, author.id).await?;

        Ok(sqlx::query_as(
            "INSERT INTO TeamChat(project_id, user_id, message) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(project_id)
        .bind(author.id)
        .bind(message)
        .fetch_one(self.pool)
        .await?)
    }

    /// Messages oldest-first with the author's username resolved. Same
    /// membership gate as sending.
    pub async fn list(
        &self,
        caller: &Profile,
        project_id: i64,
    ) -> Result<Vec<ChatMessageWithAuthor>, Error> {
        self.check_membership(project_id, caller.id).await?;

        Ok(sqlx::query_as(
            "SELECT c.id, c.project_id, c.user_id, u.username, c.message, c.date_sent \
             FROM TeamChat c \
             LEFT JOIN User u ON u.id = c.user_id \
             WHERE c.project_id = ? \
             ORDER BY c.date_sent ASC, c.id ASC",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await?)
    }

    async fn check_membership(&self, project_id: i64, user_id: i64) -> Result<(), Error> {
        let is_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT id FROM ProjectMember WHERE project_id = ? AND user_id = ?)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        if is_member {
            Ok(())
        } else {
            Err(Error::NotMember)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::user_manager::UserManager;

    async fn profile(pool: &sqlx::SqlitePool, id: i64) -> Profile {
        UserManager::new(pool).profile_by_id(id).await.unwrap()
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects"))]
    async fn err_send_not_member(pool: sqlx::SqlitePool) {
        let dave = profile(&pool, 4).await;
        assert!(matches!(
            ChatManager::new(&pool).send(&dave, 1, "hi").await,
            Err(Error::NotMember)
        ));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "chats"))]
    async fn ok_send_appends_after_existing(pool: sqlx::SqlitePool) {
        let carol = profile(&pool, 3).await;
        let manager = ChatManager::new(&pool);

        manager.send(&carol, 1, "anyone around?").await.unwrap();

        let messages = manager.list(&carol, 1).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages.last().unwrap().message, "anyone around?");
        assert_eq!(messages.last().unwrap().username.as_deref(), Some("carol"));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "chats"))]
    async fn ok_list_is_oldest_first(pool: sqlx::SqlitePool) {
        let bob = profile(&pool, 2).await;
        let messages = ChatManager::new(&pool).list(&bob, 1).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert!(messages[0].date_sent <= messages[1].date_sent);
        assert_eq!(messages[0].username.as_deref(), Some("bob"));
    }

    #[sqlx::test(fixtures("users", "workspaces", "projects", "chats"))]
    async fn err_list_not_member(pool: sqlx::SqlitePool) {
        let dave = profile(&pool, 4).await;
        assert!(matches!(
            ChatManager::new(&pool).list(&dave, 1).await,
            Err(Error::NotMember)
        ));
    }
}
