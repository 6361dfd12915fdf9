use super::RepoTx;
use crate::database::models::{NewUser, User};
use crate::error::Result;
use chrono::{DateTime, Utc};

impl RepoTx {
    pub async fn insert_user(&mut self, new: &NewUser) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(new.status)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;

        tracing::debug!("Created user: {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    pub async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    pub async fn username_exists(&mut self, username: &str) -> Result<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(found)
    }

    pub async fn email_exists(&mut self, email: &str) -> Result<bool> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(found)
    }

    pub async fn record_login(&mut self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ?, updated_at = ? WHERE id = ?")
            .bind(at)
            .bind(at)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        tracing::debug!("Recorded login for user: {}", user_id);
        Ok(())
    }

    pub async fn count_users(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::models::{NewUser, UserRole, UserStatus};
    use crate::testing::memory_repository;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            status: UserStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let repo = memory_repository().await;
        let mut tx = repo.begin().await.unwrap();

        let user = tx.insert_user(&new_user("alice")).await.unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login.is_none());

        let by_name = tx.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = tx.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        assert!(tx.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let repo = memory_repository().await;
        let mut tx = repo.begin().await.unwrap();
        tx.insert_user(&new_user("alice")).await.unwrap();

        assert!(tx.username_exists("alice").await.unwrap());
        assert!(!tx.username_exists("Alice2").await.unwrap());
        assert!(tx.email_exists("alice@example.com").await.unwrap());
        assert!(!tx.email_exists("bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_by_storage() {
        let repo = memory_repository().await;
        let mut tx = repo.begin().await.unwrap();
        tx.insert_user(&new_user("alice")).await.unwrap();

        let mut dup = new_user("alice");
        dup.email = "other@example.com".to_string();
        assert!(tx.insert_user(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_rollback_on_drop() {
        let repo = memory_repository().await;

        {
            let mut tx = repo.begin().await.unwrap();
            tx.insert_user(&new_user("ghost")).await.unwrap();
        }

        let mut tx = repo.begin().await.unwrap();
        assert_eq!(tx.count_users().await.unwrap(), 0);
    }
}
