use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserRow;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Email already exists")]
    EmailTaken,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user; the UNIQUE index on `email` is the final arbiter for
    /// two registrations racing on the same address.
    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<UserRow, UserError> {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.email)
        .bind(&row.name)
        .bind(&row.password_hash)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(UserError::EmailTaken),
            Err(e) => Err(UserError::DatabaseError(e)),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, UserError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<UserRow>, UserError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = UserRepository::new(test_pool().await);

        let created = repo.create("Alice", "a@x.com", "hash").await.unwrap();

        let by_email = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let id = Uuid::parse_str(&created.id).unwrap();
        let by_id = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Alice");

        assert!(repo.email_exists("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let repo = UserRepository::new(test_pool().await);
        repo.create("Alice", "a@x.com", "hash").await.unwrap();

        assert!(repo.find_by_email("A@X.COM").await.unwrap().is_none());
        assert!(!repo.email_exists("A@X.COM").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = UserRepository::new(test_pool().await);
        repo.create("Alice", "a@x.com", "hash").await.unwrap();

        let second = repo.create("Other", "a@x.com", "hash").await;
        assert!(matches!(second, Err(UserError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let repo = UserRepository::new(test_pool().await);
        assert!(repo.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
    }
}
