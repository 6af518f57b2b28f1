//! User repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{NewUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// Fails with [`DatabaseError::Conflict`] when the email is taken.
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.email);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, created_at)
            VALUES (?, ?, ?)
            RETURNING id, email, password, created_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(user)
    }

    /// Find a user by email (exact, case-sensitive match)
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Check whether a user with this id exists
    pub async fn exists(&self, id: i64) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn repository() -> UserRepository {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        UserRepository::new(pool)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() -> anyhow::Result<()> {
        let users = repository().await;

        let created = users.create(&new_user("a@x.com")).await?;
        assert!(created.id > 0);
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.password_hash, "$argon2id$stub");

        let by_email = users.find_by_email("a@x.com").await?.unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = users.find_by_id(created.id).await?.unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.created_at, created.created_at);

        assert!(users.exists(created.id).await?);
        assert!(!users.exists(created.id + 1).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() -> anyhow::Result<()> {
        let users = repository().await;
        users.create(&new_user("a@x.com")).await?;

        assert!(users.find_by_email("A@x.com").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() -> anyhow::Result<()> {
        let users = repository().await;
        users.create(&new_user("a@x.com")).await?;

        let err = users.create(&new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        Ok(())
    }
}
