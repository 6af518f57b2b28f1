//! Post repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::Post;

/// Post repository for database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post owned by `user_id`
    pub async fn create(&self, user_id: i64, text: &str) -> DatabaseResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (text, user_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, text, created_at
            "#,
        )
        .bind(text)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        info!("Created post {} for user {}", post.id, user_id);
        Ok(post)
    }

    /// All posts owned by `user_id`, in insertion order
    pub async fn list_by_user(&self, user_id: i64) -> DatabaseResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, text, created_at
            FROM posts
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Get a post by ID
    pub async fn find(&self, post_id: i64) -> DatabaseResult<Option<Post>> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, text, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Delete a post by ID; ownership must already be checked.
    ///
    /// Returns whether a row was removed.
    pub async fn delete(&self, post_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        info!("Deleted post {}", post_id);
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::{UserRepository, models::NewUser};
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn setup() -> (PostRepository, i64, i64) {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let users = UserRepository::new(pool.clone());
        let mut ids = Vec::new();
        for email in ["a@x.com", "b@x.com"] {
            let user = users
                .create(&NewUser {
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        (PostRepository::new(pool), ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_create_find_delete() {
        let (posts, alice, _) = setup().await;

        let created = posts.create(alice, "hello").await.unwrap();
        assert_eq!(created.user_id, alice);
        assert_eq!(created.text, "hello");

        let found = posts.find(created.id).await.unwrap();
        assert_eq!(found, Some(created.clone()));

        assert!(posts.delete(created.id).await.unwrap());
        assert_eq!(posts.find(created.id).await.unwrap(), None);
        assert!(!posts.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_per_user_in_insertion_order() {
        let (posts, alice, bob) = setup().await;

        let first = posts.create(alice, "first").await.unwrap();
        posts.create(bob, "bob's").await.unwrap();
        let second = posts.create(alice, "second").await.unwrap();

        let listed = posts.list_by_user(alice).await.unwrap();
        assert_eq!(listed, vec![first, second]);

        let listed = posts.list_by_user(bob).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "bob's");
    }

    #[tokio::test]
    async fn test_post_for_missing_user_is_rejected() {
        let (posts, _, _) = setup().await;
        assert!(posts.create(9999, "orphan").await.is_err());
    }
}
