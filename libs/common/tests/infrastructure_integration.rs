//! Integration tests for the infrastructure components
//!
//! These tests verify that the SQLite store and the response cache work
//! together the way the service uses them.

use common::{
    cache::ResponseCache,
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

/// Test that verifies the store is reachable and the cache serves and
/// forgets snapshots of query results
#[tokio::test]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;
    run_migrations(&pool).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    sqlx::query("INSERT INTO users (email, password, created_at) VALUES (?, ?, ?)")
        .bind("cache@example.com")
        .bind("hash")
        .bind("2024-01-01T00:00:00Z")
        .execute(&pool)
        .await?;

    let emails: Vec<String> = sqlx::query_scalar("SELECT email FROM users")
        .fetch_all(&pool)
        .await?;

    let cache: ResponseCache<Vec<String>> = ResponseCache::default();
    cache.set(1, "list_users", emails).await;
    assert_eq!(
        cache.get(1, "list_users").await,
        Some(vec!["cache@example.com".to_string()]),
        "Cache SET/GET test failed"
    );

    cache.invalidate(1, "list_users").await;
    assert_eq!(cache.get(1, "list_users").await, None, "Cache invalidate failed");

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_by_schema() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;
    run_migrations(&pool).await?;

    let insert = "INSERT INTO users (email, password, created_at) VALUES ('a@x.com', 'h', '2024-01-01T00:00:00Z')";
    sqlx::query(insert).execute(&pool).await?;
    let err = sqlx::query(insert).execute(&pool).await.unwrap_err();

    assert!(matches!(
        common::error::DatabaseError::from_query(err),
        common::error::DatabaseError::Conflict(_)
    ));
    Ok(())
}
