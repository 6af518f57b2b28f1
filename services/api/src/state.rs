//! Application state shared across handlers

use auth::{TokenService, UserRepository};
use axum::body::Bytes;
use common::cache::ResponseCache;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::repositories::PostRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub post_repository: PostRepository,
    pub tokens: TokenService,
    /// Serialized response bodies of cacheable read endpoints
    pub cache: ResponseCache<Bytes>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, tokens: TokenService, cache_ttl: Duration) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            post_repository: PostRepository::new(db_pool.clone()),
            db_pool,
            tokens,
            cache: ResponseCache::new(cache_ttl),
        }
    }

    /// Periodically drop stale cache entries until the runtime shuts down
    pub fn spawn_cache_purger(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} stale cache entries", purged);
                }
            }
        })
    }
}
