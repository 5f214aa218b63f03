//! Database connection and operations
//!
//! Each table group has a repository; [`Database`] hands them out over a shared
//! SQLite pool. Repositories return `anyhow::Result` and report a missing row as
//! `Ok(None)`, leaving it to the caller to decide whether that is an error.

pub mod buddies;
pub mod equipment;
pub mod friends;
pub mod hikers;
pub mod hikes;
pub mod messages;
pub mod sqlite_helpers;
pub mod tags;
pub mod trails;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use buddies::{BuddyRecord, BuddyRepository};
pub use equipment::{
    EquipmentRepository, EquipmentTypeRecord, EquipmentUsedRecord, SuggestedEquipmentRecord,
};
pub use friends::{FriendRecord, FriendRepository};
pub use hikers::{HikerRecord, HikerRepository};
pub use hikes::{CreateHike, HikeRecord, HikeRepository, ReviewedHikeRecord, UpdateReview};
pub use messages::{CreateMessage, MessageRecord, MessageRepository, ThreadMessageRecord};
pub use tags::{TagRecord, TagRepository};
pub use trails::{CreateTrail, TrailRecord, TrailRepository, TrailStatsRecord};
pub use users::{UserRecord, UserRepository};

/// Default maximum pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool.
    ///
    /// File databases are created if missing. An in-memory database lives and
    /// dies with its connection, so its pool is pinned to a single connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database URL '{}'", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:");
        if !in_memory {
            let parent = options.get_filename().parent();
            if let Some(dir) = parent.filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("Failed to create database directory {}", dir.display())
                })?;
            }
        }

        let pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(10));
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Create a new database connection pool with retry logic.
    /// Retries every `retry_interval` until `timeout` has elapsed.
    pub async fn connect_with_retry(
        url: &str,
        max_connections: u32,
        retry_interval: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match Self::connect(url, max_connections).await {
                Ok(db) => return Ok(db),
                Err(e) if tokio::time::Instant::now() + retry_interval < deadline => {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = retry_interval.as_secs(),
                        "Database connection failed, retrying"
                    );
                    tokio::time::sleep(retry_interval).await;
                }
                Err(e) => return Err(e.context("Giving up on database connection")),
            }
        }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a users repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a hikers repository
    pub fn hikers(&self) -> HikerRepository {
        HikerRepository::new(self.pool.clone())
    }

    /// Get a trails repository
    pub fn trails(&self) -> TrailRepository {
        TrailRepository::new(self.pool.clone())
    }

    /// Get a hikes repository
    pub fn hikes(&self) -> HikeRepository {
        HikeRepository::new(self.pool.clone())
    }

    /// Get an equipment repository (types, suggestions, usage)
    pub fn equipment(&self) -> EquipmentRepository {
        EquipmentRepository::new(self.pool.clone())
    }

    /// Get a tags repository
    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.pool.clone())
    }

    /// Get a buddies repository
    pub fn buddies(&self) -> BuddyRepository {
        BuddyRepository::new(self.pool.clone())
    }

    /// Get a friends repository
    pub fn friends(&self) -> FriendRepository {
        FriendRepository::new(self.pool.clone())
    }

    /// Get a messages repository
    pub fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.pool.clone())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trailhead.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url, 2).await.unwrap();
        db.migrate().await.unwrap();

        assert!(path.exists());
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trails")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = test_support::database().await;
        db.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = test_support::database().await;
        let result = sqlx::query("INSERT INTO tags (trail_id, tag) VALUES (999, 'orphan')")
            .execute(db.pool())
            .await;
        assert!(result.is_err());
    }
}
