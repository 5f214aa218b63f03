//! Trail tag repository

use anyhow::Result;
use sqlx::SqlitePool;

/// Tag record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRecord {
    pub id: i64,
    pub trail_id: i64,
    pub tag: String,
}

pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tags attached to a trail
    pub async fn list_by_trail(&self, trail_id: i64) -> Result<Vec<TagRecord>> {
        let records = sqlx::query_as::<_, TagRecord>(
            "SELECT id, trail_id, tag FROM tags WHERE trail_id = ?1 ORDER BY id",
        )
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Attach a free-text tag to a trail
    pub async fn create(&self, trail_id: i64, tag: &str) -> Result<TagRecord> {
        let record = sqlx::query_as::<_, TagRecord>(
            "INSERT INTO tags (trail_id, tag) VALUES (?1, ?2) RETURNING id, trail_id, tag",
        )
        .bind(trail_id)
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support;

    #[tokio::test]
    async fn test_tags_per_trail() {
        let db = test_support::database().await;
        let ridge = test_support::trail(&db, "Ridge Loop", 5).await;
        let lake = test_support::trail(&db, "Lake Walk", 2).await;

        db.tags().create(ridge.id, "views").await.unwrap();
        db.tags().create(ridge.id, "views").await.unwrap();
        db.tags().create(lake.id, "family").await.unwrap();

        let tags = db.tags().list_by_trail(ridge.id).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|t| t.tag == "views"));
    }
}
