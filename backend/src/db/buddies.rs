//! Hiking buddy repository
//!
//! A buddy row records that another hiker came along on a hike.

use anyhow::Result;
use sqlx::SqlitePool;

/// Buddy record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuddyRecord {
    pub id: i64,
    pub hike_id: i64,
    pub friend_id: i64,
}

pub struct BuddyRepository {
    pool: SqlitePool,
}

impl BuddyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Buddies on a hike
    pub async fn list_by_hike(&self, hike_id: i64) -> Result<Vec<BuddyRecord>> {
        let records = sqlx::query_as::<_, BuddyRecord>(
            "SELECT id, hike_id, friend_id FROM buddies WHERE hike_id = ?1 ORDER BY id",
        )
        .bind(hike_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn create(&self, hike_id: i64, friend_id: i64) -> Result<BuddyRecord> {
        let record = sqlx::query_as::<_, BuddyRecord>(
            r#"
            INSERT INTO buddies (hike_id, friend_id)
            VALUES (?1, ?2)
            RETURNING id, hike_id, friend_id
            "#,
        )
        .bind(hike_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::db::CreateHike;
    use crate::db::test_support;

    #[tokio::test]
    async fn test_buddies_on_hike() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let leader = test_support::hiker(&db, "leader").await;
        let buddy = test_support::hiker(&db, "buddy").await;

        let hike = db
            .hikes()
            .create(CreateHike {
                trail_id: trail.id,
                hiker_id: leader.id,
                check_in_date: Utc::now(),
            })
            .await
            .unwrap();

        let created = db.buddies().create(hike.id, buddy.id).await.unwrap();
        assert_eq!(created.friend_id, buddy.id);

        let buddies = db.buddies().list_by_hike(hike.id).await.unwrap();
        assert_eq!(buddies.len(), 1);
        assert!(db.buddies().create(hike.id, 4040).await.is_err());
    }
}
