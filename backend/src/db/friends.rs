//! Friendship repository
//!
//! Friendship is directional: A befriending B writes one row, and B
//! befriending A back is a second, independent row.

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::int_to_bool;

/// Friend record from database
#[derive(Debug, Clone)]
pub struct FriendRecord {
    pub id: i64,
    pub hiker_id: i64,
    pub friend_id: i64,
    pub friended_back: bool,
}

impl sqlx::FromRow<'_, SqliteRow> for FriendRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        Ok(Self {
            id: row.try_get("id")?,
            hiker_id: row.try_get("hiker_id")?,
            friend_id: row.try_get("friend_id")?,
            friended_back: int_to_bool(row.try_get("friended_back")?),
        })
    }
}

pub struct FriendRepository {
    pool: SqlitePool,
}

impl FriendRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Friends a hiker has added
    pub async fn list_by_hiker(&self, hiker_id: i64) -> Result<Vec<FriendRecord>> {
        let records = sqlx::query_as::<_, FriendRecord>(
            r#"
            SELECT id, hiker_id, friend_id, friended_back
            FROM friends
            WHERE hiker_id = ?1
            ORDER BY id
            "#,
        )
        .bind(hiker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Record that `hiker_id` befriended `friend_id`. The row starts out not
    /// friended back and the reverse direction is left alone.
    pub async fn create(&self, hiker_id: i64, friend_id: i64) -> Result<FriendRecord> {
        let record = sqlx::query_as::<_, FriendRecord>(
            r#"
            INSERT INTO friends (hiker_id, friend_id, friended_back)
            VALUES (?1, ?2, 0)
            RETURNING id, hiker_id, friend_id, friended_back
            "#,
        )
        .bind(hiker_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Whether a row exists in the given direction
    pub async fn exists(&self, hiker_id: i64, friend_id: i64) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM friends WHERE hiker_id = ?1 AND friend_id = ?2)",
        )
        .bind(hiker_id)
        .bind(friend_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
