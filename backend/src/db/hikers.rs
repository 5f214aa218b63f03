//! Hiker repository
//!
//! A hiker is the app-side profile of exactly one user account.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;

/// Hiker record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HikerRecord {
    pub id: i64,
    pub user_id: i64,
}

pub struct HikerRepository {
    pool: SqlitePool,
}

impl HikerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a hiker by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<HikerRecord>> {
        let record =
            sqlx::query_as::<_, HikerRecord>("SELECT id, user_id FROM hikers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    /// Get the hiker profile linked to a user account
    pub async fn get_by_user_id(&self, user_id: i64) -> Result<Option<HikerRecord>> {
        let record =
            sqlx::query_as::<_, HikerRecord>("SELECT id, user_id FROM hikers WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    /// Load many hikers at once, keyed by ID. Missing IDs are simply absent.
    pub async fn get_many(&self, ids: &[i64]) -> Result<HashMap<i64, HikerRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT id, user_id FROM hikers WHERE id IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, HikerRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Create the hiker profile for a user
    pub async fn create(&self, user_id: i64) -> Result<HikerRecord> {
        let record = sqlx::query_as::<_, HikerRecord>(
            "INSERT INTO hikers (user_id) VALUES (?1) RETURNING id, user_id",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support;

    #[tokio::test]
    async fn test_lookup_by_user() {
        let db = test_support::database().await;
        let hiker = test_support::hiker(&db, "mesa").await;

        let found = db
            .hikers()
            .get_by_user_id(hiker.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, hiker.id);
        assert!(db.hikers().get_by_user_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_missing() {
        let db = test_support::database().await;
        let a = test_support::hiker(&db, "a").await;
        let b = test_support::hiker(&db, "b").await;

        let found = db.hikers().get_many(&[a.id, b.id, 4242]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[&b.id].user_id, b.user_id);
        assert!(db.hikers().get_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_hiker_per_user() {
        let db = test_support::database().await;
        let hiker = test_support::hiker(&db, "solo").await;
        assert!(db.hikers().create(hiker.user_id).await.is_err());
    }
}
