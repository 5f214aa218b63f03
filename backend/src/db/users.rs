//! User account repository
//!
//! Accounts are owned by the authentication provider; this layer only reads
//! them (and creates them for bootstrap tooling and tests).

use anyhow::Result;
use sqlx::SqlitePool;

/// User account record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Create a user account
    pub async fn create(&self, username: &str, email: Option<&str>) -> Result<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, email)
            VALUES (?1, ?2)
            RETURNING id, username, email
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_support::database().await;
        let created = db
            .users()
            .create("ridgewalker", Some("ridge@example.com"))
            .await
            .unwrap();

        let fetched = db.users().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "ridgewalker");
        assert_eq!(fetched.email.as_deref(), Some("ridge@example.com"));
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let db = test_support::database().await;
        db.users().create("dup", None).await.unwrap();
        assert!(db.users().create("dup", None).await.is_err());
    }
}
