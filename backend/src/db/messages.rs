//! Direct message repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::{
    datetime_to_str, decode_err, str_to_datetime, str_to_datetime_opt,
};

const MESSAGE_COLUMNS: &str = "m.id, m.sender_id, m.recipient_id, m.content, m.time_sent";

/// Message record from database
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub time_sent: DateTime<Utc>,
}

impl sqlx::FromRow<'_, SqliteRow> for MessageRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let time_sent_str: String = row.try_get("time_sent")?;

        Ok(Self {
            id: row.try_get("id")?,
            sender_id: row.try_get("sender_id")?,
            recipient_id: row.try_get("recipient_id")?,
            content: row.try_get("content")?,
            time_sent: str_to_datetime(&time_sent_str).map_err(decode_err)?,
        })
    }
}

/// The latest message of a pairwise thread, with the last activity in each
/// direction as seen from the message's sender
#[derive(Debug, Clone)]
pub struct ThreadMessageRecord {
    pub message: MessageRecord,
    /// Latest message from the sender to the recipient
    pub most_recent_sent: Option<DateTime<Utc>>,
    /// Latest message from the recipient back to the sender
    pub most_recent_received: Option<DateTime<Utc>>,
}

impl sqlx::FromRow<'_, SqliteRow> for ThreadMessageRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let sent: Option<String> = row.try_get("most_recent_sent")?;
        let received: Option<String> = row.try_get("most_recent_received")?;

        Ok(Self {
            message: <MessageRecord as sqlx::FromRow<'_, SqliteRow>>::from_row(row)?,
            most_recent_sent: str_to_datetime_opt(sent.as_deref()).map_err(decode_err)?,
            most_recent_received: str_to_datetime_opt(received.as_deref()).map_err(decode_err)?,
        })
    }
}

/// Input for sending a message
#[derive(Debug)]
pub struct CreateMessage {
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub time_sent: DateTime<Utc>,
}

pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a message
    pub async fn create(&self, input: CreateMessage) -> Result<MessageRecord> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, content, time_sent)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, sender_id, recipient_id, content, time_sent
            "#,
        )
        .bind(input.sender_id)
        .bind(input.recipient_id)
        .bind(&input.content)
        .bind(datetime_to_str(input.time_sent))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Messages sent by a hiker, newest first
    pub async fn list_sent(&self, hiker_id: i64) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.sender_id = ?1 \
             ORDER BY m.time_sent DESC, m.id DESC"
        ))
        .bind(hiker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Messages received by a hiker, newest first
    pub async fn list_received(&self, hiker_id: i64) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.recipient_id = ?1 \
             ORDER BY m.time_sent DESC, m.id DESC"
        ))
        .bind(hiker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Every message between two hikers in either direction, newest first
    pub async fn list_thread(&self, hiker_id: i64, other_id: i64) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages m
            WHERE (m.sender_id = ?1 AND m.recipient_id = ?2)
               OR (m.sender_id = ?2 AND m.recipient_id = ?1)
            ORDER BY m.time_sent DESC, m.id DESC
            "#
        ))
        .bind(hiker_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// One row per person the hiker has exchanged messages with: the latest
    /// message of that thread, most recent thread first.
    ///
    /// Messages with identical timestamps resolve to the later-inserted one.
    pub async fn list_latest_per_thread(&self, hiker_id: i64) -> Result<Vec<ThreadMessageRecord>> {
        let records = sqlx::query_as::<_, ThreadMessageRecord>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS},
                   (SELECT MAX(s.time_sent) FROM messages s
                    WHERE s.sender_id = m.sender_id
                      AND s.recipient_id = m.recipient_id) AS most_recent_sent,
                   (SELECT MAX(r.time_sent) FROM messages r
                    WHERE r.sender_id = m.recipient_id
                      AND r.recipient_id = m.sender_id) AS most_recent_received
            FROM (
                SELECT messages.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY CASE
                               WHEN messages.sender_id = ?1 THEN messages.recipient_id
                               ELSE messages.sender_id
                           END
                           ORDER BY messages.time_sent DESC, messages.id DESC
                       ) AS rank_in_thread
                FROM messages
                WHERE messages.sender_id = ?1 OR messages.recipient_id = ?1
            ) m
            WHERE m.rank_in_thread = 1
            ORDER BY m.time_sent DESC, m.id DESC
            "#
        ))
        .bind(hiker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Database;
    use crate::db::test_support;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    async fn send(db: &Database, from: i64, to: i64, content: &str, minute: u32) -> MessageRecord {
        db.messages()
            .create(CreateMessage {
                sender_id: from,
                recipient_id: to,
                content: content.to_string(),
                time_sent: at(minute),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_thread_contains_both_directions() {
        let db = test_support::database().await;
        let a = test_support::hiker(&db, "a").await;
        let b = test_support::hiker(&db, "b").await;
        let c = test_support::hiker(&db, "c").await;

        send(&db, a.id, b.id, "hi", 1).await;
        send(&db, b.id, a.id, "hello", 2).await;
        send(&db, a.id, c.id, "unrelated", 3).await;
        send(&db, a.id, b.id, "trail tomorrow?", 4).await;

        let thread = db.messages().list_thread(a.id, b.id).await.unwrap();
        let contents: Vec<&str> = thread.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["trail tomorrow?", "hello", "hi"]);

        let reversed = db.messages().list_thread(b.id, a.id).await.unwrap();
        assert_eq!(reversed.len(), 3);
    }

    #[tokio::test]
    async fn test_latest_per_thread() {
        let db = test_support::database().await;
        let h = test_support::hiker(&db, "h").await;
        let x = test_support::hiker(&db, "x").await;
        let y = test_support::hiker(&db, "y").await;

        send(&db, h.id, x.id, "to x", 1).await;
        send(&db, x.id, h.id, "from x", 5).await;
        send(&db, h.id, y.id, "to y", 3).await;

        let threads = db.messages().list_latest_per_thread(h.id).await.unwrap();
        assert_eq!(threads.len(), 2);

        let first = &threads[0];
        assert_eq!(first.message.content, "from x");
        // Relative to x, who sent the latest message
        assert_eq!(first.most_recent_sent, Some(at(5)));
        assert_eq!(first.most_recent_received, Some(at(1)));

        let second = &threads[1];
        assert_eq!(second.message.content, "to y");
        assert_eq!(second.most_recent_sent, Some(at(3)));
        assert_eq!(second.most_recent_received, None);
    }

    #[tokio::test]
    async fn test_latest_per_thread_breaks_timestamp_ties() {
        let db = test_support::database().await;
        let h = test_support::hiker(&db, "h").await;
        let x = test_support::hiker(&db, "x").await;

        send(&db, h.id, x.id, "first", 7).await;
        send(&db, x.id, h.id, "second", 7).await;

        let threads = db.messages().list_latest_per_thread(h.id).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].message.content, "second");
    }

    #[tokio::test]
    async fn test_sent_and_received() {
        let db = test_support::database().await;
        let a = test_support::hiker(&db, "a").await;
        let b = test_support::hiker(&db, "b").await;

        send(&db, a.id, b.id, "one", 1).await;
        send(&db, a.id, b.id, "two", 2).await;

        assert_eq!(db.messages().list_sent(a.id).await.unwrap().len(), 2);
        assert!(db.messages().list_received(a.id).await.unwrap().is_empty());

        let received = db.messages().list_received(b.id).await.unwrap();
        assert_eq!(received[0].content, "two");
        assert!(db.messages().list_latest_per_thread(9999).await.unwrap().is_empty());
    }
}
