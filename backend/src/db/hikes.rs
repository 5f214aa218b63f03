//! Hike database repository
//!
//! A hike is one visit of a hiker to a trail, opened by a check-in and closed
//! by a check-out. Reviews and ratings are written onto the hike afterwards.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::{
    datetime_to_str, decode_err, str_to_datetime, str_to_datetime_opt,
};

/// Columns selected for a hike, qualified with the `h` alias
const HIKE_COLUMNS: &str = "h.id, h.trail_id, h.hiker_id, h.check_in_date, h.check_out_date, \
                            h.review, h.difficulty, h.enjoyability";

/// Hike record from database
#[derive(Debug, Clone)]
pub struct HikeRecord {
    pub id: i64,
    pub trail_id: i64,
    pub hiker_id: i64,
    pub check_in_date: DateTime<Utc>,
    /// None while the hike is still open
    pub check_out_date: Option<DateTime<Utc>>,
    pub review: Option<String>,
    pub difficulty: Option<i64>,
    pub enjoyability: Option<i64>,
}

impl sqlx::FromRow<'_, SqliteRow> for HikeRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let check_in_str: String = row.try_get("check_in_date")?;
        let check_out_str: Option<String> = row.try_get("check_out_date")?;

        Ok(Self {
            id: row.try_get("id")?,
            trail_id: row.try_get("trail_id")?,
            hiker_id: row.try_get("hiker_id")?,
            check_in_date: str_to_datetime(&check_in_str).map_err(decode_err)?,
            check_out_date: str_to_datetime_opt(check_out_str.as_deref()).map_err(decode_err)?,
            review: row.try_get("review")?,
            difficulty: row.try_get("difficulty")?,
            enjoyability: row.try_get("enjoyability")?,
        })
    }
}

/// A reviewed hike ranked by how far its hiker has walked in total
#[derive(Debug, Clone)]
pub struct ReviewedHikeRecord {
    pub hike: HikeRecord,
    /// Sum of trail distances over every hike of the hiker. A trail hiked
    /// twice counts twice.
    pub total_hiker_distance: i64,
}

impl sqlx::FromRow<'_, SqliteRow> for ReviewedHikeRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        Ok(Self {
            hike: <HikeRecord as sqlx::FromRow<'_, SqliteRow>>::from_row(row)?,
            total_hiker_distance: row.try_get("total_hiker_distance")?,
        })
    }
}

/// Input for opening a hike
#[derive(Debug)]
pub struct CreateHike {
    pub trail_id: i64,
    pub hiker_id: i64,
    pub check_in_date: DateTime<Utc>,
}

/// Input for reviewing a hike; None leaves the stored value untouched
#[derive(Debug, Default)]
pub struct UpdateReview {
    pub review: Option<String>,
    pub difficulty: Option<i64>,
    pub enjoyability: Option<i64>,
}

pub struct HikeRepository {
    pool: SqlitePool,
}

impl HikeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get all hikes
    pub async fn list_all(&self) -> Result<Vec<HikeRecord>> {
        let records = sqlx::query_as::<_, HikeRecord>(&format!(
            "SELECT {HIKE_COLUMNS} FROM hikes h ORDER BY h.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Get a hike by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<HikeRecord>> {
        let record = sqlx::query_as::<_, HikeRecord>(&format!(
            "SELECT {HIKE_COLUMNS} FROM hikes h WHERE h.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Load many hikes at once, keyed by ID
    pub async fn get_many(&self, ids: &[i64]) -> Result<HashMap<i64, HikeRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT {HIKE_COLUMNS} FROM hikes h WHERE h.id IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, HikeRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }

    /// All hikes on a trail, newest first
    pub async fn list_by_trail(&self, trail_id: i64) -> Result<Vec<HikeRecord>> {
        let records = sqlx::query_as::<_, HikeRecord>(&format!(
            r#"
            SELECT {HIKE_COLUMNS}
            FROM hikes h
            WHERE h.trail_id = ?1
            ORDER BY h.check_in_date DESC, h.id DESC
            "#
        ))
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// All hikes of a hiker, newest first
    pub async fn list_by_hiker(&self, hiker_id: i64) -> Result<Vec<HikeRecord>> {
        let records = sqlx::query_as::<_, HikeRecord>(&format!(
            r#"
            SELECT {HIKE_COLUMNS}
            FROM hikes h
            WHERE h.hiker_id = ?1
            ORDER BY h.check_in_date DESC, h.id DESC
            "#
        ))
        .bind(hiker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Reviewed hikes on a trail, ranked by the reviewer's total distance
    /// across all of their hikes
    pub async fn list_expert_reviews(
        &self,
        trail_id: i64,
        limit: i64,
    ) -> Result<Vec<ReviewedHikeRecord>> {
        let records = sqlx::query_as::<_, ReviewedHikeRecord>(&format!(
            r#"
            SELECT {HIKE_COLUMNS},
                   (SELECT COALESCE(SUM(t2.distance), 0)
                    FROM hikes h2
                    JOIN trails t2 ON t2.id = h2.trail_id
                    WHERE h2.hiker_id = h.hiker_id) AS total_hiker_distance
            FROM hikes h
            WHERE h.trail_id = ?1
              AND h.review IS NOT NULL
            ORDER BY total_hiker_distance DESC, h.id
            LIMIT ?2
            "#
        ))
        .bind(trail_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Total distance of every trail the hiker has hiked, counting repeats
    pub async fn total_distance_for_hiker(&self, hiker_id: i64) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(t.distance), 0)
            FROM hikes h
            JOIN trails t ON t.id = h.trail_id
            WHERE h.hiker_id = ?1
            "#,
        )
        .bind(hiker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Each hiker's latest hike on a trail, newest first.
    ///
    /// Two hikes by the same hiker with identical check-in times resolve to
    /// the later-inserted one, so every hiker appears exactly once.
    pub async fn list_latest_per_hiker(&self, trail_id: i64) -> Result<Vec<HikeRecord>> {
        let records = sqlx::query_as::<_, HikeRecord>(&format!(
            r#"
            SELECT {HIKE_COLUMNS}
            FROM (
                SELECT hikes.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY hikes.hiker_id
                           ORDER BY hikes.check_in_date DESC, hikes.id DESC
                       ) AS rank_for_hiker
                FROM hikes
                WHERE hikes.trail_id = ?1
            ) h
            WHERE h.rank_for_hiker = 1
            ORDER BY h.check_in_date DESC, h.id DESC
            "#
        ))
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// The hiker's most recently checked-in hike on a trail
    pub async fn get_latest_for_hiker_on_trail(
        &self,
        hiker_id: i64,
        trail_id: i64,
    ) -> Result<Option<HikeRecord>> {
        let record = sqlx::query_as::<_, HikeRecord>(&format!(
            r#"
            SELECT {HIKE_COLUMNS}
            FROM hikes h
            WHERE h.hiker_id = ?1 AND h.trail_id = ?2
            ORDER BY h.check_in_date DESC, h.id DESC
            LIMIT 1
            "#
        ))
        .bind(hiker_id)
        .bind(trail_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Open a new hike
    pub async fn create(&self, input: CreateHike) -> Result<HikeRecord> {
        let record = sqlx::query_as::<_, HikeRecord>(
            r#"
            INSERT INTO hikes (trail_id, hiker_id, check_in_date)
            VALUES (?1, ?2, ?3)
            RETURNING id, trail_id, hiker_id, check_in_date, check_out_date,
                      review, difficulty, enjoyability
            "#,
        )
        .bind(input.trail_id)
        .bind(input.hiker_id)
        .bind(datetime_to_str(input.check_in_date))
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Close a hike. The stored check-out never precedes the check-in, even if
    /// `at` does (clock skew between writers).
    pub async fn check_out(&self, id: i64, at: DateTime<Utc>) -> Result<Option<HikeRecord>> {
        let record = sqlx::query_as::<_, HikeRecord>(
            r#"
            UPDATE hikes
            SET check_out_date = MAX(?2, check_in_date)
            WHERE id = ?1
            RETURNING id, trail_id, hiker_id, check_in_date, check_out_date,
                      review, difficulty, enjoyability
            "#,
        )
        .bind(id)
        .bind(datetime_to_str(at))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Write a review and ratings onto a hike
    pub async fn update_review(&self, id: i64, input: UpdateReview) -> Result<Option<HikeRecord>> {
        let record = sqlx::query_as::<_, HikeRecord>(
            r#"
            UPDATE hikes SET
                review = COALESCE(?2, review),
                difficulty = COALESCE(?3, difficulty),
                enjoyability = COALESCE(?4, enjoyability)
            WHERE id = ?1
            RETURNING id, trail_id, hiker_id, check_in_date, check_out_date,
                      review, difficulty, enjoyability
            "#,
        )
        .bind(id)
        .bind(&input.review)
        .bind(input.difficulty)
        .bind(input.enjoyability)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Database;
    use crate::db::test_support;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, minute, 0).unwrap()
    }

    async fn hike_at(
        db: &Database,
        trail_id: i64,
        hiker_id: i64,
        when: DateTime<Utc>,
    ) -> HikeRecord {
        db.hikes()
            .create(CreateHike {
                trail_id,
                hiker_id,
                check_in_date: when,
            })
            .await
            .unwrap()
    }

    async fn review(db: &Database, hike_id: i64, text: &str) {
        db.hikes()
            .update_review(
                hike_id,
                UpdateReview {
                    review: Some(text.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_opens_hike() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let hiker = test_support::hiker(&db, "h").await;

        let hike = hike_at(&db, trail.id, hiker.id, at(0)).await;
        assert_eq!(hike.check_in_date, at(0));
        assert!(hike.check_out_date.is_none());
        assert!(hike.review.is_none());

        let fetched = db.hikes().get_by_id(hike.id).await.unwrap().unwrap();
        assert_eq!(fetched.check_in_date, at(0));
    }

    #[tokio::test]
    async fn test_check_out_never_precedes_check_in() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let hiker = test_support::hiker(&db, "h").await;
        let hike = hike_at(&db, trail.id, hiker.id, at(30)).await;

        let closed = db.hikes().check_out(hike.id, at(45)).await.unwrap().unwrap();
        assert_eq!(closed.check_out_date, Some(at(45)));

        let skewed = db
            .hikes()
            .check_out(hike.id, at(30) - Duration::minutes(5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(skewed.check_out_date, Some(at(30)));

        assert!(db.hikes().check_out(777, at(0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_review_is_partial() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let hiker = test_support::hiker(&db, "h").await;
        let hike = hike_at(&db, trail.id, hiker.id, at(0)).await;

        db.hikes()
            .update_review(
                hike.id,
                UpdateReview {
                    review: Some("Steep".to_string()),
                    difficulty: Some(4),
                    enjoyability: Some(5),
                },
            )
            .await
            .unwrap();
        let updated = db
            .hikes()
            .update_review(
                hike.id,
                UpdateReview {
                    review: Some("Steep but worth it".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.review.as_deref(), Some("Steep but worth it"));
        assert_eq!(updated.difficulty, Some(4));
        assert_eq!(updated.enjoyability, Some(5));
    }

    #[tokio::test]
    async fn test_expert_reviews_rank_by_total_distance() {
        let db = test_support::database().await;
        let short = test_support::trail(&db, "Short", 2).await;
        let long = test_support::trail(&db, "Long", 20).await;
        let novice = test_support::hiker(&db, "novice").await;
        let veteran = test_support::hiker(&db, "veteran").await;
        let silent = test_support::hiker(&db, "silent").await;

        let novice_review = hike_at(&db, short.id, novice.id, at(0)).await;
        review(&db, novice_review.id, "Nice").await;

        let veteran_review = hike_at(&db, short.id, veteran.id, at(1)).await;
        review(&db, veteran_review.id, "Easy stroll").await;
        hike_at(&db, long.id, veteran.id, at(2)).await;
        hike_at(&db, long.id, veteran.id, at(3)).await;

        // Unreviewed hikes never show up
        hike_at(&db, short.id, silent.id, at(4)).await;

        let ranked = db.hikes().list_expert_reviews(short.id, 5).await.unwrap();
        let summary: Vec<(i64, i64)> = ranked
            .iter()
            .map(|r| (r.hike.hiker_id, r.total_hiker_distance))
            .collect();
        assert_eq!(summary, vec![(veteran.id, 42), (novice.id, 2)]);

        assert_eq!(
            db.hikes().total_distance_for_hiker(veteran.id).await.unwrap(),
            42
        );
        assert_eq!(db.hikes().total_distance_for_hiker(9999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_latest_per_hiker() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let other = test_support::trail(&db, "Elsewhere", 5).await;
        let a = test_support::hiker(&db, "a").await;
        let b = test_support::hiker(&db, "b").await;

        hike_at(&db, trail.id, a.id, at(0)).await;
        let a_latest = hike_at(&db, trail.id, a.id, at(20)).await;
        let b_latest = hike_at(&db, trail.id, b.id, at(10)).await;
        // A later hike elsewhere must not hide a's hike on this trail
        hike_at(&db, other.id, a.id, at(50)).await;

        let latest = db.hikes().list_latest_per_hiker(trail.id).await.unwrap();
        let ids: Vec<i64> = latest.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![a_latest.id, b_latest.id]);
    }

    #[tokio::test]
    async fn test_latest_per_hiker_breaks_timestamp_ties() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let a = test_support::hiker(&db, "a").await;

        hike_at(&db, trail.id, a.id, at(5)).await;
        let second = hike_at(&db, trail.id, a.id, at(5)).await;

        let latest = db.hikes().list_latest_per_hiker(trail.id).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, second.id);
    }

    #[tokio::test]
    async fn test_latest_for_hiker_on_trail() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let a = test_support::hiker(&db, "a").await;

        assert!(
            db.hikes()
                .get_latest_for_hiker_on_trail(a.id, trail.id)
                .await
                .unwrap()
                .is_none()
        );

        hike_at(&db, trail.id, a.id, at(40)).await;
        let newest = hike_at(&db, trail.id, a.id, at(50)).await;
        hike_at(&db, trail.id, a.id, at(10)).await;

        let found = db
            .hikes()
            .get_latest_for_hiker_on_trail(a.id, trail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newest.id);
    }

    #[tokio::test]
    async fn test_get_many_skips_missing_ids() {
        let db = test_support::database().await;
        let trail = test_support::trail(&db, "Ridge Loop", 5).await;
        let hiker = test_support::hiker(&db, "h").await;
        let a = hike_at(&db, trail.id, hiker.id, at(1)).await;
        let b = hike_at(&db, trail.id, hiker.id, at(2)).await;

        let found = db.hikes().get_many(&[a.id, b.id, 4242]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[&b.id].check_in_date, at(2));
        assert!(db.hikes().get_many(&[]).await.unwrap().is_empty());
    }
}
