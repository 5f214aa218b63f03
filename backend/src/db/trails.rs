//! Trail database repository

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use crate::db::sqlite_helpers::{bool_to_int, int_to_bool};

/// Columns selected for a trail, qualified with the `t` alias
const TRAIL_COLUMNS: &str = "t.id, t.name, t.prop, t.city, t.state, t.description, t.is_open, \
                             t.altitude_change, t.distance, t.fee, t.image";

/// Trail record from database
#[derive(Debug, Clone)]
pub struct TrailRecord {
    pub id: i64,
    pub name: String,
    /// Property (park, forest, owner) the trail belongs to
    pub prop: String,
    pub city: String,
    pub state: String,
    pub description: String,
    pub is_open: bool,
    pub altitude_change: i64,
    pub distance: i64,
    pub fee: f64,
    /// Path of the trail photo, relative to the media directory
    pub image: Option<String>,
}

impl sqlx::FromRow<'_, SqliteRow> for TrailRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let is_open: i32 = row.try_get("is_open")?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            prop: row.try_get("prop")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            description: row.try_get("description")?,
            is_open: int_to_bool(is_open),
            altitude_change: row.try_get("altitude_change")?,
            distance: row.try_get("distance")?,
            fee: row.try_get("fee")?,
            image: row.try_get("image")?,
        })
    }
}

/// A trail together with aggregates over its hikes
#[derive(Debug, Clone)]
pub struct TrailStatsRecord {
    pub trail: TrailRecord,
    pub num_hikes: i64,
    /// Mean difficulty over rated hikes; None when no hike has been rated
    pub avg_difficulty: Option<f64>,
    pub avg_enjoyability: Option<f64>,
}

impl sqlx::FromRow<'_, SqliteRow> for TrailStatsRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        Ok(Self {
            trail: <TrailRecord as sqlx::FromRow<'_, SqliteRow>>::from_row(row)?,
            num_hikes: row.try_get("num_hikes")?,
            avg_difficulty: row.try_get("avg_difficulty")?,
            avg_enjoyability: row.try_get("avg_enjoyability")?,
        })
    }
}

/// Input for creating a trail
#[derive(Debug)]
pub struct CreateTrail {
    pub name: String,
    pub prop: String,
    pub city: String,
    pub state: String,
    pub description: String,
    pub is_open: bool,
    pub altitude_change: i64,
    pub distance: i64,
    pub fee: f64,
    pub image: Option<String>,
}

pub struct TrailRepository {
    pool: SqlitePool,
}

impl TrailRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List trails, optionally filtered by a case-insensitive substring of
    /// name, property, city or state. An empty search term matches everything.
    pub async fn search(&self, term: Option<&str>) -> Result<Vec<TrailRecord>> {
        let term = term.filter(|t| !t.is_empty());

        let records = match term {
            Some(term) => {
                sqlx::query_as::<_, TrailRecord>(&format!(
                    r#"
                    SELECT {TRAIL_COLUMNS}
                    FROM trails t
                    WHERE instr(lower(t.name), lower(?1)) > 0
                       OR instr(lower(t.prop), lower(?1)) > 0
                       OR instr(lower(t.city), lower(?1)) > 0
                       OR instr(lower(t.state), lower(?1)) > 0
                    ORDER BY t.id
                    "#
                ))
                .bind(term)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TrailRecord>(&format!(
                    "SELECT {TRAIL_COLUMNS} FROM trails t ORDER BY t.id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records)
    }

    /// Get a trail by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<TrailRecord>> {
        let record = sqlx::query_as::<_, TrailRecord>(&format!(
            "SELECT {TRAIL_COLUMNS} FROM trails t WHERE t.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Load many trails at once, keyed by ID
    pub async fn get_many(&self, ids: &[i64]) -> Result<HashMap<i64, TrailRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT {TRAIL_COLUMNS} FROM trails t WHERE t.id IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, TrailRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Trails ranked by ascending average hike difficulty. Trails nobody has
    /// rated yet sort after every rated trail.
    pub async fn list_easiest(&self, limit: i64) -> Result<Vec<TrailStatsRecord>> {
        let records = sqlx::query_as::<_, TrailStatsRecord>(&format!(
            r#"
            SELECT {TRAIL_COLUMNS},
                   COUNT(h.id) AS num_hikes,
                   AVG(h.difficulty) AS avg_difficulty,
                   AVG(h.enjoyability) AS avg_enjoyability
            FROM trails t
            LEFT JOIN hikes h ON h.trail_id = t.id
            GROUP BY t.id
            ORDER BY AVG(h.difficulty) IS NULL, AVG(h.difficulty) ASC, t.id
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Trails ranked by descending number of hikes
    pub async fn list_most_hiked(&self, limit: i64) -> Result<Vec<TrailStatsRecord>> {
        let records = sqlx::query_as::<_, TrailStatsRecord>(&format!(
            r#"
            SELECT {TRAIL_COLUMNS},
                   COUNT(h.id) AS num_hikes,
                   AVG(h.difficulty) AS avg_difficulty,
                   AVG(h.enjoyability) AS avg_enjoyability
            FROM trails t
            LEFT JOIN hikes h ON h.trail_id = t.id
            GROUP BY t.id
            ORDER BY COUNT(h.id) DESC, t.id
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// A single trail with its hike aggregates
    pub async fn get_stats(&self, id: i64) -> Result<Option<TrailStatsRecord>> {
        let record = sqlx::query_as::<_, TrailStatsRecord>(&format!(
            r#"
            SELECT {TRAIL_COLUMNS},
                   COUNT(h.id) AS num_hikes,
                   AVG(h.difficulty) AS avg_difficulty,
                   AVG(h.enjoyability) AS avg_enjoyability
            FROM trails t
            LEFT JOIN hikes h ON h.trail_id = t.id
            WHERE t.id = ?1
            GROUP BY t.id
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Create a new trail
    pub async fn create(&self, input: CreateTrail) -> Result<TrailRecord> {
        let record = sqlx::query_as::<_, TrailRecord>(
            r#"
            INSERT INTO trails (
                name, prop, city, state, description, is_open,
                altitude_change, distance, fee, image
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING id, name, prop, city, state, description, is_open,
                      altitude_change, distance, fee, image
            "#,
        )
        .bind(&input.name)
        .bind(&input.prop)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.description)
        .bind(bool_to_int(input.is_open))
        .bind(input.altitude_change)
        .bind(input.distance)
        .bind(input.fee)
        .bind(&input.image)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::db::test_support;
    use crate::db::{CreateHike, Database};
    use crate::db::sqlite_helpers::now_utc;

    async fn rated_hike(db: &Database, trail_id: i64, hiker_id: i64, difficulty: i64) {
        let hike = db
            .hikes()
            .create(CreateHike {
                trail_id,
                hiker_id,
                check_in_date: now_utc(),
            })
            .await
            .unwrap();
        db.hikes()
            .update_review(
                hike.id,
                crate::db::UpdateReview {
                    review: None,
                    difficulty: Some(difficulty),
                    enjoyability: Some(4),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_matches_any_column_case_insensitively() {
        let db = test_support::database().await;
        let ridge = test_support::trail(&db, "Ridge Loop", 5).await;
        let template = test_support::trail(&db, "Lake Path", 3).await;
        let lake = db
            .trails()
            .create(crate::db::CreateTrail {
                name: template.name.clone(),
                prop: "Rocky Mountain NP".to_string(),
                city: "Estes Park".to_string(),
                state: "CO".to_string(),
                description: template.description.clone(),
                is_open: false,
                altitude_change: 100,
                distance: 3,
                fee: 25.0,
                image: Some("trails/lake.jpg".to_string()),
            })
            .await
            .unwrap();

        let by_name: Vec<i64> = db
            .trails()
            .search(Some("RIDGE"))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(by_name, vec![ridge.id]);

        let by_city = db.trails().search(Some("estes")).await.unwrap();
        assert_eq!(by_city.len(), 1);
        assert_eq!(by_city[0].id, lake.id);
        assert!(!by_city[0].is_open);
        assert_eq!(by_city[0].image.as_deref(), Some("trails/lake.jpg"));

        assert_eq!(db.trails().search(Some("co")).await.unwrap().len(), 3);
        assert_eq!(db.trails().search(Some("")).await.unwrap().len(), 3);
        assert!(db.trails().search(Some("   ")).await.unwrap().is_empty());
        assert_eq!(db.trails().search(None).await.unwrap().len(), 3);
        assert!(db.trails().search(Some("zzz")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = test_support::database().await;
        test_support::trail(&db, "Ridge Loop", 5).await;
        assert!(db.trails().search(Some("%")).await.unwrap().is_empty());
        assert!(db.trails().search(Some("_")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_easiest_orders_by_average_difficulty_with_unrated_last() {
        let db = test_support::database().await;
        let hiker = test_support::hiker(&db, "h").await;
        let hard = test_support::trail(&db, "Hard", 10).await;
        let easy = test_support::trail(&db, "Easy", 2).await;
        let unrated = test_support::trail(&db, "Unrated", 4).await;
        let medium = test_support::trail(&db, "Medium", 6).await;

        rated_hike(&db, hard.id, hiker.id, 5).await;
        rated_hike(&db, hard.id, hiker.id, 4).await;
        rated_hike(&db, easy.id, hiker.id, 1).await;
        rated_hike(&db, medium.id, hiker.id, 3).await;

        let ranked = db.trails().list_easiest(15).await.unwrap();
        let ids: Vec<i64> = ranked.iter().map(|s| s.trail.id).collect();
        assert_eq!(ids, vec![easy.id, medium.id, hard.id, unrated.id]);
        assert_eq!(ranked[2].avg_difficulty, Some(4.5));
        assert_eq!(ranked[2].num_hikes, 2);
        assert_eq!(ranked[3].avg_difficulty, None);

        assert_eq!(db.trails().list_easiest(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_most_hiked_orders_by_count() {
        let db = test_support::database().await;
        let hiker = test_support::hiker(&db, "h").await;
        let quiet = test_support::trail(&db, "Quiet", 1).await;
        let busy = test_support::trail(&db, "Busy", 1).await;
        let middling = test_support::trail(&db, "Middling", 1).await;

        for _ in 0..3 {
            rated_hike(&db, busy.id, hiker.id, 2).await;
        }
        rated_hike(&db, middling.id, hiker.id, 2).await;

        let ranked = db.trails().list_most_hiked(15).await.unwrap();
        let counts: Vec<(i64, i64)> = ranked.iter().map(|s| (s.trail.id, s.num_hikes)).collect();
        assert_eq!(counts, vec![(busy.id, 3), (middling.id, 1), (quiet.id, 0)]);
    }

    #[tokio::test]
    async fn test_stats_for_missing_trail() {
        let db = test_support::database().await;
        assert!(db.trails().get_stats(12).await.unwrap().is_none());

        let trail = test_support::trail(&db, "Fresh", 1).await;
        let stats = db.trails().get_stats(trail.id).await.unwrap().unwrap();
        assert_eq!(stats.num_hikes, 0);
        assert_eq!(stats.avg_enjoyability, None);
    }
}
