//! Equipment repository
//!
//! Covers the equipment type catalogue, per-trail suggestions and the
//! equipment actually carried on a hike.

use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqlitePool;

/// Equipment type record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentTypeRecord {
    pub id: i64,
    pub equ_type: String,
}

/// An equipment type suggested for a trail
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SuggestedEquipmentRecord {
    pub id: i64,
    pub trail_id: i64,
    pub equipment_type_id: i64,
}

/// An equipment type used on a hike
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentUsedRecord {
    pub id: i64,
    pub hike_id: i64,
    pub equipment_id: i64,
}

pub struct EquipmentRepository {
    pool: SqlitePool,
}

impl EquipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Equipment types
    // ========================================================================

    /// All equipment types, by id
    pub async fn list_types(&self) -> Result<Vec<EquipmentTypeRecord>> {
        let records = sqlx::query_as::<_, EquipmentTypeRecord>(
            "SELECT id, equ_type FROM equipment_types ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn get_type(&self, id: i64) -> Result<Option<EquipmentTypeRecord>> {
        let record = sqlx::query_as::<_, EquipmentTypeRecord>(
            "SELECT id, equ_type FROM equipment_types WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_types(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, EquipmentTypeRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT id, equ_type FROM equipment_types WHERE id IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, EquipmentTypeRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let records = query.fetch_all(&self.pool).await?;
        Ok(records.into_iter().map(|r| (r.id, r)).collect())
    }

    pub async fn create_type(&self, equ_type: &str) -> Result<EquipmentTypeRecord> {
        let record = sqlx::query_as::<_, EquipmentTypeRecord>(
            "INSERT INTO equipment_types (equ_type) VALUES (?1) RETURNING id, equ_type",
        )
        .bind(equ_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    // ========================================================================
    // Suggestions
    // ========================================================================

    /// Equipment suggested for a trail
    pub async fn list_suggested_for_trail(
        &self,
        trail_id: i64,
    ) -> Result<Vec<SuggestedEquipmentRecord>> {
        let records = sqlx::query_as::<_, SuggestedEquipmentRecord>(
            r#"
            SELECT id, trail_id, equipment_type_id
            FROM suggested_equipment
            WHERE trail_id = ?1
            ORDER BY id
            "#,
        )
        .bind(trail_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn create_suggested(
        &self,
        trail_id: i64,
        equipment_type_id: i64,
    ) -> Result<SuggestedEquipmentRecord> {
        let record = sqlx::query_as::<_, SuggestedEquipmentRecord>(
            r#"
            INSERT INTO suggested_equipment (trail_id, equipment_type_id)
            VALUES (?1, ?2)
            RETURNING id, trail_id, equipment_type_id
            "#,
        )
        .bind(trail_id)
        .bind(equipment_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    // ========================================================================
    // Usage
    // ========================================================================

    /// Equipment carried on a hike
    pub async fn list_used_on_hike(&self, hike_id: i64) -> Result<Vec<EquipmentUsedRecord>> {
        let records = sqlx::query_as::<_, EquipmentUsedRecord>(
            "SELECT id, hike_id, equipment_id FROM equipment_used WHERE hike_id = ?1 ORDER BY id",
        )
        .bind(hike_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn create_used(
        &self,
        hike_id: i64,
        equipment_id: i64,
    ) -> Result<EquipmentUsedRecord> {
        let record = sqlx::query_as::<_, EquipmentUsedRecord>(
            r#"
            INSERT INTO equipment_used (hike_id, equipment_id)
            VALUES (?1, ?2)
            RETURNING id, hike_id, equipment_id
            "#,
        )
        .bind(hike_id)
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
