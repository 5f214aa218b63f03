//! GraphQL DataLoaders for batching database queries
//!
//! Hikes, messages, friendships and buddies all point at hikers and trails;
//! buddies and equipment rows point back at hikes and equipment types.
//! Resolving those references one row at a time would issue a query per
//! object, so the resolvers go through these loaders instead and every
//! reference requested in the same tick is fetched with a single
//! `WHERE id IN (...)` query.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::Loader;

use crate::db::{Database, EquipmentTypeRecord, HikeRecord, HikerRecord, TrailRecord};

/// Batch loader for hikers by id
pub struct HikerLoader {
    db: Database,
}

impl HikerLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for HikerLoader {
    type Value = HikerRecord;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading hikers");
        self.db.hikers().get_many(keys).await.map_err(Arc::new)
    }
}

/// Batch loader for trails by id
pub struct TrailLoader {
    db: Database,
}

impl TrailLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for TrailLoader {
    type Value = TrailRecord;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading trails");
        self.db.trails().get_many(keys).await.map_err(Arc::new)
    }
}

/// Batch loader for hikes by id
pub struct HikeLoader {
    db: Database,
}

impl HikeLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for HikeLoader {
    type Value = HikeRecord;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading hikes");
        self.db.hikes().get_many(keys).await.map_err(Arc::new)
    }
}

/// Batch loader for equipment types by id
pub struct EquipmentTypeLoader {
    db: Database,
}

impl EquipmentTypeLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Loader<i64> for EquipmentTypeLoader {
    type Value = EquipmentTypeRecord;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        tracing::debug!(count = keys.len(), "Batch loading equipment types");
        self.db.equipment().get_types(keys).await.map_err(Arc::new)
    }
}
