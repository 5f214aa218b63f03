//! GraphQL schema assembly

use async_graphql::dataloader::DataLoader;
use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;

use super::loaders::{EquipmentTypeLoader, HikeLoader, HikerLoader, TrailLoader};
use super::mutations::{EquipmentMutations, HikeMutations, SocialMutations, TrailMutations};
use super::queries::{EquipmentQueries, HikeQueries, MessageQueries, TrailQueries};

/// The GraphQL schema type
pub type TrailheadSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(TrailQueries, HikeQueries, EquipmentQueries, MessageQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(TrailMutations, HikeMutations, EquipmentMutations, SocialMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(db: Database) -> TrailheadSchema {
    let hiker_loader = DataLoader::new(HikerLoader::new(db.clone()), tokio::spawn);
    let trail_loader = DataLoader::new(TrailLoader::new(db.clone()), tokio::spawn);
    let hike_loader = DataLoader::new(HikeLoader::new(db.clone()), tokio::spawn);
    let equipment_type_loader =
        DataLoader::new(EquipmentTypeLoader::new(db.clone()), tokio::spawn);

    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .extension(Tracing)
        .data(db)
        .data(hiker_loader)
        .data(trail_loader)
        .data(hike_loader)
        .data(equipment_type_loader)
        .finish()
}
