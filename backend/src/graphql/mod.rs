//! GraphQL API
//!
//! Queries and mutations live in per-domain `#[derive(Default)]` structs under
//! `queries/` and `mutations/`, merged into the roots in `schema.rs`.
//! Hiker and trail references go through the DataLoaders in `loaders.rs`.

pub mod auth;
pub mod error;
pub mod loaders;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use auth::{AuthUser, verify_token};
pub use error::ApiError;
pub use schema::{MutationRoot, QueryRoot, TrailheadSchema, build_schema};
