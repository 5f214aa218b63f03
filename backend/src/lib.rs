//! Trailhead: GraphQL backend for a hiking-trail social app.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod graphql;

pub use app::{AppState, build_app};
