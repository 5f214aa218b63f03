//! HTTP routes
//!
//! GraphQL at /graphql is the whole API; the remaining routes are probes for
//! the process supervisor.

pub mod graphql;
pub mod health;
