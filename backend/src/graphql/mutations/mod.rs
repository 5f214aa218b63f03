pub mod equipment;
pub mod hikes;
pub mod social;
pub mod trails;

pub use equipment::EquipmentMutations;
pub use hikes::HikeMutations;
pub use social::SocialMutations;
pub use trails::TrailMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::db::sqlite_helpers::now_utc;
    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::auth::hiker_for_request;
    pub(crate) use crate::graphql::error::{ApiError, GqlResultExt, OrNotFound};
    pub(crate) use crate::graphql::types::*;
}
