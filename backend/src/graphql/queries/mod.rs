pub mod equipment;
pub mod hikes;
pub mod messages;
pub mod trails;

pub use equipment::EquipmentQueries;
pub use hikes::HikeQueries;
pub use messages::MessageQueries;
pub use trails::TrailQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::db::*;
    pub(crate) use crate::graphql::auth::hiker_for_request;
    pub(crate) use crate::graphql::error::{GqlResultExt, OrNotFound};
    pub(crate) use crate::graphql::types::*;
}
