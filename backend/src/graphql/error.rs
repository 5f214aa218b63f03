//! Resolver errors and their GraphQL representation

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Errors a resolver can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Hiker {hiker_id} has no hike on trail {trail_id}")]
    NoHikeOnTrail { hiker_id: i64, trail_id: i64 },

    #[error("Not logged in")]
    Unauthenticated,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Value of the `code` error extension
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::NoHikeOnTrail { .. } => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "Resolver failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let code = self.code();
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Shorthand for resolver results
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Convert repository and resolver results into GraphQL results, attaching
/// the error code extension
pub trait GqlResultExt<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<ApiError>> GqlResultExt<T> for std::result::Result<T, E> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.into().extend())
    }
}

/// Turn a missing record into a NotFound error
pub trait OrNotFound<T> {
    fn or_not_found(self, entity: &'static str, id: i64) -> ApiResult<T>;
}

impl<T> OrNotFound<T> for anyhow::Result<Option<T>> {
    fn or_not_found(self, entity: &'static str, id: i64) -> ApiResult<T> {
        self?.ok_or(ApiError::not_found(entity, id))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_graphql::Value;

    use super::*;

    fn code_of(err: async_graphql::Error) -> Option<Value> {
        err.extensions.and_then(|ext| ext.get("code").cloned())
    }

    #[test]
    fn test_not_found_maps_to_code() {
        let err = ApiError::not_found("Hike", 42).extend();
        assert_eq!(err.message, "Hike 42 not found");
        assert_eq!(code_of(err), Some(Value::from("NOT_FOUND")));
    }

    #[test]
    fn test_no_hike_on_trail_is_not_found() {
        let err = ApiError::NoHikeOnTrail {
            hiker_id: 1,
            trail_id: 2,
        };
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_unauthenticated_message() {
        let err = ApiError::Unauthenticated.extend();
        assert_eq!(err.message, "Not logged in");
        assert_eq!(code_of(err), Some(Value::from("UNAUTHENTICATED")));
    }

    #[test]
    fn test_internal_message_is_generic() {
        let failed: anyhow::Result<()> = Err(anyhow::anyhow!("disk I/O error at page 7"));
        let err = failed.into_gql().unwrap_err();
        assert_eq!(err.message, "Internal server error");
        assert_eq!(code_of(err), Some(Value::from("INTERNAL_SERVER_ERROR")));
    }

    #[test]
    fn test_or_not_found() {
        let missing: anyhow::Result<Option<i64>> = Ok(None);
        assert_matches!(
            missing.or_not_found("Trail", 9),
            Err(ApiError::NotFound { entity: "Trail", id: 9 })
        );

        let present: anyhow::Result<Option<i64>> = Ok(Some(3));
        assert_matches!(present.or_not_found("Trail", 9), Ok(3));
    }
}
