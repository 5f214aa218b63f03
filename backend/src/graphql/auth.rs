//! GraphQL authentication
//!
//! The HTTP layer verifies the bearer token and places an [`AuthUser`] in the
//! request data. Resolvers read it through [`AuthExt`]. Anonymous requests are
//! allowed; only operations that need "the current hiker" fail without one.

use async_graphql::Context;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::db::{Database, HikerRecord};
use crate::graphql::error::{ApiError, ApiResult, OrNotFound};

/// User context extracted from JWT, available in GraphQL resolvers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Verify an HS256 JWT and extract the user it was issued to
pub fn verify_token(token: &str, secret: &str) -> anyhow::Result<AuthUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let user_id = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| anyhow::anyhow!("Token subject is not a user id"))?;

    tracing::debug!(user_id, username = %token_data.claims.username, "JWT verified");

    Ok(AuthUser {
        user_id,
        username: token_data.claims.username,
    })
}

/// Extension trait to get authenticated user from GraphQL context
pub trait AuthExt {
    /// Get the authenticated user, or fail with Unauthenticated
    fn auth_user(&self) -> ApiResult<&AuthUser>;
}

impl<'a> AuthExt for Context<'a> {
    fn auth_user(&self) -> ApiResult<&AuthUser> {
        self.data_opt::<AuthUser>().ok_or(ApiError::Unauthenticated)
    }
}

/// Resolve the hiker an operation acts for: the explicitly named one, or else
/// the hiker linked to the logged-in user.
pub async fn hiker_for_request(
    ctx: &Context<'_>,
    explicit_id: Option<i64>,
) -> ApiResult<HikerRecord> {
    let db = ctx.data_unchecked::<Database>();

    match explicit_id {
        Some(id) => db.hikers().get_by_id(id).await.or_not_found("Hiker", id),
        None => {
            let user = ctx.auth_user()?;
            db.hikers()
                .get_by_user_id(user.user_id)
                .await?
                .ok_or(ApiError::NotFound {
                    entity: "Hiker for user",
                    id: user.user_id,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(sub: &str, secret: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            username: "ridgewalker".to_string(),
            exp: now + exp_offset,
            iat: now,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let user = verify_token(&token("7", "s3cret", 3600), "s3cret").unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.username, "ridgewalker");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(verify_token(&token("7", "s3cret", 3600), "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        assert!(verify_token(&token("7", "s3cret", -3600), "s3cret").is_err());
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        assert!(verify_token(&token("abc", "s3cret", 3600), "s3cret").is_err());
    }
}
