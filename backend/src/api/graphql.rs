//! GraphQL HTTP endpoint
//!
//! POST executes an operation; a bearer token, when present and valid, makes
//! the caller available to resolvers as [`AuthUser`](crate::graphql::AuthUser).
//! GET serves GraphiQL to browsers.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::AppState;
use crate::graphql::verify_token;

pub fn router() -> Router<AppState> {
    Router::new().route("/graphql", get(graphiql).post(graphql_handler))
}

/// Extract bearer token from Authorization header
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    // An invalid token leaves the request anonymous rather than rejecting it
    match extract_token(&headers) {
        Some(token) => match verify_token(token, &state.config.jwt_secret) {
            Ok(user) => {
                tracing::debug!(user_id = user.user_id, "Authenticated GraphQL request");
                request = request.data(user);
            }
            Err(e) => tracing::debug!(error = %e, "Token verification failed"),
        },
        None => tracing::debug!("No auth token in request headers"),
    }

    state.schema.execute(request).await.into()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_token(&headers_with("Basic abc")), None);
        assert_eq!(extract_token(&headers_with("Bearer ")), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
