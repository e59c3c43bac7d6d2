//! JWT authentication middleware and the `Auth` extractor.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// The identity resolved by the auth gate for one request.
///
/// The portfolio engine trusts this id; all data access is scoped to it and
/// no cross-user surface exists.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Authentication middleware: validates the bearer token and stores the
/// resolved user in request extensions. Requests without a valid token never
/// reach a protected handler.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(auth_header) = auth_header else {
        return ApiError::Unauthorized("Missing Authorization header".into()).into_response();
    };

    let Some(token) = extract_bearer_token(auth_header) else {
        return ApiError::Unauthorized("Invalid Authorization header format".into())
            .into_response();
    };

    match state.jwt.validate(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthenticatedUser { user_id });
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Extractor for the authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct Auth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .map(Auth)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()).into_response())
    }
}
