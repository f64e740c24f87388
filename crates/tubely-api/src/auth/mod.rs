//! Bearer-token authentication

pub mod jwt;

pub use jwt::{issue_token, parse_bearer_token, validate_token, Claims, TOKEN_ISSUER};

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Upload routes do not use this extractor: they authenticate inside the upload service so
/// that a malformed video ID is reported before a missing token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parse_bearer_token(&parts.headers)?;
        let user_id = validate_token(token, state.config.jwt_secret())?;
        Ok(AuthUser { user_id })
    }
}
