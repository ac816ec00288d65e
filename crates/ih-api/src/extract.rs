//! Request extractors: caller identity, resolved from an optional
//! `Authorization: Bearer` header, and JSON/query parsing whose failures use
//! the API's own `{"error": ...}` 400 responses.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use ih_core::error::AppError;
use ih_core::models::UserId;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated user, if the request carried a valid token.
///
/// A missing header is fine (`CurrentUser(None)`); a present but invalid
/// one rejects the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub Option<UserId>);

impl CurrentUser {
    /// Picks the user id for a write: the one named in the request, or the
    /// authenticated one when the request names none.
    pub fn resolve(&self, claimed: Option<String>, field: &str) -> Result<UserId, AppError> {
        let claimed = claimed
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        match (claimed, &self.0) {
            (Some(claimed), Some(current)) if &claimed != current => Err(AppError::Unauthorized(
                format!("{field} does not match the authenticated user"),
            )),
            (Some(claimed), _) => Ok(claimed),
            (None, Some(current)) => Ok(current.clone()),
            (None, None) => Err(AppError::validation(format!("missing required field: {field}"))),
        }
    }

    /// An explicitly named user must agree with the token, if there is one.
    pub fn ensure_matches(&self, claimed: &str) -> Result<(), AppError> {
        match &self.0 {
            Some(current) if current != claimed.trim() => Err(AppError::Unauthorized(
                "userId does not match the authenticated user".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".into()))?;

        state
            .auth
            .authenticate(token)
            .map(|user| CurrentUser(Some(user)))
            .ok_or_else(|| AppError::Unauthorized("invalid token".into()).into())
    }
}

/// `axum::Json`, rejecting unparsable bodies as validation errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `axum::extract::Query`, rejecting malformed query strings as validation
/// errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}
