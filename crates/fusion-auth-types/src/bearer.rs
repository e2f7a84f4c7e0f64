//! `Authorization: Bearer <token>` extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Header};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

/// Raw bearer token taken from the `Authorization` header.
///
/// Only the header shape is checked here; signature and expiry are checked by
/// [`crate::token::validate_access_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Why a bearer token could not be extracted. Both cases map to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerRejection {
    #[error("missing authorization header")]
    Missing,
    #[error("invalid authorization header")]
    Malformed,
}

impl IntoResponse for BearerRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl BearerToken {
    /// Parse the bearer token out of request headers.
    pub fn from_headers(headers: &http::HeaderMap) -> Result<Self, BearerRejection> {
        let mut values = headers.get_all(AUTHORIZATION).iter().peekable();
        if values.peek().is_none() {
            return Err(BearerRejection::Missing);
        }
        let auth = Authorization::<Bearer>::decode(&mut values)
            .map_err(|_| BearerRejection::Malformed)?;
        let token = auth.token().trim();
        if token.is_empty() {
            return Err(BearerRejection::Malformed);
        }
        Ok(Self(token.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = BearerRejection;

    // Header parsing is synchronous; return a 'static future so the impl
    // matches the `impl Future + Send` signature of axum-core 0.5.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = Self::from_headers(&parts.headers);
        async move { result }
    }
}
