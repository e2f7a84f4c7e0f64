//! JWT access and refresh tokens.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identity extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub expires_at: u64,
}

/// Identity and session extracted from a validated refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenInfo {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub expires_at: u64,
}

/// A freshly signed token and its expiration (seconds since UNIX epoch).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// Errors returned by token issuance and validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token type")]
    WrongTokenType,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload shared by access and refresh tokens.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `jti` | `jti` | session ID, refresh tokens only |
/// | `iat` | `iat` | issued at, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn sign(claims: &JwtClaims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)
}

/// Sign a short-lived access token carrying only the subject claim.
pub fn issue_access_token(
    user_id: Uuid,
    ttl: Duration,
    secret: &str,
) -> Result<IssuedToken, AuthError> {
    let iat = now_secs();
    let exp = iat + ttl.as_secs();
    let token = sign(
        &JwtClaims {
            sub: user_id.to_string(),
            jti: None,
            iat,
            exp,
        },
        secret,
    )?;
    Ok(IssuedToken {
        token,
        expires_at: exp,
    })
}

/// Sign a refresh token bound to `session_id` through the `jti` claim.
///
/// The caller persists the matching session row before handing the token out.
pub fn issue_refresh_token(
    user_id: Uuid,
    session_id: Uuid,
    ttl: Duration,
    secret: &str,
) -> Result<IssuedToken, AuthError> {
    let iat = now_secs();
    let exp = iat + ttl.as_secs();
    let token = sign(
        &JwtClaims {
            sub: user_id.to_string(),
            jti: Some(session_id.to_string()),
            iat,
            exp,
        },
        secret,
    )?;
    Ok(IssuedToken {
        token,
        expires_at: exp,
    })
}

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256 only, exp checked, required claims `exp` + `sub`.
/// Any other algorithm in the header is rejected.
pub fn decode_claims(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an access token, returning the subject.
///
/// Refresh tokens (those carrying `jti`) are rejected here.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_claims(token, secret)?;
    if claims.jti.is_some() {
        return Err(AuthError::WrongTokenType);
    }
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        expires_at: claims.exp,
    })
}

/// Validate a refresh token, returning subject and session id.
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<RefreshTokenInfo, AuthError> {
    let claims = decode_claims(token, secret)?;
    let session_id = claims
        .jti
        .as_deref()
        .ok_or(AuthError::WrongTokenType)?
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(RefreshTokenInfo {
        user_id,
        session_id,
        expires_at: claims.exp,
    })
}
