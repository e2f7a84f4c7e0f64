//! Bearer-token access guard.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use fusion_auth_types::bearer::{BearerRejection, BearerToken};
use fusion_auth_types::token::validate_access_token;
use fusion_domain::permission::{Permission, PermissionSet};

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ShopError;
use crate::state::AppState;

/// The authenticated caller, resolved from the access token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// Succeed when the caller holds at least one of `required`.
    pub fn require_any(&self, required: &[Permission]) -> Result<(), ShopError> {
        if self.permissions.has_any(required) {
            Ok(())
        } else {
            Err(ShopError::InsufficientPermissions)
        }
    }
}

/// Validate `token` and load its subject with permissions.
///
/// Every token failure, including a subject that no longer exists, is
/// reported as `InvalidToken`.
pub async fn authenticate<U: UserRepository>(
    users: &U,
    token: &str,
    secret: &str,
) -> Result<CurrentUser, ShopError> {
    let info = validate_access_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        ShopError::InvalidToken
    })?;
    let user = users
        .find_by_id(info.user_id)
        .await?
        .ok_or(ShopError::InvalidToken)?;
    let permissions = users.permissions(user.id).await?;
    Ok(CurrentUser { user, permissions })
}

impl From<BearerRejection> for ShopError {
    fn from(rejection: BearerRejection) -> Self {
        match rejection {
            BearerRejection::Missing => Self::MissingToken,
            BearerRejection::Malformed => Self::InvalidToken,
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ShopError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = BearerToken::from_headers(&parts.headers);
        let users = state.user_repo();
        let secret = state.tokens.jwt_secret.clone();
        async move {
            let bearer = bearer?;
            authenticate(&users, bearer.as_str(), &secret).await
        }
    }
}
