use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Shop service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    // ── 400 ──
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
    #[error("invalid query string: {0}")]
    InvalidQuery(String),
    #[error("missing data")]
    MissingData,
    #[error("avatar exceeds size limit")]
    AvatarTooLarge,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("username already taken")]
    UsernameTaken,
    #[error("category already exists")]
    CategoryAlreadyExists,
    #[error("review already exists")]
    ReviewAlreadyExists,
    #[error("product already in cart")]
    ProductAlreadyInCart,

    // ── 401 ──
    #[error("missing authorization token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email not verified")]
    EmailNotVerified,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("verification expired")]
    VerificationExpired,

    // ── 403 ──
    #[error("forbidden")]
    Forbidden,
    #[error("insufficient permissions")]
    InsufficientPermissions,

    // ── 404 ──
    #[error("verification not found")]
    VerificationNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("product not found")]
    ProductNotFound,
    #[error("category not found")]
    CategoryNotFound,
    #[error("cart not found")]
    CartNotFound,
    #[error("order not found")]
    OrderNotFound,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ShopError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidField(_) => "INVALID_FIELD",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::MissingData => "MISSING_DATA",
            Self::AvatarTooLarge => "AVATAR_TOO_LARGE",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::CategoryAlreadyExists => "CATEGORY_ALREADY_EXISTS",
            Self::ReviewAlreadyExists => "REVIEW_ALREADY_EXISTS",
            Self::ProductAlreadyInCart => "PRODUCT_ALREADY_IN_CART",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::VerificationExpired => "VERIFICATION_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::VerificationNotFound => "VERIFICATION_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::CartNotFound => "CART_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidField(_)
            | Self::InvalidBody(_)
            | Self::InvalidPath(_)
            | Self::InvalidQuery(_)
            | Self::MissingData
            | Self::AvatarTooLarge
            | Self::UserAlreadyExists
            | Self::UsernameTaken
            | Self::CategoryAlreadyExists
            | Self::ReviewAlreadyExists
            | Self::ProductAlreadyInCart => StatusCode::BAD_REQUEST,
            Self::MissingToken
            | Self::InvalidToken
            | Self::InvalidCredentials
            | Self::EmailNotVerified
            | Self::InvalidRefreshToken
            | Self::VerificationExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::VerificationNotFound
            | Self::UserNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::CartNotFound
            | Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Only 500s are logged here; TraceLayer records every response status.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

// ── Extractor rejections ─────────────────────────────────────────────────────

impl From<JsonRejection> for ShopError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for ShopError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidPath(rejection.body_text())
    }
}

impl From<QueryRejection> for ShopError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

impl From<MultipartRejection> for ShopError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<MultipartError> for ShopError {
    fn from(err: MultipartError) -> Self {
        Self::InvalidBody(err.body_text())
    }
}
