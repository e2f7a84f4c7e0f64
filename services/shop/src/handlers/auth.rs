use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::USER_AGENT};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ShopError;
use crate::extract::JsonBody;
use crate::handlers::MessageResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    ChangePasswordInput, ChangePasswordUseCase, LoginInput, LoginUseCase, LogoutUseCase,
    RefreshUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput, ResetPasswordUseCase,
    VerifyEmailUseCase,
};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub redirect_url: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ShopError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
        verification_ttl_secs: state.verification_ttl_secs,
    };
    usecase
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            redirect_url: body.redirect_url,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("verification email sent")),
    ))
}

// ── POST /auth/verify-email ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ShopError> {
    let usecase = VerifyEmailUseCase {
        verifications: state.verification_repo(),
    };
    usecase.execute(&body.token).await?;
    Ok(Json(MessageResponse::new("email verified")))
}

// ── POST /auth/reset-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub redirect_url: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ShopError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        verifications: state.verification_repo(),
        mailer: state.mailer.clone(),
        verification_ttl_secs: state.verification_ttl_secs,
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            redirect_url: body.redirect_url,
        })
        .await?;
    Ok(Json(MessageResponse::new("password reset email sent")))
}

// ── POST /auth/change-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub token: String,
    pub password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ShopError> {
    let usecase = ChangePasswordUseCase {
        verifications: state.verification_repo(),
    };
    usecase
        .execute(ChangePasswordInput {
            token: body.token,
            password: body.password,
        })
        .await?;
    Ok(Json(MessageResponse::new("password changed")))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ShopError> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let usecase = LoginUseCase {
        users: state.user_repo(),
        sessions: state.session_repo(),
        tokens: state.tokens.clone(),
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
            user_agent,
        })
        .await?;
    Ok(Json(TokenPairResponse {
        access_token: output.access_token.token,
        refresh_token: output.refresh_token.token,
    }))
}

// ── POST /auth/refresh ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, ShopError> {
    let usecase = RefreshUseCase {
        sessions: state.session_repo(),
        tokens: state.tokens.clone(),
    };
    let issued = usecase.execute(&body.refresh_token).await?;
    Ok(Json(AccessTokenResponse {
        access_token: issued.token,
    }))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshTokenRequest>,
) -> Result<StatusCode, ShopError> {
    let usecase = LogoutUseCase {
        sessions: state.session_repo(),
        jwt_secret: state.tokens.jwt_secret.clone(),
    };
    usecase.execute(&body.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
