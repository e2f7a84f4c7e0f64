use std::time::Duration;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use fusion_auth_types::token::{
    IssuedToken, issue_access_token, issue_refresh_token, validate_refresh_token,
};
use fusion_domain::verification::VerificationKind;

use crate::domain::repository::{Mailer, SessionRepository, UserRepository, VerificationRepository};
use crate::domain::types::{
    ConsumeOutcome, OutgoingMail, Session, User, Verification, VerificationEffect,
    normalize_email, parse_redirect_url, validate_email, validate_password, validate_username,
    verification_link,
};
use crate::error::ShopError;
use crate::password::{hash_password, verify_password};

/// JWT signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

fn email_verification_mail(to: &str, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_owned(),
        subject: "Verify your email".to_owned(),
        body: format!("Welcome to Fusion Shop!\n\nConfirm your email address:\n{link}\n"),
    }
}

fn password_reset_mail(to: &str, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_owned(),
        subject: "Reset your password".to_owned(),
        body: format!(
            "A password reset was requested for your account.\n\nChoose a new password:\n{link}\n\nIgnore this mail if it was not you.\n"
        ),
    }
}

/// Map a consume outcome onto the caller-facing result.
fn consumed(outcome: ConsumeOutcome) -> Result<Uuid, ShopError> {
    match outcome {
        ConsumeOutcome::Consumed { user_id } => Ok(user_id),
        ConsumeOutcome::NotFound => Err(ShopError::VerificationNotFound),
        ConsumeOutcome::Expired => Err(ShopError::VerificationExpired),
    }
}

fn timestamp(secs: u64) -> anyhow::Result<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .with_context(|| format!("timestamp out of range: {secs}"))
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub redirect_url: String,
}

pub struct RegisterUseCase<U: UserRepository, M: Mailer> {
    pub users: U,
    pub mailer: M,
    pub verification_ttl_secs: i64,
}

impl<U: UserRepository, M: Mailer> RegisterUseCase<U, M> {
    /// Create the account with a pending email verification and mail the link.
    ///
    /// An unverified account under the same email is taken over: its
    /// username and password are overwritten and a fresh token is issued.
    pub async fn execute(&self, input: RegisterInput) -> Result<Uuid, ShopError> {
        let username = input.username.trim().to_owned();
        let email = normalize_email(&input.email);
        if !validate_username(&username) {
            return Err(ShopError::InvalidField("username"));
        }
        if !validate_email(&email) {
            return Err(ShopError::InvalidField("email"));
        }
        if !validate_password(&input.password) {
            return Err(ShopError::InvalidField("password"));
        }
        let redirect_url = parse_redirect_url(&input.redirect_url)
            .ok_or(ShopError::InvalidField("redirect_url"))?;

        let existing = self.users.find_by_email(&email).await?;
        if existing.as_ref().is_some_and(|u| u.is_email_verified) {
            return Err(ShopError::UserAlreadyExists);
        }
        let holder = self.users.find_by_username(&username).await?;
        if let Some(holder) = holder {
            if existing.as_ref().is_none_or(|u| u.id != holder.id) {
                return Err(ShopError::UsernameTaken);
            }
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = match existing {
            Some(user) => {
                let verification = Verification::issue(
                    user.id,
                    VerificationKind::EmailVerify,
                    self.verification_ttl_secs,
                );
                self.users
                    .replace_unverified(user.id, &username, &password_hash, &verification)
                    .await?;
                self.send_link(&email, &redirect_url, &verification)
                    .await?;
                tracing::info!(user_id = %user.id, "unverified registration replaced");
                user.id
            }
            None => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::now_v7(),
                    email: email.clone(),
                    username,
                    password_hash,
                    is_email_verified: false,
                    avatar: None,
                    phone: None,
                    created_at: now,
                    updated_at: now,
                };
                let verification = Verification::issue(
                    user.id,
                    VerificationKind::EmailVerify,
                    self.verification_ttl_secs,
                );
                self.users
                    .create_with_verification(&user, &verification)
                    .await?;
                self.send_link(&email, &redirect_url, &verification)
                    .await?;
                tracing::info!(user_id = %user.id, "user registered");
                user.id
            }
        };
        Ok(user_id)
    }

    async fn send_link(
        &self,
        email: &str,
        redirect_url: &Url,
        verification: &Verification,
    ) -> Result<(), ShopError> {
        let link = verification_link(redirect_url, &verification.token);
        self.mailer
            .send(&email_verification_mail(email, &link))
            .await
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<V: VerificationRepository> {
    pub verifications: V,
}

impl<V: VerificationRepository> VerifyEmailUseCase<V> {
    pub async fn execute(&self, token: &str) -> Result<Uuid, ShopError> {
        let outcome = self
            .verifications
            .consume(
                token,
                VerificationKind::EmailVerify,
                &VerificationEffect::MarkEmailVerified,
            )
            .await?;
        let user_id = consumed(outcome)?;
        tracing::info!(%user_id, "email verified");
        Ok(user_id)
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub redirect_url: String,
}

pub struct ResetPasswordUseCase<U: UserRepository, V: VerificationRepository, M: Mailer> {
    pub users: U,
    pub verifications: V,
    pub mailer: M,
    pub verification_ttl_secs: i64,
}

impl<U: UserRepository, V: VerificationRepository, M: Mailer> ResetPasswordUseCase<U, V, M> {
    /// Issue a `password_reset` token for the account and mail the link.
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), ShopError> {
        let redirect_url = parse_redirect_url(&input.redirect_url)
            .ok_or(ShopError::InvalidField("redirect_url"))?;
        let email = normalize_email(&input.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ShopError::UserNotFound)?;

        let verification = Verification::issue(
            user.id,
            VerificationKind::PasswordReset,
            self.verification_ttl_secs,
        );
        self.verifications.create(&verification).await?;

        let link = verification_link(&redirect_url, &verification.token);
        self.mailer
            .send(&password_reset_mail(&user.email, &link))
            .await?;
        tracing::info!(user_id = %user.id, "password reset requested");
        Ok(())
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub token: String,
    pub password: String,
}

pub struct ChangePasswordUseCase<V: VerificationRepository> {
    pub verifications: V,
}

impl<V: VerificationRepository> ChangePasswordUseCase<V> {
    /// Redeem a `password_reset` token and store the new password hash.
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<Uuid, ShopError> {
        if !validate_password(&input.password) {
            return Err(ShopError::InvalidField("password"));
        }
        let password_hash = hash_password(&input.password)?;
        let outcome = self
            .verifications
            .consume(
                &input.token,
                VerificationKind::PasswordReset,
                &VerificationEffect::SetPasswordHash(password_hash),
            )
            .await?;
        let user_id = consumed(outcome)?;
        tracing::info!(%user_id, "password changed");
        Ok(user_id)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub user_agent: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

pub struct LoginUseCase<U: UserRepository, S: SessionRepository> {
    pub users: U,
    pub sessions: S,
    pub tokens: TokenSettings,
}

impl<U: UserRepository, S: SessionRepository> LoginUseCase<U, S> {
    /// Check credentials, persist a session and return the token pair.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ShopError> {
        let email = normalize_email(&input.email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ShopError::InvalidCredentials)?;
        if !verify_password(&input.password, &user.password_hash)? {
            return Err(ShopError::InvalidCredentials);
        }
        if !user.is_email_verified {
            return Err(ShopError::EmailNotVerified);
        }

        let session_id = Uuid::now_v7();
        let secret = &self.tokens.jwt_secret;
        let access_token = issue_access_token(user.id, self.tokens.access_ttl, secret)
            .context("issue access token")?;
        let refresh_token =
            issue_refresh_token(user.id, session_id, self.tokens.refresh_ttl, secret)
                .context("issue refresh token")?;

        self.sessions
            .create(&Session {
                id: session_id,
                user_id: user.id,
                token: refresh_token.token.clone(),
                user_agent: input.user_agent,
                is_active: true,
                issued_at: Utc::now(),
                expires_at: timestamp(refresh_token.expires_at)?,
            })
            .await?;

        tracing::info!(user_id = %user.id, %session_id, "session created");
        Ok(LoginOutput {
            user_id: user.id,
            access_token,
            refresh_token,
        })
    }
}

// ── Refresh ──────────────────────────────────────────────────────────────────

pub struct RefreshUseCase<S: SessionRepository> {
    pub sessions: S,
    pub tokens: TokenSettings,
}

impl<S: SessionRepository> RefreshUseCase<S> {
    /// Exchange a live refresh token for a new access token.
    /// The refresh token itself is not rotated.
    pub async fn execute(&self, refresh_token: &str) -> Result<IssuedToken, ShopError> {
        let info = validate_refresh_token(refresh_token, &self.tokens.jwt_secret)
            .map_err(|_| ShopError::InvalidRefreshToken)?;
        let session = self
            .sessions
            .find_by_id(info.session_id)
            .await?
            .ok_or(ShopError::InvalidRefreshToken)?;
        if !session.accepts(info.user_id, refresh_token, Utc::now()) {
            return Err(ShopError::InvalidRefreshToken);
        }

        let access_token =
            issue_access_token(info.user_id, self.tokens.access_ttl, &self.tokens.jwt_secret)
                .context("issue access token")?;
        tracing::debug!(user_id = %info.user_id, session_id = %info.session_id, "access token refreshed");
        Ok(access_token)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<S: SessionRepository> {
    pub sessions: S,
    pub jwt_secret: String,
}

impl<S: SessionRepository> LogoutUseCase<S> {
    /// Delete the session behind `refresh_token`. Already-deleted sessions are
    /// not an error.
    pub async fn execute(&self, refresh_token: &str) -> Result<(), ShopError> {
        let info = validate_refresh_token(refresh_token, &self.jwt_secret)
            .map_err(|_| ShopError::InvalidRefreshToken)?;
        let deleted = self.sessions.delete(info.session_id, info.user_id).await?;
        tracing::info!(user_id = %info.user_id, session_id = %info.session_id, deleted, "logout");
        Ok(())
    }
}
