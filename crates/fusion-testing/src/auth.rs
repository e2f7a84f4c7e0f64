//! Bearer-token helpers for router tests.
//!
//! `TestAuth` signs real access tokens with the test secret so requests pass
//! through the same validation path as production traffic.

use std::time::Duration;

use fusion_auth_types::token::{issue_access_token, issue_refresh_token};
use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "fusion-test-secret";

/// Identity whose tokens are signed with [`TEST_JWT_SECRET`].
pub struct TestAuth {
    pub user_id: Uuid,
    pub secret: String,
}

impl TestAuth {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    /// A valid access token for this user.
    pub fn access_token(&self) -> String {
        issue_access_token(self.user_id, Duration::from_secs(900), &self.secret)
            .expect("sign access token")
            .token
    }

    /// A valid refresh token bound to `session_id`.
    pub fn refresh_token(&self, session_id: Uuid) -> String {
        issue_refresh_token(self.user_id, session_id, Duration::from_secs(3600), &self.secret)
            .expect("sign refresh token")
            .token
    }

    /// `Authorization: Bearer <access token>` header value.
    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.access_token()))
            .expect("valid header value")
    }

    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.bearer());
        map
    }
}
