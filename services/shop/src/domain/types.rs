use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use regex::Regex;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use fusion_domain::order_status::OrderStatus;
use fusion_domain::verification::VerificationKind;

// ── Users ────────────────────────────────────────────────────────────────────

/// Stored account. `password_hash` never leaves the service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub phone: Option<String>,
}

/// One issued refresh token.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub user_agent: String,
    pub is_active: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session can back a refresh only while active, unexpired, owned by
    /// `user_id` and matching the presented token.
    pub fn accepts(&self, user_id: Uuid, token: &str, now: DateTime<Utc>) -> bool {
        self.is_active && self.user_id == user_id && self.expires_at > now && self.token == token
    }
}

// ── Verifications ────────────────────────────────────────────────────────────

pub const VERIFICATION_TOKEN_LEN: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..VERIFICATION_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub id: Uuid,
    pub kind: VerificationKind,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    /// Fresh random token of `kind` for `user_id`, valid for `ttl_secs`.
    pub fn issue(user_id: Uuid, kind: VerificationKind, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind,
            token: generate_token(),
            user_id,
            expires_at: now + Duration::seconds(ttl_secs),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// What consuming a verification does to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationEffect {
    MarkEmailVerified,
    SetPasswordHash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Consumed { user_id: Uuid },
    NotFound,
    Expired,
}

/// Message handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// `redirect_url` with the token appended as the `token` query parameter.
///
/// Existing query pairs and the fragment are kept; the token always lands in
/// the query so it reaches the server.
pub fn verification_link(redirect_url: &Url, token: &str) -> String {
    let mut link = redirect_url.clone();
    link.query_pairs_mut().append_pair("token", token);
    link.into()
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// Validated input for a new product. Categories are referenced by name.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub category_names: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial product update. `category_names: Some(_)` replaces all links.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub category_names: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

pub const PRODUCT_NAME_MAX_LEN: usize = 255;
pub const CATEGORY_NAME_MAX_LEN: usize = 255;
pub const REVIEW_COMMENT_MAX_LEN: usize = 2000;
pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;

// ── Cart / orders ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

pub const MAX_CART_QUANTITY: i32 = 10_000;

// ── Input rules ──────────────────────────────────────────────────────────────

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 32;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
const EMAIL_MAX_LEN: usize = 254;

static PHONE_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^0-9+]").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});
static E164: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// 3 to 32 characters: ASCII letters, digits, `_`, `-`, `.`.
pub fn validate_username(username: &str) -> bool {
    let len = username.chars().count();
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Structural check only: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> bool {
    let len = password.chars().count();
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
}

/// Parse the absolute http(s) URL the verification link is built on.
pub fn parse_redirect_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let http = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (http && has_host).then_some(url)
}

/// Normalize to E.164: strip separators, validate, force a leading `+`.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let stripped = PHONE_STRIP.replace_all(phone, "");
    if !E164.is_match(&stripped) {
        return None;
    }
    if stripped.starts_with('+') {
        Some(stripped.into_owned())
    } else {
        Some(format!("+{stripped}"))
    }
}
