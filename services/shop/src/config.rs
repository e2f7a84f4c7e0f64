use std::path::PathBuf;

use serde::Deserialize;

use fusion_core::config::Config;

/// Shop service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `SHOP_PORT`.
    #[serde(default = "default_port")]
    pub shop_port: u16,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,
    /// Lifetime of email-verify and password-reset tokens.
    #[serde(default = "default_verification_ttl")]
    pub verification_ttl_secs: u64,
    /// SMTP relay host. When unset, outgoing mail is written to the log.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_sender")]
    pub smtp_sender: String,
    /// Root directory for uploaded files, served under `/uploads`.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_avatar_bytes")]
    pub max_avatar_bytes: usize,
}

impl Config for ShopConfig {}

fn default_port() -> u16 {
    3000
}

fn default_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_verification_ttl() -> u64 {
    24 * 60 * 60
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender() -> String {
    "Fusion Shop <no-reply@localhost>".to_owned()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_avatar_bytes() -> usize {
    5 * 1024 * 1024
}
