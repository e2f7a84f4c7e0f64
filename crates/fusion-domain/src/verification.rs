//! Verification token kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a single-use verification token authorizes.
///
/// Wire format: the `type` column stores [`VerificationKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    EmailVerify,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown verification kind: {0}")]
pub struct UnknownVerificationKind(pub String);

impl VerificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerify => "email_verify",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationKind {
    type Err = UnknownVerificationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verify" => Ok(Self::EmailVerify),
            "password_reset" => Ok(Self::PasswordReset),
            other => Err(UnknownVerificationKind(other.to_owned())),
        }
    }
}
