//! Order lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Wire format: `i16` in the database (0 = Staging ... 5 = Accepted),
/// snake_case string in JSON.
///
/// `Staging` is the initial state: the user's single in-progress order that
/// accumulates items moved out of the cart. Later states follow the order
/// of the discriminants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Staging = 0,
    Created = 1,
    Billed = 2,
    Sent = 3,
    Delivered = 4,
    Accepted = 5,
}

/// Returned when a wire value does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        Self::Staging,
        Self::Created,
        Self::Billed,
        Self::Sent,
        Self::Delivered,
        Self::Accepted,
    ];

    /// Convert from the stored `i16` value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Staging),
            1 => Some(Self::Created),
            2 => Some(Self::Billed),
            3 => Some(Self::Sent),
            4 => Some(Self::Delivered),
            5 => Some(Self::Accepted),
            _ => None,
        }
    }

    /// Convert to the stored `i16` value.
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Created => "created",
            Self::Billed => "billed",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Accepted => "accepted",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownOrderStatus(s.to_owned()))
    }
}

impl PartialOrd for OrderStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_i16().cmp(&other.as_i16())
    }
}
