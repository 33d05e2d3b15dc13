//! Target counts and online ratio.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Percentage of online targets, 0..=100, rounded half up.
/// A zero total is a valid empty selection and yields 0.
pub fn online_percent(total: u64, online: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let online = online.min(total) as u128;
    let total = total as u128;
    // round(online * 100 / total), ties up, in integer math
    ((online * 200 + total) / (total * 2)) as u8
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TargetCounts {
    pub total: u64,
    pub online: u64,
}

impl TargetCounts {
    pub fn new(total: u64, online: u64) -> Self { Self { total, online } }

    pub fn offline(&self) -> u64 { self.total.saturating_sub(self.online) }

    pub fn online_percent(&self) -> u8 { online_percent(self.total, self.online) }

    pub fn online_share(&self) -> OnlineShare {
        let pct = self.online_percent();
        if pct == 0 && self.online > 0 {
            OnlineShare::BelowOne
        } else {
            OnlineShare::Exact(pct)
        }
    }
}

/// Online percentage for display; a handful of online hosts in a large fleet
/// shows as `<1` rather than `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineShare {
    Exact(u8),
    BelowOne,
}

impl fmt::Display for OnlineShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnlineShare::Exact(n) => write!(f, "{}", n),
            OnlineShare::BelowOne => f.write_str("<1"),
        }
    }
}
