//! HBAR amounts.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Tinybars per HBAR.
pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

/// An amount of HBAR, held in tinybars.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hbar(i64);

impl Hbar {
    /// Zero HBAR.
    pub const ZERO: Self = Self(0);

    /// Whole HBAR.
    pub const fn new(hbars: i64) -> Self {
        Self(hbars * TINYBARS_PER_HBAR)
    }

    /// Amount in tinybars.
    pub const fn from_tinybars(tinybars: i64) -> Self {
        Self(tinybars)
    }

    /// Amount in tinybars.
    pub const fn to_tinybars(self) -> i64 {
        self.0
    }

    /// `self * factor`, or `None` on overflow.
    pub fn checked_mul(self, factor: i64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / TINYBARS_PER_HBAR as u64;
        let frac = abs % TINYBARS_PER_HBAR as u64;

        if frac == 0 {
            write!(f, "{sign}{whole} ℏ")
        } else {
            let digits = format!("{frac:08}");
            write!(f, "{sign}{whole}.{} ℏ", digits.trim_end_matches('0'))
        }
    }
}
