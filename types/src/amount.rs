//! Monetary amounts.
//!
//! Amounts are whole rupees stored as `u64`; the platform never deals in
//! fractions of a rupee, so integer arithmetic avoids floating-point drift in
//! repayment accounting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of money in whole rupees.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(rupees: u64) -> Self {
        Self(rupees)
    }

    pub fn rupees(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Apply a rate expressed in basis points (1 bps = 0.01 %), rounding down.
    pub fn apply_bps(self, bps: u32) -> Self {
        Self((self.0 as u128 * bps as u128 / 10_000) as u64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_bps_matches_flat_interest() {
        assert_eq!(Amount::new(20_000).apply_bps(200), Amount::new(400));
        assert_eq!(Amount::new(35_000).apply_bps(250), Amount::new(875));
        assert_eq!(Amount::new(5_000).apply_bps(150), Amount::new(75));
    }

    #[test]
    fn apply_bps_rounds_down() {
        assert_eq!(Amount::new(999).apply_bps(150), Amount::new(14));
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Amount::new(15_000)).unwrap();
        assert_eq!(json, "15000");
    }

    #[test]
    fn additions_never_wrap() {
        let max = Amount::new(u64::MAX);
        assert_eq!(max.checked_add(Amount::new(1)), None);
        assert_eq!(max.saturating_add(Amount::new(1)), max);
    }

    #[test]
    fn checked_sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(Amount::new(2)), None);
        assert_eq!(Amount::new(1).saturating_sub(Amount::new(2)), Amount::ZERO);
    }
}
