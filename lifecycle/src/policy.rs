//! Loan bounds and the interest policy.

use serde::{Deserialize, Serialize};
use udhaar_types::Amount;

/// Bounds every loan request must satisfy, plus the overdue grace period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPolicy {
    #[serde(default = "default_min_amount")]
    pub min_amount: Amount,
    #[serde(default = "default_max_amount")]
    pub max_amount: Amount,
    #[serde(default = "default_min_duration_days")]
    pub min_duration_days: u32,
    #[serde(default = "default_max_duration_days")]
    pub max_duration_days: u32,
    /// Applied when a request does not name a rate (basis points).
    #[serde(default = "default_interest_bps")]
    pub default_interest_bps: u32,
    #[serde(default = "default_max_interest_bps")]
    pub max_interest_bps: u32,
    /// Days past the due date before an overdue loan defaults.
    #[serde(default = "default_overdue_grace_days")]
    pub overdue_grace_days: u32,
    #[serde(default)]
    pub interest_accrual: Accrual,
}

fn default_min_amount() -> Amount {
    Amount::new(1_000)
}

fn default_max_amount() -> Amount {
    Amount::new(100_000)
}

fn default_min_duration_days() -> u32 {
    7
}

fn default_max_duration_days() -> u32 {
    90
}

fn default_interest_bps() -> u32 {
    200
}

fn default_max_interest_bps() -> u32 {
    500
}

fn default_overdue_grace_days() -> u32 {
    5
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
            min_duration_days: default_min_duration_days(),
            max_duration_days: default_max_duration_days(),
            default_interest_bps: default_interest_bps(),
            max_interest_bps: default_max_interest_bps(),
            overdue_grace_days: default_overdue_grace_days(),
            interest_accrual: Accrual::default(),
        }
    }
}

/// Computes what the borrower owes in total.
pub trait InterestPolicy: Send + Sync {
    fn total_repayable(&self, principal: Amount, interest_bps: u32, duration_days: u32) -> Amount;
}

/// Flat simple interest: principal plus `principal × bps / 10 000`, independent
/// of duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatInterest;

impl InterestPolicy for FlatInterest {
    fn total_repayable(&self, principal: Amount, interest_bps: u32, _duration_days: u32) -> Amount {
        principal.saturating_add(principal.apply_bps(interest_bps))
    }
}

/// The rate applies once per started 30-day month.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonthlyInterest;

const DAYS_PER_MONTH: u32 = 30;

impl InterestPolicy for MonthlyInterest {
    fn total_repayable(&self, principal: Amount, interest_bps: u32, duration_days: u32) -> Amount {
        let months = duration_days.div_ceil(DAYS_PER_MONTH).max(1);
        principal.saturating_add(principal.apply_bps(interest_bps.saturating_mul(months)))
    }
}

/// Which interest policy a [`LoanPolicy`] charges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accrual {
    #[default]
    Flat,
    Monthly,
}

impl Accrual {
    pub fn interest_policy(self) -> Box<dyn InterestPolicy> {
        match self {
            Self::Flat => Box::new(FlatInterest),
            Self::Monthly => Box::new(MonthlyInterest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_interest_ignores_duration() {
        let flat = FlatInterest;
        assert_eq!(flat.total_repayable(Amount::new(20_000), 200, 30), Amount::new(20_400));
        assert_eq!(flat.total_repayable(Amount::new(35_000), 250, 60), Amount::new(35_875));
        assert_eq!(flat.total_repayable(Amount::new(8_000), 200, 15), Amount::new(8_160));
    }

    #[test]
    fn monthly_interest_counts_started_months() {
        let monthly = MonthlyInterest;
        assert_eq!(monthly.total_repayable(Amount::new(20_000), 200, 30), Amount::new(20_400));
        assert_eq!(monthly.total_repayable(Amount::new(35_000), 250, 60), Amount::new(36_750));
        assert_eq!(monthly.total_repayable(Amount::new(8_000), 200, 15), Amount::new(8_160));
        assert_eq!(monthly.total_repayable(Amount::new(10_000), 200, 45), Amount::new(10_400));
    }

    #[test]
    fn accrual_reads_from_toml() {
        let policy: LoanPolicy = toml::from_str("interest_accrual = \"monthly\"").unwrap();
        assert_eq!(policy.interest_accrual, Accrual::Monthly);
        assert_eq!(LoanPolicy::default().interest_accrual, Accrual::Flat);
    }

    #[test]
    fn partial_policy_fills_defaults() {
        let policy: LoanPolicy = serde_json::from_str(r#"{"max_amount": 50000}"#).unwrap();
        assert_eq!(policy.max_amount, Amount::new(50_000));
        assert_eq!(policy.min_amount, Amount::new(1_000));
        assert_eq!(policy.overdue_grace_days, 5);
    }
}
