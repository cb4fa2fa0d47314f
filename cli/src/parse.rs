//! Argument parsers for wire-named values.

use serde::de::DeserializeOwned;
use udhaar_types::Amount;
use udhaar_verification::Decision;

/// Parse a value by its wire name (`bank_transfer`, `fake_profile`, ...).
pub fn wire<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    let name = s.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(name))
        .map_err(|_| format!("`{s}` is not a recognised value"))
}

/// Parse a rupee amount, allowing `₹` and thousands separators.
pub fn amount(s: &str) -> Result<Amount, String> {
    let digits: String = s
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    digits
        .parse::<u64>()
        .map(Amount::new)
        .map_err(|_| format!("`{s}` is not a whole rupee amount"))
}

/// Parse a review decision: `approve`, or `reject:<reason>`.
pub fn decision(s: &str) -> Result<Decision, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("approve") {
        return Ok(Decision::Approve);
    }
    match s.split_once(':') {
        Some((verb, reason)) if verb.trim().eq_ignore_ascii_case("reject") => {
            Ok(Decision::reject(reason.trim()))
        }
        _ => Err(format!("`{s}` should be `approve` or `reject:<reason>`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udhaar_lifecycle::{LoanStatus, PaymentMethod};
    use udhaar_moderation::{CaseStatus, ReportType};

    #[test]
    fn wire_names() {
        assert_eq!(wire::<PaymentMethod>("bank-transfer"), Ok(PaymentMethod::BankTransfer));
        assert_eq!(wire::<LoanStatus>("IN_PROGRESS"), Ok(LoanStatus::InProgress));
        assert_eq!(wire::<ReportType>("fake_profile"), Ok(ReportType::FakeProfile));
        assert_eq!(wire::<CaseStatus>("pending"), Ok(CaseStatus::Open));
        assert!(wire::<PaymentMethod>("crypto").is_err());
    }

    #[test]
    fn amounts() {
        assert_eq!(amount("₹12,000"), Ok(Amount::new(12_000)));
        assert_eq!(amount("500"), Ok(Amount::new(500)));
        assert!(amount("12.5").is_err());
    }

    #[test]
    fn decisions() {
        assert_eq!(decision("Approve"), Ok(Decision::Approve));
        assert_eq!(
            decision("reject: blurry photo"),
            Ok(Decision::reject("blurry photo"))
        );
        assert!(decision("maybe").is_err());
    }
}
