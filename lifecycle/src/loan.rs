//! The loan record and its parts.

use serde::{Deserialize, Serialize};
use std::fmt;
use udhaar_types::{Amount, LoanId, Timestamp, UserId};

/// Status of a loan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Requested by a borrower, waiting for a lender.
    Pending,
    /// A lender committed; money not yet received.
    Accepted,
    /// Borrower confirmed receipt; repayments are due.
    InProgress,
    Completed,
    /// Past the due date with a balance outstanding.
    Overdue,
    /// Overdue past the grace period.
    Defaulted,
    /// Declined by a lender.
    Rejected,
    /// Withdrawn by the borrower.
    Cancelled,
    Disputed,
}

impl LoanStatus {
    /// No further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Rejected | Self::Cancelled | Self::Defaulted
        )
    }

    /// Money has changed hands and the loan still counts toward exposure.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Overdue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Defaulted => "defaulted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a repayment was made.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Upi,
    BankTransfer,
    Cash,
    Cheque,
    Other,
}

/// A single recorded repayment. Never modified once appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    pub amount: Amount,
    pub payment_date: Timestamp,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub confirmed_by_lender: bool,
    pub is_late: bool,
    /// Whole days past the due date, rounded up. Zero unless late.
    pub days_late: u32,
}

/// What the lender enters when recording a repayment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentInput {
    pub amount: Amount,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl RepaymentInput {
    pub fn new(amount: Amount, payment_method: PaymentMethod) -> Self {
        Self {
            amount,
            payment_method,
            transaction_reference: None,
            remarks: None,
        }
    }
}

/// One party's rating of the other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// 1 to 5.
    pub score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub rated_at: Timestamp,
}

/// A borrower's loan request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub amount: Amount,
    #[serde(rename = "duration")]
    pub duration_days: u32,
    pub purpose: String,
    #[serde(default)]
    pub description: String,
    /// Requested interest in basis points; the policy default when absent.
    #[serde(
        rename = "interestRate",
        default,
        with = "percent_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub interest_bps: Option<u32>,
}

impl LoanRequest {
    pub fn new(amount: Amount, duration_days: u32, purpose: impl Into<String>) -> Self {
        Self {
            amount,
            duration_days,
            purpose: purpose.into(),
            description: String::new(),
            interest_bps: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_interest_bps(mut self, bps: u32) -> Self {
        self.interest_bps = Some(bps);
        self
    }
}

/// A loan between a borrower and (once accepted) a lender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    #[serde(rename = "borrowerId")]
    pub borrower: UserId,
    #[serde(rename = "lenderId", default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<UserId>,
    pub amount: Amount,
    #[serde(rename = "duration")]
    pub duration_days: u32,
    /// Interest in basis points (200 = 2 %). Percent on the wire.
    #[serde(rename = "interestRate", with = "percent")]
    pub interest_bps: u32,
    pub purpose: String,
    #[serde(default)]
    pub description: String,
    pub status: LoanStatus,
    #[serde(alias = "totalAmount", default)]
    pub total_repayable: Amount,
    #[serde(alias = "repaidAmount", default)]
    pub amount_repaid: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    /// Status to restore when an open dispute is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disputed_from: Option<LoanStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repayments: Vec<Repayment>,
    /// The lender's rating of the borrower.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower_rating: Option<Rating>,
    /// The borrower's rating of the lender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender_rating: Option<Rating>,
}

impl Loan {
    /// Balance still owed.
    pub fn remaining(&self) -> Amount {
        self.total_repayable.saturating_sub(self.amount_repaid)
    }

    pub fn is_fully_repaid(&self) -> bool {
        !self.total_repayable.is_zero() && self.amount_repaid >= self.total_repayable
    }

    pub fn is_party(&self, user: &UserId) -> bool {
        &self.borrower == user || self.lender.as_ref() == Some(user)
    }
}

/// Basis points <-> percent (`250` <-> `2.5`).
mod percent {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bps: &u32, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(*bps as f64 / 100.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let pct = f64::deserialize(d)?;
        if !pct.is_finite() || pct < 0.0 {
            return Err(serde::de::Error::custom(format!(
                "interest rate must be a non-negative percentage, got {pct}"
            )));
        }
        Ok((pct * 100.0).round() as u32)
    }
}

mod percent_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bps: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match bps {
            Some(bps) => super::percent::serialize(bps, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let pct = Option::<f64>::deserialize(d)?;
        match pct {
            Some(pct) if !pct.is_finite() || pct < 0.0 => Err(serde::de::Error::custom(
                format!("interest rate must be a non-negative percentage, got {pct}"),
            )),
            Some(pct) => Ok(Some((pct * 100.0).round() as u32)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&LoanStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: LoanStatus = serde_json::from_str("\"disputed\"").unwrap();
        assert_eq!(status, LoanStatus::Disputed);
        assert!(LoanStatus::Defaulted.is_terminal());
        assert!(!LoanStatus::Overdue.is_terminal());
    }

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
    }

    #[test]
    fn loan_reads_fixture_shape() {
        let json = r#"{
            "id": "loan-active-003",
            "borrowerId": "borrower-003",
            "lenderId": "lender-001",
            "amount": 35000,
            "duration": 60,
            "interestRate": 2.5,
            "purpose": "Business",
            "status": "in_progress",
            "totalAmount": 36750,
            "repaidAmount": 15000,
            "createdAt": 1000
        }"#;
        let loan: Loan = serde_json::from_str(json).unwrap();
        assert_eq!(loan.interest_bps, 250);
        assert_eq!(loan.total_repayable, Amount::new(36_750));
        assert_eq!(loan.remaining(), Amount::new(21_750));
        assert!(loan.is_party(&UserId::new("lender-001")));

        let out = serde_json::to_value(&loan).unwrap();
        assert_eq!(out["interestRate"], 2.5);
        assert_eq!(out["totalRepayable"], 36_750);
    }

    #[test]
    fn negative_interest_is_rejected() {
        let json = r#"{"amount":1000,"duration":7,"purpose":"x","interestRate":-1}"#;
        assert!(serde_json::from_str::<LoanRequest>(json).is_err());
    }

    #[test]
    fn request_without_rate_uses_default() {
        let json = r#"{"amount":5000,"duration":30,"purpose":"Rent"}"#;
        let request: LoanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.interest_bps, None);
        assert_eq!(request.description, "");
    }
}
