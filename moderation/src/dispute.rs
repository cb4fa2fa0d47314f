//! Disputes raised by a party to a loan.

use crate::case::{CaseState, Resolution};
use crate::error::CaseError;
use serde::{Deserialize, Serialize};
use udhaar_lifecycle::Loan;
use udhaar_types::{Actor, DisputeId, LoanId, Timestamp, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    Repayment,
    Terms,
    LoanTerms,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDispute {
    pub loan_id: LoanId,
    pub dispute_type: DisputeType,
    pub description: String,
}

/// A comment added by either party while the dispute is open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeNote {
    pub author: UserId,
    pub note: String,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: DisputeId,
    pub loan_id: LoanId,
    pub dispute_type: DisputeType,
    pub description: String,
    pub raised_by: UserId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<DisputeNote>,
    #[serde(flatten)]
    pub case: CaseState,
    pub created_at: Timestamp,
}

impl Dispute {
    /// Raise a dispute on `loan`. Only the loan's borrower or lender may.
    pub fn raise(
        id: DisputeId,
        actor: &Actor,
        loan: &Loan,
        new: NewDispute,
        now: Timestamp,
    ) -> Result<Self, CaseError> {
        if new.loan_id != loan.id {
            return Err(CaseError::Validation(format!(
                "dispute names loan {} but was raised on {}",
                new.loan_id, loan.id
            )));
        }
        if !loan.is_party(&actor.id) {
            return Err(CaseError::NotPermitted(
                "only the borrower or lender can dispute a loan".into(),
            ));
        }
        let description = new.description.trim();
        if description.is_empty() {
            return Err(CaseError::Validation("description is required".into()));
        }
        tracing::debug!(dispute = %id, loan = %loan.id, by = %actor.id, "dispute raised");
        Ok(Self {
            id,
            loan_id: new.loan_id,
            dispute_type: new.dispute_type,
            description: description.to_string(),
            raised_by: actor.id.clone(),
            notes: Vec::new(),
            case: CaseState::open(),
            created_at: now,
        })
    }

    /// Append a note. Closed disputes take no more notes.
    pub fn add_note(
        &mut self,
        author: &Actor,
        note: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), CaseError> {
        if !self.case.status.is_open() {
            return Err(CaseError::AlreadyClosed(self.case.status));
        }
        let note = note.into();
        if note.trim().is_empty() {
            return Err(CaseError::Validation("note is empty".into()));
        }
        self.notes.push(DisputeNote {
            author: author.id.clone(),
            note: note.trim().to_string(),
            created_at: now,
        });
        Ok(())
    }

    pub fn resolve(
        &mut self,
        admin: &Actor,
        resolution: Resolution,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), CaseError> {
        self.case.close(admin, resolution, note, now)?;
        tracing::debug!(dispute = %self.id, status = %self.case.status, "dispute closed");
        Ok(())
    }
}
