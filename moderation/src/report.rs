//! Reports filed by one user against another.

use crate::case::{CaseState, Resolution};
use crate::error::CaseError;
use serde::{Deserialize, Serialize};
use udhaar_types::{Actor, LoanId, ReportId, Timestamp, UserId};

/// Shortest description accepted for a report.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Fraud,
    Harassment,
    FakeProfile,
    NonPayment,
    PaymentIssue,
    Inappropriate,
    Other,
}

/// What a user submits when reporting someone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub reported_user_id: UserId,
    pub report_type: ReportType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<LoanId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub report_type: ReportType,
    pub description: String,
    pub reported_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<LoanId>,
    #[serde(flatten)]
    pub case: CaseState,
    pub created_at: Timestamp,
}

impl Report {
    /// File a new report.
    pub fn file(
        id: ReportId,
        reporter: &Actor,
        new: NewReport,
        now: Timestamp,
    ) -> Result<Self, CaseError> {
        if new.reported_user_id == reporter.id {
            return Err(CaseError::SelfReport);
        }
        let description = new.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(CaseError::Validation(format!(
                "description needs at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }
        tracing::debug!(report = %id, by = %reporter.id, against = %new.reported_user_id, "report filed");
        Ok(Self {
            id,
            report_type: new.report_type,
            description: description.to_string(),
            reported_by: reporter.id.clone(),
            reported_user: Some(new.reported_user_id),
            loan_id: new.loan_id,
            case: CaseState::open(),
            created_at: now,
        })
    }

    pub fn resolve(
        &mut self,
        admin: &Actor,
        resolution: Resolution,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), CaseError> {
        self.case.close(admin, resolution, note, now)?;
        tracing::debug!(report = %self.id, status = %self.case.status, "report closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseStatus;
    use udhaar_types::Role;

    fn new_report(against: &str) -> NewReport {
        NewReport {
            reported_user_id: UserId::new(against),
            report_type: ReportType::NonPayment,
            description: "Has not responded to repayment requests for 2 weeks".into(),
            loan_id: Some(LoanId::new("loan-active-001")),
        }
    }

    #[test]
    fn file_and_resolve() {
        let lender = Actor::new("lender-002", Role::Lender);
        let mut report =
            Report::file(ReportId::new("r1"), &lender, new_report("borrower-005"), Timestamp::new(1))
                .unwrap();
        assert_eq!(report.case.status, CaseStatus::Open);
        assert_eq!(report.reported_by, lender.id);

        let admin = Actor::new("a", Role::Admin);
        report
            .resolve(&admin, Resolution::Resolved, Some("user warned".into()), Timestamp::new(2))
            .unwrap();
        assert_eq!(report.case.status, CaseStatus::Resolved);
    }

    #[test]
    fn cannot_report_self() {
        let lender = Actor::new("lender-002", Role::Lender);
        assert_eq!(
            Report::file(ReportId::new("r1"), &lender, new_report("lender-002"), Timestamp::new(1)),
            Err(CaseError::SelfReport)
        );
    }

    #[test]
    fn short_description_rejected() {
        let lender = Actor::new("lender-002", Role::Lender);
        let mut new = new_report("borrower-005");
        new.description = "  too short   ".into();
        assert!(matches!(
            Report::file(ReportId::new("r1"), &lender, new, Timestamp::new(1)),
            Err(CaseError::Validation(_))
        ));
    }

    #[test]
    fn reads_legacy_wire_shape() {
        let json = r#"{
            "id": "report-001",
            "reportType": "fraud",
            "description": "User attempted to create multiple accounts",
            "reportedBy": "borrower-001",
            "reportedUser": "borrower-005",
            "status": "pending",
            "adminNotes": "checking",
            "createdAt": 100
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.case.status, CaseStatus::Open);
        assert_eq!(report.case.admin_note.as_deref(), Some("checking"));
    }
}
