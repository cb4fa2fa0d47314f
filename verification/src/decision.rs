//! Turning three per-document decisions into one outcome.

use crate::document::{Decision, DocumentDecisions};
use crate::error::VerificationError;
use serde::{Deserialize, Serialize};
use udhaar_types::{DocumentType, RejectedDocument};

/// The result of reviewing all three documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "rejections", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Every document approved.
    FullApproval,
    /// One or two documents rejected; the approved ones are kept.
    PartialRejection(Vec<RejectedDocument>),
    /// All three rejected; documents are discarded and onboarding restarts.
    FullRejection(Vec<RejectedDocument>),
}

impl VerificationOutcome {
    pub fn rejected_documents(&self) -> &[RejectedDocument] {
        match self {
            Self::FullApproval => &[],
            Self::PartialRejection(docs) | Self::FullRejection(docs) => docs,
        }
    }

    /// One message listing every rejection reason, one line per document.
    pub fn combined_reason(&self) -> Option<String> {
        let docs = self.rejected_documents();
        if docs.is_empty() {
            return None;
        }
        let lines: Vec<String> = docs
            .iter()
            .map(|d| format!("- {}: {}", capitalize(d.document.as_str()), d.reason))
            .collect();
        let heading = match self {
            Self::FullRejection(_) => "All verifications rejected:",
            _ => "Some verifications rejected:",
        };
        Some(format!("{heading}\n{}", lines.join("\n")))
    }
}

/// Combine three document decisions.
///
/// Every document needs a decision and every rejection a non-blank reason;
/// otherwise nothing is decided.
pub fn decide(decisions: &DocumentDecisions) -> Result<VerificationOutcome, VerificationError> {
    let mut rejected = Vec::new();
    for document in DocumentType::ALL {
        match decisions.get(document) {
            None => return Err(VerificationError::MissingDecision(document)),
            Some(Decision::Approve) => {}
            Some(Decision::Reject { reason }) => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(VerificationError::BlankReason(document));
                }
                rejected.push(RejectedDocument::new(document, reason));
            }
        }
    }

    Ok(match rejected.len() {
        0 => VerificationOutcome::FullApproval,
        n if n == DocumentType::ALL.len() => VerificationOutcome::FullRejection(rejected),
        _ => VerificationOutcome::PartialRejection(rejected),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_approved() {
        let outcome = decide(&DocumentDecisions::approve_all()).unwrap();
        assert_eq!(outcome, VerificationOutcome::FullApproval);
        assert_eq!(outcome.combined_reason(), None);
    }

    #[test]
    fn one_rejection_is_partial() {
        let decisions = DocumentDecisions::approve_all()
            .with(DocumentType::Selfie, Decision::reject("face not visible"));
        assert_eq!(
            decide(&decisions).unwrap(),
            VerificationOutcome::PartialRejection(vec![RejectedDocument::new(
                DocumentType::Selfie,
                "face not visible"
            )])
        );
    }

    #[test]
    fn two_rejections_keep_review_order() {
        let decisions = DocumentDecisions::approve_all()
            .with(DocumentType::Selfie, Decision::reject("dark"))
            .with(DocumentType::Identity, Decision::reject("expired"));
        let outcome = decide(&decisions).unwrap();
        let docs: Vec<_> = outcome.rejected_documents().iter().map(|d| d.document).collect();
        assert_eq!(docs, vec![DocumentType::Identity, DocumentType::Selfie]);
        assert!(matches!(outcome, VerificationOutcome::PartialRejection(_)));
    }

    #[test]
    fn three_rejections_are_full() {
        let decisions = DocumentDecisions::new()
            .with(DocumentType::Address, Decision::reject("b"))
            .with(DocumentType::Identity, Decision::reject("a"))
            .with(DocumentType::Selfie, Decision::reject("c"));
        let outcome = decide(&decisions).unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::FullRejection(vec![
                RejectedDocument::new(DocumentType::Identity, "a"),
                RejectedDocument::new(DocumentType::Address, "b"),
                RejectedDocument::new(DocumentType::Selfie, "c"),
            ])
        );
        assert_eq!(
            outcome.combined_reason().unwrap(),
            "All verifications rejected:\n- Identity: a\n- Address: b\n- Selfie: c"
        );
    }

    #[test]
    fn missing_decision_is_an_error() {
        let decisions = DocumentDecisions::new()
            .with(DocumentType::Identity, Decision::Approve)
            .with(DocumentType::Selfie, Decision::Approve);
        assert_eq!(
            decide(&decisions),
            Err(VerificationError::MissingDecision(DocumentType::Address))
        );
    }

    #[test]
    fn blank_reason_is_an_error() {
        let decisions =
            DocumentDecisions::approve_all().with(DocumentType::Address, Decision::reject("  "));
        assert_eq!(
            decide(&decisions),
            Err(VerificationError::BlankReason(DocumentType::Address))
        );
    }

    #[test]
    fn reasons_are_trimmed() {
        let decisions =
            DocumentDecisions::approve_all().with(DocumentType::Address, Decision::reject(" old bill "));
        assert_eq!(
            decide(&decisions).unwrap().rejected_documents()[0].reason,
            "old bill"
        );
    }
}
