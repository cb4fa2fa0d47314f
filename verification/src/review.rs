//! Applying review outcomes and document submissions to a user.

use crate::decision::VerificationOutcome;
use crate::document::SubmittedDocuments;
use crate::error::VerificationError;
use udhaar_types::{OnboardingStatus, User};

/// Record an admin's review outcome.
///
/// Only users waiting for review (or re-reviewed after a rejection) can be
/// decided. A new rejection replaces any earlier rejected list. Rejected
/// documents are dropped from the user's file; a full rejection drops all of
/// them so onboarding starts over.
pub fn apply_outcome(
    user: &mut User,
    documents: &mut SubmittedDocuments,
    outcome: VerificationOutcome,
) -> Result<(), VerificationError> {
    if user.role.bypasses_verification() {
        return Err(VerificationError::AdminExempt);
    }
    match user.onboarding() {
        OnboardingStatus::PendingReview | OnboardingStatus::Rejected { .. } => {}
        other => {
            return Err(VerificationError::NotUnderReview(format!(
                "{:?}",
                other.verification_status()
            )))
        }
    }

    match outcome {
        VerificationOutcome::FullApproval => {
            user.set_onboarding(OnboardingStatus::Verified)?;
        }
        VerificationOutcome::PartialRejection(rejected_documents) => {
            for rejected in &rejected_documents {
                documents.remove(rejected.document);
            }
            user.set_onboarding(OnboardingStatus::Rejected { rejected_documents })?;
        }
        VerificationOutcome::FullRejection(rejected_documents) => {
            documents.clear();
            user.set_onboarding(OnboardingStatus::Rejected { rejected_documents })?;
        }
    }
    tracing::debug!(user = %user.id, status = ?user.verification_status(), "verification decided");
    Ok(())
}

/// Submit the first full set of documents and finish onboarding.
pub fn complete_onboarding(
    user: &mut User,
    documents: &mut SubmittedDocuments,
    submission: SubmittedDocuments,
) -> Result<(), VerificationError> {
    if user.role.bypasses_verification() {
        return Err(VerificationError::AdminExempt);
    }
    if let Some(missing) = submission.first_missing() {
        return Err(VerificationError::MissingDocument(missing));
    }
    *documents = submission;
    user.set_onboarding(OnboardingStatus::PendingReview)?;
    tracing::debug!(user = %user.id, "onboarding submitted for review");
    Ok(())
}

/// Resubmit after a rejection.
///
/// The submission must replace every rejected document; approved documents
/// already on file are kept.
pub fn resubmit(
    user: &mut User,
    documents: &mut SubmittedDocuments,
    submission: SubmittedDocuments,
) -> Result<(), VerificationError> {
    if user.role.bypasses_verification() {
        return Err(VerificationError::AdminExempt);
    }
    let rejected = match user.onboarding() {
        OnboardingStatus::Rejected { rejected_documents } => rejected_documents.clone(),
        other => {
            return Err(VerificationError::NotUnderReview(format!(
                "{:?}",
                other.verification_status()
            )))
        }
    };
    if let Some(missing) = rejected.iter().find(|r| !submission.contains(r.document)) {
        return Err(VerificationError::MissingDocument(missing.document));
    }

    let mut merged = documents.clone();
    for (document, reference) in submission.iter() {
        merged.submit(document, reference);
    }
    if let Some(missing) = merged.first_missing() {
        return Err(VerificationError::MissingDocument(missing));
    }
    *documents = merged;
    user.set_onboarding(OnboardingStatus::PendingReview)?;
    tracing::debug!(user = %user.id, replaced = rejected.len(), "documents resubmitted");
    Ok(())
}
