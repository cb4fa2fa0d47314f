//! Identity verification for borrowers and lenders.
//!
//! An admin reviews three documents (identity, address, selfie) and gives
//! each an approve/reject decision. [`decide`] turns those three decisions
//! into a single [`VerificationOutcome`]; [`apply_outcome`] moves the user
//! and their submitted documents accordingly. On the user side,
//! [`complete_onboarding`] submits the first set of documents and
//! [`resubmit`] replaces the rejected ones.

pub mod decision;
pub mod document;
pub mod error;
pub mod review;

pub use decision::{decide, VerificationOutcome};
pub use document::{Decision, DocumentDecisions, SubmittedDocuments};
pub use error::VerificationError;
pub use review::{apply_outcome, complete_onboarding, resubmit};
