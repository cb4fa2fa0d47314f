use thiserror::Error;
use udhaar_types::{DocumentType, UserError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no decision recorded for the {0} document")]
    MissingDecision(DocumentType),

    #[error("a rejection reason is required for the {0} document")]
    BlankReason(DocumentType),

    #[error("the {0} document has not been submitted")]
    MissingDocument(DocumentType),

    #[error("user is not awaiting review (status {0})")]
    NotUnderReview(String),

    #[error("admins are not subject to verification")]
    AdminExempt,

    #[error(transparent)]
    User(#[from] UserError),
}
