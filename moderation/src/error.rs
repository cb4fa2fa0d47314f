use crate::case::CaseStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("invalid case: {0}")]
    Validation(String),

    #[error("users cannot report themselves")]
    SelfReport,

    #[error("case is already {0}")]
    AlreadyClosed(CaseStatus),

    #[error("not permitted: {0}")]
    NotPermitted(String),
}
