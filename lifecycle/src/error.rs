use crate::loan::LoanStatus;
use thiserror::Error;
use udhaar_types::{Amount, Role};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid loan request: {0}")]
    Validation(String),

    #[error("repayment of {amount} exceeds the remaining {remaining}")]
    Overpayment { amount: Amount, remaining: Amount },

    #[error("cannot {action} a loan that is {from}")]
    InvalidTransition { action: &'static str, from: LoanStatus },

    #[error("the {0} has already rated this loan")]
    AlreadyRated(Role),

    #[error("not permitted: {0}")]
    NotPermitted(String),
}

/// Coarse classification for callers that only branch on the category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    AlreadyRated,
    NotPermitted,
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Overpayment { .. } => ErrorKind::Validation,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::AlreadyRated(_) => ErrorKind::AlreadyRated,
            Self::NotPermitted(_) => ErrorKind::NotPermitted,
        }
    }
}
