//! Errors raised when building or decoding a [`User`](crate::User).

use thiserror::Error;

/// Invalid user state or wire record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown verification status: {0}")]
    UnknownVerificationStatus(String),

    #[error("admin accounts are always verified")]
    AdminAlwaysVerified,

    #[error("a rejected verification must name at least one document")]
    EmptyRejection,

    #[error("inconsistent onboarding flags: {0}")]
    InconsistentFlags(String),

    #[error("rating score must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}
