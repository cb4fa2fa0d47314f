//! Fundamental types for the Udhaar lending client.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, amounts, timestamps, roles, and the user model with its
//! onboarding/verification status.

pub mod amount;
pub mod error;
pub mod ids;
pub mod role;
pub mod time;
pub mod user;

pub use amount::Amount;
pub use error::UserError;
pub use ids::{DisputeId, LoanId, NotificationId, ReportId, UserId};
pub use role::{Actor, Role};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
pub use user::{
    AccountStatus, DocumentType, OnboardingStatus, RejectedDocument, User, UserRecord,
    VerificationStatus,
};
