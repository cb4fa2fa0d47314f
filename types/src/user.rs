//! The user model and its onboarding/verification status.
//!
//! On the wire a user carries four independent flags (`isOnboardingComplete`,
//! `verificationStatus`, `isAdminVerified`, `rejectedDocuments`). In memory
//! they collapse into a single [`OnboardingStatus`]:
//!
//! | status          | onboarded | verificationStatus | adminVerified | rejectedDocuments |
//! |-----------------|-----------|--------------------|---------------|-------------------|
//! | `Incomplete`    | false     | none               | false         | empty             |
//! | `Unreviewed`    | true      | none               | false         | empty             |
//! | `PendingReview` | true      | pending            | false         | empty             |
//! | `Rejected`      | true      | rejected           | false         | non-empty         |
//! | `Verified`      | true      | approved           | true          | empty             |
//!
//! Any other flag combination is rejected by [`User::try_from`].

use crate::error::UserError;
use crate::ids::UserId;
use crate::role::{Actor, Role};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default trust and repayment score for new accounts.
pub const DEFAULT_SCORE: u8 = 50;

/// Maximum trust / repayment score.
pub const MAX_SCORE: u8 = 100;

/// The three documents reviewed during verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Government ID (Aadhaar / PAN).
    Identity,
    /// Proof of address.
    Address,
    /// Live selfie.
    Selfie,
}

impl DocumentType {
    /// Review order used everywhere a document list is produced.
    pub const ALL: [DocumentType; 3] = [Self::Identity, Self::Address, Self::Selfie];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Address => "address",
            Self::Selfie => "selfie",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document the admin rejected, with the reason shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedDocument {
    #[serde(rename = "type")]
    pub document: DocumentType,
    pub reason: String,
}

impl RejectedDocument {
    pub fn new(document: DocumentType, reason: impl Into<String>) -> Self {
        Self {
            document,
            reason: reason.into(),
        }
    }
}

/// Wire-level verification status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

/// Where a user stands in onboarding and admin verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OnboardingStatus {
    /// Profile and documents not yet submitted.
    Incomplete,
    /// Onboarding finished but no review was ever requested.
    Unreviewed,
    /// Documents submitted, waiting for an admin decision.
    PendingReview,
    /// The admin rejected some or all documents.
    Rejected {
        rejected_documents: Vec<RejectedDocument>,
    },
    /// The admin approved all documents.
    Verified,
}

impl OnboardingStatus {
    pub fn is_onboarding_complete(&self) -> bool {
        !matches!(self, Self::Incomplete)
    }

    pub fn is_admin_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    pub fn verification_status(&self) -> VerificationStatus {
        match self {
            Self::Incomplete | Self::Unreviewed => VerificationStatus::None,
            Self::PendingReview => VerificationStatus::Pending,
            Self::Rejected { .. } => VerificationStatus::Rejected,
            Self::Verified => VerificationStatus::Approved,
        }
    }

    pub fn rejected_documents(&self) -> &[RejectedDocument] {
        match self {
            Self::Rejected { rejected_documents } => rejected_documents,
            _ => &[],
        }
    }

    /// Whether every document was rejected, so onboarding starts over.
    pub fn must_restart_onboarding(&self) -> bool {
        let rejected = self.rejected_documents();
        DocumentType::ALL
            .iter()
            .all(|doc| rejected.iter().any(|r| r.document == *doc))
    }

    /// Rebuild the status from the four wire flags.
    pub fn from_flags(
        is_onboarding_complete: bool,
        verification_status: VerificationStatus,
        is_admin_verified: bool,
        rejected_documents: Vec<RejectedDocument>,
    ) -> Result<Self, UserError> {
        if !rejected_documents.is_empty() && verification_status != VerificationStatus::Rejected {
            return Err(UserError::InconsistentFlags(format!(
                "rejected documents present with status {verification_status:?}"
            )));
        }
        if is_admin_verified && verification_status != VerificationStatus::Approved {
            // Legacy records may carry isAdminVerified without a status; treat
            // those as approved, everything else is contradictory.
            if verification_status != VerificationStatus::None {
                return Err(UserError::InconsistentFlags(format!(
                    "admin verified with status {verification_status:?}"
                )));
            }
        }

        // Documents not yet submitted: any review state is stale.
        if !is_onboarding_complete {
            return Ok(Self::Incomplete);
        }

        match (verification_status, is_admin_verified) {
            (VerificationStatus::Approved, _) | (VerificationStatus::None, true) => {
                Ok(Self::Verified)
            }
            (VerificationStatus::None, false) => Ok(Self::Unreviewed),
            (VerificationStatus::Pending, _) => Ok(Self::PendingReview),
            (VerificationStatus::Rejected, _) => {
                if rejected_documents.is_empty() {
                    // A bare rejection without per-document detail rejects everything.
                    Ok(Self::Rejected {
                        rejected_documents: DocumentType::ALL
                            .iter()
                            .map(|doc| RejectedDocument::new(*doc, "rejected by admin"))
                            .collect(),
                    })
                } else {
                    Ok(Self::Rejected { rejected_documents })
                }
            }
        }
    }
}

/// Account state as shown in the admin user list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    PendingVerification,
    Blocked,
}

/// A platform user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord", into = "UserRecord")]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    onboarding: OnboardingStatus,
    pub trust_score: u8,
    pub repayment_score: u8,
    pub average_rating: f64,
    pub total_ratings: u32,
    pub is_blocked: bool,
    pub created_at: Option<Timestamp>,
}

impl User {
    /// Create a freshly registered user.
    ///
    /// Admins start (and stay) verified; everyone else starts onboarding.
    pub fn new(
        id: impl Into<UserId>,
        role: Role,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let onboarding = match role {
            Role::Admin => OnboardingStatus::Verified,
            Role::Borrower | Role::Lender => OnboardingStatus::Incomplete,
        };
        Self {
            id: id.into(),
            role,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            city: None,
            state: None,
            onboarding,
            trust_score: DEFAULT_SCORE,
            repayment_score: DEFAULT_SCORE,
            average_rating: 0.0,
            total_ratings: 0,
            is_blocked: false,
            created_at: None,
        }
    }

    pub fn onboarding(&self) -> &OnboardingStatus {
        &self.onboarding
    }

    /// Move the user to a new onboarding status.
    pub fn set_onboarding(&mut self, status: OnboardingStatus) -> Result<(), UserError> {
        if self.role.bypasses_verification() && status != OnboardingStatus::Verified {
            return Err(UserError::AdminAlwaysVerified);
        }
        if let OnboardingStatus::Rejected { rejected_documents } = &status {
            if rejected_documents.is_empty() {
                return Err(UserError::EmptyRejection);
            }
        }
        self.onboarding = status;
        Ok(())
    }

    /// Builder-style variant of [`set_onboarding`](Self::set_onboarding).
    pub fn with_onboarding(mut self, status: OnboardingStatus) -> Result<Self, UserError> {
        self.set_onboarding(status)?;
        Ok(self)
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_onboarding_complete(&self) -> bool {
        self.onboarding.is_onboarding_complete()
    }

    pub fn is_admin_verified(&self) -> bool {
        self.onboarding.is_admin_verified()
    }

    pub fn verification_status(&self) -> VerificationStatus {
        self.onboarding.verification_status()
    }

    pub fn rejected_documents(&self) -> &[RejectedDocument] {
        self.onboarding.rejected_documents()
    }

    pub fn account_status(&self) -> AccountStatus {
        if self.is_blocked {
            AccountStatus::Blocked
        } else if matches!(self.onboarding, OnboardingStatus::PendingReview) {
            AccountStatus::PendingVerification
        } else {
            AccountStatus::Active
        }
    }

    /// Fold a new 1–5 rating into the running average.
    pub fn record_rating(&mut self, score: u8) -> Result<(), UserError> {
        if !(1..=5).contains(&score) {
            return Err(UserError::InvalidRating(score));
        }
        let total = self.average_rating * self.total_ratings as f64 + score as f64;
        self.total_ratings += 1;
        self.average_rating = total / self.total_ratings as f64;
        Ok(())
    }
}

/// The user as exchanged with the backend and kept in durable storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub is_onboarding_complete: bool,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub is_admin_verified: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_documents: Vec<RejectedDocument>,
    #[serde(default = "default_score")]
    pub trust_score: u8,
    #[serde(default = "default_score")]
    pub repayment_score: u8,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

fn default_score() -> u8 {
    DEFAULT_SCORE
}

impl TryFrom<UserRecord> for User {
    type Error = UserError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role: Role = record.role.parse()?;
        let onboarding = match role {
            Role::Admin => OnboardingStatus::Verified,
            Role::Borrower | Role::Lender => OnboardingStatus::from_flags(
                record.is_onboarding_complete,
                record.verification_status,
                record.is_admin_verified,
                record.rejected_documents,
            )?,
        };
        Ok(Self {
            id: record.id,
            role,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            phone: record.phone,
            city: record.city,
            state: record.state,
            onboarding,
            trust_score: record.trust_score.min(MAX_SCORE),
            repayment_score: record.repayment_score.min(MAX_SCORE),
            average_rating: record.average_rating.max(0.0),
            total_ratings: record.total_ratings,
            is_blocked: record.is_blocked,
            created_at: record.created_at,
        })
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            is_onboarding_complete: user.is_onboarding_complete(),
            verification_status: user.verification_status(),
            is_admin_verified: user.is_admin_verified(),
            rejected_documents: user.rejected_documents().to_vec(),
            id: user.id,
            role: user.role.as_str().to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            city: user.city,
            state: user.state,
            trust_score: user.trust_score,
            repayment_score: user.repayment_score,
            average_rating: user.average_rating,
            total_ratings: user.total_ratings,
            is_blocked: user.is_blocked,
            created_at: user.created_at,
        }
    }
}
