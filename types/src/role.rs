//! Platform roles.

use crate::error::UserError;
use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a user holds on the platform. Fixed at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Requests loans and repays them.
    Borrower,
    /// Funds loan requests and records repayments.
    Lender,
    /// Reviews verifications, reports and disputes.
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Borrower, Role::Lender, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Borrower => "borrower",
            Self::Lender => "lender",
            Self::Admin => "admin",
        }
    }

    /// Whether onboarding and admin verification gates apply to this role.
    pub fn bypasses_verification(&self) -> bool {
        match self {
            Self::Admin => true,
            Self::Borrower | Self::Lender => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "borrower" => Ok(Self::Borrower),
            "lender" => Ok(Self::Lender),
            "admin" => Ok(Self::Admin),
            other => Err(UserError::UnknownRole(other.to_string())),
        }
    }
}

/// Who is performing an action: the user's id and role.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
