//! Status shared by reports and disputes.

use crate::error::CaseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use udhaar_types::{Actor, Role, Timestamp};

/// Where a case stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    #[serde(alias = "pending")]
    Open,
    #[serde(alias = "under_review")]
    Investigating,
    Resolved,
    #[serde(alias = "closed")]
    Dismissed,
}

impl CaseStatus {
    /// Still waiting on an admin.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::Investigating)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an admin closes a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved,
    #[serde(alias = "closed")]
    Dismissed,
}

impl From<Resolution> for CaseStatus {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Resolved => Self::Resolved,
            Resolution::Dismissed => Self::Dismissed,
        }
    }
}

/// Status, admin note and resolution time of a case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseState {
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default, alias = "adminNotes", skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
}

impl CaseState {
    pub fn open() -> Self {
        Self::default()
    }

    /// An admin closes the case.
    pub fn close(
        &mut self,
        admin: &Actor,
        resolution: Resolution,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), CaseError> {
        require_admin(admin)?;
        if !self.status.is_open() {
            return Err(CaseError::AlreadyClosed(self.status));
        }
        self.status = resolution.into();
        self.admin_note = note.filter(|n| !n.trim().is_empty());
        self.resolved_at = Some(now);
        Ok(())
    }
}

fn require_admin(actor: &Actor) -> Result<(), CaseError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Borrower | Role::Lender => Err(CaseError::NotPermitted(
            "only admins can act on cases".into(),
        )),
    }
}
