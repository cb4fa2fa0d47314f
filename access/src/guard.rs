//! Route table: which gate applies to which path.

use crate::gate::{
    decide_access, decide_onboarding_access, decide_public_access, decide_verification_access,
};
use crate::route::{AccessOutcome, AuthSnapshot, Route};
use udhaar_types::Role;

/// The guard attached to a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteGuard {
    /// Login, register, forgot password.
    Public,
    Onboarding,
    Verification,
    /// A role's dashboard subtree.
    Protected(Role),
    /// The landing page, open to everyone.
    Landing,
    /// Not a known route; sent back to the landing page.
    Unknown,
}

impl RouteGuard {
    /// Classify a path. Query strings and trailing slashes are ignored.
    pub fn for_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Self::Landing;
        }
        let mut segments = trimmed.trim_start_matches('/').split('/');
        let first = segments.next().unwrap_or("");
        let rest: Vec<&str> = segments.collect();

        match (first, rest.is_empty()) {
            ("login" | "register" | "forgot-password", true) => Self::Public,
            ("onboarding", true) => Self::Onboarding,
            ("verification-pending", true) => Self::Verification,
            ("lender", _) if subpage_known(Role::Lender, &rest) => Self::Protected(Role::Lender),
            ("borrower", _) if subpage_known(Role::Borrower, &rest) => {
                Self::Protected(Role::Borrower)
            }
            ("admin", _) if subpage_known(Role::Admin, &rest) => Self::Protected(Role::Admin),
            _ => Self::Unknown,
        }
    }

    /// Run the matching gate.
    pub fn decide(&self, snapshot: &AuthSnapshot) -> AccessOutcome {
        match self {
            Self::Public => decide_public_access(snapshot),
            Self::Onboarding => decide_onboarding_access(snapshot),
            Self::Verification => decide_verification_access(snapshot),
            Self::Protected(role) => decide_access(snapshot, Some(std::slice::from_ref(role))),
            Self::Landing => AccessOutcome::Allow,
            Self::Unknown => AccessOutcome::RedirectTo(Route::Landing),
        }
    }
}

/// Decide a navigation to `path`.
pub fn evaluate(path: &str, snapshot: &AuthSnapshot) -> AccessOutcome {
    RouteGuard::for_path(path).decide(snapshot)
}

fn subpage_known(role: Role, rest: &[&str]) -> bool {
    match rest {
        [] | ["profile"] | ["notifications"] => true,
        ["loan" | "report", id] => role != Role::Admin && !id.is_empty(),
        [page] => match role {
            Role::Lender => matches!(*page, "requests" | "history"),
            Role::Borrower => matches!(*page, "new-request" | "my-loans"),
            Role::Admin => matches!(
                *page,
                "users" | "verifications" | "loans" | "reports" | "disputes" | "settings"
            ),
        },
        _ => false,
    }
}
