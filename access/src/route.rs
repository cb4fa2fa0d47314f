//! Routes, outcomes and the auth snapshot the gate decides on.

use serde::Serialize;
use std::fmt;
use udhaar_types::{Role, User};

/// A destination the gate can redirect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Route {
    Landing,
    Login,
    Register,
    ForgotPassword,
    Onboarding,
    VerificationPending,
    /// The dashboard of a role (`/admin`, `/lender`, `/borrower`).
    Home(Role),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::ForgotPassword => "/forgot-password",
            Self::Onboarding => "/onboarding",
            Self::VerificationPending => "/verification-pending",
            Self::Home(Role::Admin) => "/admin",
            Self::Home(Role::Lender) => "/lender",
            Self::Home(Role::Borrower) => "/borrower",
        }
    }

    pub fn role_home(role: Role) -> Self {
        Self::Home(role)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.path().to_string()
    }
}

/// What the caller should do with a navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "to", rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Auth state is still being restored; render nothing yet.
    ShowLoading,
    RedirectTo(Route),
    Allow,
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowLoading => f.write_str("loading"),
            Self::RedirectTo(route) => write!(f, "redirect {route}"),
            Self::Allow => f.write_str("allow"),
        }
    }
}

/// The slice of session state the gate needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub authenticated: bool,
    /// `None` when authenticated but the stored user could not be read.
    pub user: Option<User>,
}

impl AuthSnapshot {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            loading: false,
            authenticated: true,
            user: Some(user),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_homes() {
        assert_eq!(Route::role_home(Role::Admin).path(), "/admin");
        assert_eq!(Route::role_home(Role::Lender).path(), "/lender");
        assert_eq!(Route::role_home(Role::Borrower).path(), "/borrower");
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            AccessOutcome::RedirectTo(Route::Onboarding).to_string(),
            "redirect /onboarding"
        );
        assert_eq!(AccessOutcome::Allow.to_string(), "allow");
    }
}
