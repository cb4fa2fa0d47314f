//! The four gate decision functions.
//!
//! Checks run in a fixed order and the first match wins. Loading always
//! takes precedence, then authentication, then role, then onboarding and
//! verification. Admins bypass the onboarding and verification checks.

use crate::route::{AccessOutcome, AuthSnapshot, Route};
use udhaar_types::{Role, User, VerificationStatus};

/// Gate a role-restricted page.
///
/// `required_roles` of `None` means any authenticated role may enter.
pub fn decide_access(snapshot: &AuthSnapshot, required_roles: Option<&[Role]>) -> AccessOutcome {
    if snapshot.loading {
        return AccessOutcome::ShowLoading;
    }
    if !snapshot.authenticated {
        return AccessOutcome::RedirectTo(Route::Login);
    }
    // Authenticated without a readable user: nothing to gate on.
    let Some(user) = snapshot.user.as_ref() else {
        return AccessOutcome::RedirectTo(Route::Login);
    };

    if let Some(roles) = required_roles {
        if !roles.contains(&user.role) {
            return AccessOutcome::RedirectTo(Route::role_home(user.role));
        }
    }

    if user.role.bypasses_verification() {
        return AccessOutcome::Allow;
    }
    if !user.is_onboarding_complete() {
        return AccessOutcome::RedirectTo(Route::Onboarding);
    }
    if awaiting_or_rejected(user) {
        return AccessOutcome::RedirectTo(Route::VerificationPending);
    }
    AccessOutcome::Allow
}

/// Gate the onboarding flow.
///
/// Rejected users are let back in to resubmit documents.
pub fn decide_onboarding_access(snapshot: &AuthSnapshot) -> AccessOutcome {
    if snapshot.loading {
        return AccessOutcome::ShowLoading;
    }
    if !snapshot.authenticated {
        return AccessOutcome::RedirectTo(Route::Login);
    }
    let Some(user) = snapshot.user.as_ref() else {
        return AccessOutcome::Allow;
    };

    let status = user.verification_status();
    if user.is_onboarding_complete() && status != VerificationStatus::Rejected {
        let bypass = user.role.bypasses_verification();
        if !user.is_admin_verified() && status == VerificationStatus::Pending && !bypass {
            return AccessOutcome::RedirectTo(Route::VerificationPending);
        }
        if user.is_admin_verified() || bypass {
            return AccessOutcome::RedirectTo(Route::role_home(user.role));
        }
    }
    AccessOutcome::Allow
}

/// Gate the public pages (login, register, forgot password).
///
/// Signed-in users are sent wherever they belong next.
pub fn decide_public_access(snapshot: &AuthSnapshot) -> AccessOutcome {
    if snapshot.loading {
        return AccessOutcome::ShowLoading;
    }
    if !snapshot.authenticated {
        return AccessOutcome::Allow;
    }
    // Let a session with an unreadable user sign in again.
    let Some(user) = snapshot.user.as_ref() else {
        return AccessOutcome::Allow;
    };

    let bypass = user.role.bypasses_verification();
    if !user.is_onboarding_complete() && !bypass {
        return AccessOutcome::RedirectTo(Route::Onboarding);
    }
    if user.is_onboarding_complete()
        && !user.is_admin_verified()
        && user.verification_status() == VerificationStatus::Pending
        && !bypass
    {
        return AccessOutcome::RedirectTo(Route::VerificationPending);
    }
    AccessOutcome::RedirectTo(Route::role_home(user.role))
}

/// Gate the verification-pending page.
pub fn decide_verification_access(snapshot: &AuthSnapshot) -> AccessOutcome {
    if snapshot.loading {
        return AccessOutcome::ShowLoading;
    }
    if !snapshot.authenticated {
        return AccessOutcome::RedirectTo(Route::Login);
    }
    let Some(user) = snapshot.user.as_ref() else {
        return AccessOutcome::RedirectTo(Route::Login);
    };

    if !user.is_onboarding_complete() && !user.role.bypasses_verification() {
        return AccessOutcome::RedirectTo(Route::Onboarding);
    }
    if user.is_admin_verified() || user.verification_status() == VerificationStatus::Approved {
        return AccessOutcome::RedirectTo(Route::role_home(user.role));
    }
    AccessOutcome::Allow
}

fn awaiting_or_rejected(user: &User) -> bool {
    !user.is_admin_verified()
        && matches!(
            user.verification_status(),
            VerificationStatus::Pending | VerificationStatus::Rejected
        )
}
