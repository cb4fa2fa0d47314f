use proptest::prelude::*;

use udhaar_access::{evaluate, AccessOutcome, AuthSnapshot, Route};
use udhaar_types::{DocumentType, OnboardingStatus, RejectedDocument, Role, User};

fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = OnboardingStatus> {
    prop_oneof![
        Just(OnboardingStatus::Incomplete),
        Just(OnboardingStatus::Unreviewed),
        Just(OnboardingStatus::PendingReview),
        Just(OnboardingStatus::Verified),
        Just(OnboardingStatus::Rejected {
            rejected_documents: vec![RejectedDocument::new(DocumentType::Address, "expired")],
        }),
    ]
}

fn arb_path() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "/",
        "/login",
        "/register",
        "/forgot-password",
        "/onboarding",
        "/verification-pending",
        "/lender",
        "/lender/requests",
        "/borrower/my-loans",
        "/admin/users",
        "/unknown",
    ])
}

fn user(role: Role, status: OnboardingStatus) -> User {
    let base = User::new("prop-user", role, "p@example.com", "Prop", "User");
    match role {
        Role::Admin => base,
        Role::Borrower | Role::Lender => base.with_onboarding(status).unwrap(),
    }
}

proptest! {
    /// While auth state is loading, no known route decides anything else.
    #[test]
    fn loading_always_shows_loading(path in arb_path()) {
        let outcome = evaluate(path, &AuthSnapshot::loading());
        prop_assert!(
            outcome == AccessOutcome::ShowLoading
                || outcome == AccessOutcome::Allow
                || outcome == AccessOutcome::RedirectTo(Route::Landing)
        );
        if path != "/" && path != "/unknown" {
            prop_assert_eq!(outcome, AccessOutcome::ShowLoading);
        }
    }

    /// Admins are never sent to onboarding or the verification page.
    #[test]
    fn admins_skip_verification_gates(path in arb_path()) {
        let snapshot = AuthSnapshot::signed_in(user(Role::Admin, OnboardingStatus::Verified));
        let outcome = evaluate(path, &snapshot);
        prop_assert_ne!(outcome, AccessOutcome::RedirectTo(Route::Onboarding));
        prop_assert_ne!(outcome, AccessOutcome::RedirectTo(Route::VerificationPending));
    }

    /// A redirect never points back at the page being requested.
    #[test]
    fn redirects_never_loop(path in arb_path(), role in arb_role(), status in arb_status()) {
        let snapshot = AuthSnapshot::signed_in(user(role, status));
        if let AccessOutcome::RedirectTo(route) = evaluate(path, &snapshot) {
            prop_assert_ne!(route.path(), path);
            // The destination itself settles without bouncing back.
            if let AccessOutcome::RedirectTo(next) = evaluate(route.path(), &snapshot) {
                prop_assert_ne!(next.path(), path);
            }
        }
    }
}
