//! Access gate for the Udhaar client.
//!
//! Every navigation is checked against the current [`AuthSnapshot`]. The
//! decision functions are pure: they never touch storage or the network and
//! never fail, they only say whether to wait, redirect or let the user in.
//!
//! - [`decide_access`] guards role-restricted pages.
//! - [`decide_onboarding_access`] guards the onboarding flow.
//! - [`decide_public_access`] guards login / register / forgot-password.
//! - [`decide_verification_access`] guards the verification-pending page.
//! - [`RouteGuard`] maps a path to the right decision function.

pub mod gate;
pub mod guard;
pub mod route;

pub use gate::{
    decide_access, decide_onboarding_access, decide_public_access, decide_verification_access,
};
pub use guard::{evaluate, RouteGuard};
pub use route::{AccessOutcome, AuthSnapshot, Route};
