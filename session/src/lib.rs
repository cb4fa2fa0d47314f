//! Session state for the Udhaar client.
//!
//! [`SessionStore`] is the only writer of who is signed in: it persists the
//! token and user through [`udhaar_storage`] and publishes an
//! [`AuthSnapshot`](udhaar_access::AuthSnapshot) over a watch channel for the
//! access gate and anything else that needs to react. [`Poller`] keeps a
//! small value (the unread notification count) fresh in the background.

pub mod error;
pub mod poller;
pub mod store;

pub use error::SessionError;
pub use poller::Poller;
pub use store::SessionStore;
