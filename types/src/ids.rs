//! Opaque identifiers for platform records.
//!
//! Identifiers are assigned by the backend (or the demo fixture) and are
//! never parsed by the client; they only need to compare and print.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifies a platform user (borrower, lender or admin).
    UserId
);
string_id!(
    /// Identifies a loan request, from creation through closure.
    LoanId
);
string_id!(
    /// Identifies a user report.
    ReportId
);
string_id!(
    /// Identifies a loan dispute.
    DisputeId
);
string_id!(NotificationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = LoanId::new("loan-pending-001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"loan-pending-001\"");
        let back: LoanId = serde_json::from_str("\"loan-pending-001\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_is_raw() {
        assert_eq!(UserId::from("demo-admin-001").to_string(), "demo-admin-001");
    }
}
