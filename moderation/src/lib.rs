//! Reports against users and disputes over loans.
//!
//! Both are admin-handled cases sharing one status model ([`CaseState`]):
//! a case opens (the backend may mark it as under investigation) and is
//! closed by an admin as resolved or dismissed with a note.

pub mod case;
pub mod dispute;
pub mod error;
pub mod report;

pub use case::{CaseState, CaseStatus, Resolution};
pub use dispute::{Dispute, DisputeNote, DisputeType, NewDispute};
pub use error::CaseError;
pub use report::{NewReport, Report, ReportType, MIN_DESCRIPTION_CHARS};
