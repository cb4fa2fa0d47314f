//! Loan lifecycle engine.
//!
//! A loan moves through these states:
//!
//! ```text
//! pending ──accept──▶ accepted ──confirm_receipt──▶ in_progress ──repaid──▶ completed
//!    │                    │                             │   ▲
//!    └──cancel──▶ cancelled                             ▼   │ (partial repayments)
//!                                                    overdue ──grace──▶ defaulted
//!
//! accepted / in_progress / overdue ──raise_dispute──▶ disputed ──resolve──▶ (previous)
//! ```
//!
//! Engine operations are synchronous: they validate, mutate the loan in
//! place and return. Time is always passed in.

pub mod engine;
pub mod error;
pub mod loan;
pub mod policy;

pub use engine::LoanEngine;
pub use error::{ErrorKind, LifecycleError};
pub use loan::{
    Loan, LoanRequest, LoanStatus, PaymentMethod, Rating, Repayment, RepaymentInput,
};
pub use policy::{Accrual, FlatInterest, InterestPolicy, LoanPolicy, MonthlyInterest};
