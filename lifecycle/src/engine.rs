//! Loan lifecycle engine: validates and applies every loan transition.

use crate::error::LifecycleError;
use crate::loan::{Loan, LoanRequest, LoanStatus, Rating, Repayment, RepaymentInput};
use crate::policy::{InterestPolicy, LoanPolicy};
use udhaar_types::{Actor, Amount, LoanId, Role, Timestamp};

pub struct LoanEngine {
    policy: LoanPolicy,
    interest: Box<dyn InterestPolicy>,
}

impl Default for LoanEngine {
    fn default() -> Self {
        Self::new(LoanPolicy::default())
    }
}

impl LoanEngine {
    pub fn new(policy: LoanPolicy) -> Self {
        Self {
            interest: policy.interest_accrual.interest_policy(),
            policy,
        }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Total the borrower will owe for `request`.
    pub fn quote(&self, amount: Amount, interest_bps: u32, duration_days: u32) -> Amount {
        self.interest
            .total_repayable(amount, interest_bps, duration_days)
    }

    /// Create a pending loan from a borrower's request.
    pub fn create(
        &self,
        actor: &Actor,
        id: LoanId,
        request: LoanRequest,
        now: Timestamp,
    ) -> Result<Loan, LifecycleError> {
        require_role(actor, Role::Borrower, "request a loan")?;
        let interest_bps = self.validate_request(&request)?;

        let loan = Loan {
            id,
            borrower: actor.id.clone(),
            lender: None,
            amount: request.amount,
            duration_days: request.duration_days,
            interest_bps,
            purpose: request.purpose.trim().to_string(),
            description: request.description,
            status: LoanStatus::Pending,
            total_repayable: self.quote(request.amount, interest_bps, request.duration_days),
            amount_repaid: Amount::ZERO,
            due_date: None,
            created_at: now,
            accepted_at: None,
            completed_at: None,
            disputed_from: None,
            repayments: Vec::new(),
            borrower_rating: None,
            lender_rating: None,
        };
        tracing::debug!(loan = %loan.id, borrower = %loan.borrower, amount = %loan.amount, "loan requested");
        Ok(loan)
    }

    fn validate_request(&self, request: &LoanRequest) -> Result<u32, LifecycleError> {
        let p = &self.policy;
        if request.amount < p.min_amount || request.amount > p.max_amount {
            return Err(LifecycleError::Validation(format!(
                "amount {} outside {}..={}",
                request.amount, p.min_amount, p.max_amount
            )));
        }
        if request.duration_days < p.min_duration_days
            || request.duration_days > p.max_duration_days
        {
            return Err(LifecycleError::Validation(format!(
                "duration {} days outside {}..={}",
                request.duration_days, p.min_duration_days, p.max_duration_days
            )));
        }
        let interest_bps = request.interest_bps.unwrap_or(p.default_interest_bps);
        if interest_bps > p.max_interest_bps {
            return Err(LifecycleError::Validation(format!(
                "interest {interest_bps} bps above the {} bps cap",
                p.max_interest_bps
            )));
        }
        if request.purpose.trim().is_empty() {
            return Err(LifecycleError::Validation("purpose is required".into()));
        }
        Ok(interest_bps)
    }

    /// A lender commits to fund a pending request.
    pub fn accept(
        &self,
        loan: &mut Loan,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        require_role(actor, Role::Lender, "accept a loan")?;
        require_status(loan, &[LoanStatus::Pending], "accept")?;
        if loan.borrower == actor.id {
            return Err(LifecycleError::NotPermitted(
                "cannot fund your own request".into(),
            ));
        }
        loan.lender = Some(actor.id.clone());
        loan.accepted_at = Some(now);
        set_status(loan, LoanStatus::Accepted);
        Ok(())
    }

    /// The borrower withdraws their own pending request.
    pub fn cancel(&self, loan: &mut Loan, actor: &Actor) -> Result<(), LifecycleError> {
        require_borrower(loan, actor, "cancel")?;
        require_status(loan, &[LoanStatus::Pending], "cancel")?;
        set_status(loan, LoanStatus::Cancelled);
        Ok(())
    }

    /// The borrower confirms the money arrived; the repayment clock starts.
    pub fn confirm_receipt(
        &self,
        loan: &mut Loan,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        require_borrower(loan, actor, "confirm receipt of")?;
        require_status(loan, &[LoanStatus::Accepted], "confirm receipt of")?;
        loan.due_date = Some(now.plus_days(loan.duration_days));
        loan.total_repayable = self.quote(loan.amount, loan.interest_bps, loan.duration_days);
        set_status(loan, LoanStatus::InProgress);
        Ok(())
    }

    /// The lender records money received from the borrower.
    ///
    /// Reaching the total repayable completes the loan.
    pub fn record_repayment(
        &self,
        loan: &mut Loan,
        actor: &Actor,
        input: RepaymentInput,
        now: Timestamp,
    ) -> Result<Repayment, LifecycleError> {
        require_lender(loan, actor, "record a repayment on")?;
        require_status(
            loan,
            &[LoanStatus::InProgress, LoanStatus::Overdue],
            "record a repayment on",
        )?;
        if input.amount.is_zero() {
            return Err(LifecycleError::Validation(
                "repayment amount must be positive".into(),
            ));
        }
        let remaining = loan.remaining();
        if input.amount > remaining {
            return Err(LifecycleError::Overpayment {
                amount: input.amount,
                remaining,
            });
        }

        let days_late = loan.due_date.map_or(0, |due| due.days_overdue(now));
        let repayment = Repayment {
            amount: input.amount,
            payment_date: now,
            payment_method: input.payment_method,
            transaction_reference: input.transaction_reference.filter(|s| !s.trim().is_empty()),
            remarks: input.remarks.filter(|s| !s.trim().is_empty()),
            confirmed_by_lender: true,
            is_late: days_late > 0,
            days_late,
        };
        loan.repayments.push(repayment.clone());
        loan.amount_repaid = loan.amount_repaid.saturating_add(input.amount);
        tracing::debug!(
            loan = %loan.id,
            amount = %input.amount,
            remaining = %loan.remaining(),
            days_late,
            "repayment recorded"
        );

        if loan.is_fully_repaid() {
            loan.completed_at = Some(now);
            set_status(loan, LoanStatus::Completed);
        }
        Ok(repayment)
    }

    /// Flag an in-progress loan whose due date passed with a balance left.
    ///
    /// Returns whether the status changed.
    pub fn mark_overdue(&self, loan: &mut Loan, now: Timestamp) -> bool {
        let past_due = loan.due_date.is_some_and(|due| now > due);
        if loan.status == LoanStatus::InProgress && past_due && !loan.is_fully_repaid() {
            set_status(loan, LoanStatus::Overdue);
            return true;
        }
        false
    }

    /// Default an overdue loan once the grace period has also passed.
    ///
    /// Returns whether the status changed.
    pub fn mark_defaulted(&self, loan: &mut Loan, now: Timestamp) -> bool {
        let Some(due) = loan.due_date else {
            return false;
        };
        if loan.status == LoanStatus::Overdue && now > due.plus_days(self.policy.overdue_grace_days)
        {
            set_status(loan, LoanStatus::Defaulted);
            return true;
        }
        false
    }

    /// Either party puts an open loan into dispute.
    pub fn raise_dispute(&self, loan: &mut Loan, actor: &Actor) -> Result<(), LifecycleError> {
        if !loan.is_party(&actor.id) {
            return Err(LifecycleError::NotPermitted(
                "only the borrower or lender can dispute a loan".into(),
            ));
        }
        require_status(
            loan,
            &[
                LoanStatus::Accepted,
                LoanStatus::InProgress,
                LoanStatus::Overdue,
            ],
            "dispute",
        )?;
        loan.disputed_from = Some(loan.status);
        set_status(loan, LoanStatus::Disputed);
        Ok(())
    }

    /// An admin closes a dispute; the loan returns to where it was.
    pub fn resolve_dispute(&self, loan: &mut Loan, actor: &Actor) -> Result<(), LifecycleError> {
        require_role(actor, Role::Admin, "resolve a dispute")?;
        require_status(loan, &[LoanStatus::Disputed], "resolve a dispute on")?;
        let previous = loan.disputed_from.take().unwrap_or(LoanStatus::InProgress);
        set_status(loan, previous);
        Ok(())
    }

    /// One party rates the other after completion.
    ///
    /// The lender's rating is stored as `borrower_rating` and the
    /// borrower's as `lender_rating`.
    pub fn rate(
        &self,
        loan: &mut Loan,
        actor: &Actor,
        score: u8,
        review: Option<String>,
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        if !(1..=5).contains(&score) {
            return Err(LifecycleError::Validation(format!(
                "rating must be 1 to 5, got {score}"
            )));
        }
        let slot = if loan.borrower == actor.id {
            &mut loan.lender_rating
        } else if loan.lender.as_ref() == Some(&actor.id) {
            &mut loan.borrower_rating
        } else {
            return Err(LifecycleError::NotPermitted(
                "only the borrower or lender can rate a loan".into(),
            ));
        };
        if loan.status != LoanStatus::Completed {
            return Err(LifecycleError::InvalidTransition {
                action: "rate",
                from: loan.status,
            });
        }
        if slot.is_some() {
            return Err(LifecycleError::AlreadyRated(actor.role));
        }
        *slot = Some(Rating {
            score,
            review: review.filter(|r| !r.trim().is_empty()),
            rated_at: now,
        });
        tracing::debug!(loan = %loan.id, by = %actor.role, score, "loan rated");
        Ok(())
    }
}

fn set_status(loan: &mut Loan, to: LoanStatus) {
    tracing::debug!(loan = %loan.id, from = %loan.status, %to, "loan status changed");
    loan.status = to;
}

fn require_status(
    loan: &Loan,
    allowed: &[LoanStatus],
    action: &'static str,
) -> Result<(), LifecycleError> {
    if allowed.contains(&loan.status) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            action,
            from: loan.status,
        })
    }
}

fn require_role(actor: &Actor, role: Role, action: &str) -> Result<(), LifecycleError> {
    if actor.role == role {
        Ok(())
    } else {
        Err(LifecycleError::NotPermitted(format!(
            "a {} cannot {action}",
            actor.role
        )))
    }
}

fn require_borrower(loan: &Loan, actor: &Actor, action: &str) -> Result<(), LifecycleError> {
    if loan.borrower == actor.id {
        Ok(())
    } else {
        Err(LifecycleError::NotPermitted(format!(
            "only the borrower can {action} this loan"
        )))
    }
}

fn require_lender(loan: &Loan, actor: &Actor, action: &str) -> Result<(), LifecycleError> {
    if loan.lender.as_ref() == Some(&actor.id) {
        Ok(())
    } else {
        Err(LifecycleError::NotPermitted(format!(
            "only the lender can {action} this loan"
        )))
    }
}
