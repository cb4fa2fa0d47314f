//! Printing payloads as text or JSON.

use serde::Serialize;
use udhaar_client::api::{
    ActivityLog, AdminStats, AdminUser, LoanView, Notification, PlatformSettings,
};
use udhaar_client::Ack;
use udhaar_moderation::{Dispute, Report};
use udhaar_types::{Timestamp, User};
use udhaar_utils::format_relative;

pub struct Output {
    json: bool,
    now: Timestamp,
}

impl Output {
    pub fn new(json: bool, now: Timestamp) -> Self {
        Self { json, now }
    }

    /// Print `value`, as JSON or through `render`.
    pub fn show<T: Serialize + ?Sized>(
        &self,
        value: &T,
        render: impl FnOnce(&T, Timestamp) -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", render(value, self.now));
        }
        Ok(())
    }

    pub fn lines<T: Serialize>(
        &self,
        items: &[T],
        empty: &str,
        render: impl Fn(&T, Timestamp) -> String,
    ) -> anyhow::Result<()> {
        self.show(items, |items, now| {
            if items.is_empty() {
                return empty.to_string();
            }
            items
                .iter()
                .map(|item| render(item, now))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    /// Print a mutation's acknowledgement.
    pub fn ack(&self, ack: &Ack, fallback: &str) -> anyhow::Result<()> {
        if !ack.success {
            anyhow::bail!(ack.message.clone().unwrap_or_else(|| "request failed".into()));
        }
        self.show(ack, |ack, _| {
            ack.message.clone().unwrap_or_else(|| fallback.to_string())
        })
    }
}

pub fn user(user: &User, _now: Timestamp) -> String {
    format!(
        "{} <{}> [{}] {}\n  verification: {:?}, trust {}, repayment {}, rating {:.1} ({})",
        user.full_name(),
        user.email,
        user.role,
        user.id,
        user.verification_status(),
        user.trust_score,
        user.repayment_score,
        user.average_rating,
        user.total_ratings,
    )
}

pub fn admin_user(entry: &AdminUser, _now: Timestamp) -> String {
    let u = &entry.user;
    format!(
        "{:<20} {:<26} {:<9} {:?}/{:?}",
        u.id.as_str(),
        u.full_name(),
        u.role.as_str(),
        entry.status,
        u.verification_status()
    )
}

pub fn loan_line(view: &LoanView, _now: Timestamp) -> String {
    let l = &view.loan;
    let counterparty = view
        .lender_profile
        .as_ref()
        .or(view.borrower_profile.as_ref())
        .map(|p| p.full_name())
        .unwrap_or_default();
    format!(
        "{:<20} {:<11} {:>8} / {:>3}d  repaid {} of {}  {} {}",
        l.id.as_str(),
        l.status.as_str(),
        l.amount.to_string(),
        l.duration_days,
        l.amount_repaid,
        l.total_repayable,
        l.purpose,
        if counterparty.is_empty() {
            String::new()
        } else {
            format!("({counterparty})")
        }
    )
}

pub fn loan_detail(view: &LoanView, now: Timestamp) -> String {
    let l = &view.loan;
    let mut out = vec![
        format!("{} [{}]", l.id, l.status),
        format!(
            "  {} for {} days at {}.{:02}% ({}): {}",
            l.amount,
            l.duration_days,
            l.interest_bps / 100,
            l.interest_bps % 100,
            l.total_repayable,
            l.purpose
        ),
        format!("  repaid {}, remaining {}", l.amount_repaid, l.remaining()),
    ];
    if let Some(b) = &view.borrower_profile {
        out.push(format!("  borrower: {} (trust {})", b.full_name(), b.trust_score));
    }
    if let Some(lender) = &view.lender_profile {
        out.push(format!("  lender:   {}", lender.full_name()));
    }
    if let Some(due) = l.due_date {
        out.push(format!("  due {}", format_relative(due, now)));
    }
    for r in &l.repayments {
        out.push(format!(
            "  paid {} via {:?} {}{}",
            r.amount,
            r.payment_method,
            format_relative(r.payment_date, now),
            if r.is_late {
                format!(" ({} days late)", r.days_late)
            } else {
                String::new()
            }
        ));
    }
    out.join("\n")
}

pub fn notification(n: &Notification, now: Timestamp) -> String {
    format!(
        "{} {:<10} {}: {} ({})",
        if n.is_read { " " } else { "*" },
        n.id.as_str(),
        n.title,
        n.message,
        format_relative(n.created_at, now)
    )
}

pub fn report(r: &Report, now: Timestamp) -> String {
    format!(
        "{:<12} {:<13} {:?} against {} ({}): {}",
        r.id.as_str(),
        r.case.status.as_str(),
        r.report_type,
        r.reported_user
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "-".into()),
        format_relative(r.created_at, now),
        r.description
    )
}

pub fn dispute(d: &Dispute, now: Timestamp) -> String {
    let mut out = format!(
        "{:<12} {:<13} {:?} on {} by {} ({}): {}",
        d.id.as_str(),
        d.case.status.as_str(),
        d.dispute_type,
        d.loan_id,
        d.raised_by,
        format_relative(d.created_at, now),
        d.description
    );
    for note in &d.notes {
        out.push_str(&format!("\n    {}: {}", note.author, note.note));
    }
    out
}

pub fn stats(s: &AdminStats, _now: Timestamp) -> String {
    [
        format!(
            "users {} ({} borrowers, {} lenders, {} new this month)",
            s.total_users, s.total_borrowers, s.total_lenders, s.new_users_this_month
        ),
        format!(
            "loans {} active, {} completed, {} defaulted; {} lent, average {}",
            s.active_loans, s.completed_loans, s.defaulted_loans, s.total_lent_amount,
            s.average_loan_amount
        ),
        format!(
            "queues: {} verifications, {} reports, {} disputes",
            s.pending_verifications, s.pending_reports, s.open_disputes
        ),
        format!("repayment rate {:.1}%", s.repayment_rate),
    ]
    .join("\n")
}

pub fn settings(s: &PlatformSettings, _now: Timestamp) -> String {
    match serde_json::to_value(s) {
        Ok(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(k, v)| format!("{k:<28} {v}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => format!("{s:?}"),
    }
}

pub fn activity(log: &ActivityLog, now: Timestamp) -> String {
    format!(
        "{:<16} {} ({})",
        log.action,
        log.description,
        format_relative(log.created_at, now)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use udhaar_client::fixture_data::{FixtureData, DEMO_BORROWER_ID};
    use udhaar_types::LoanId;

    #[test]
    fn loan_detail_lists_repayment_state() {
        let now = Timestamp::new(1_750_000_000);
        let data = FixtureData::seed(now);
        let loan = data.loan(&LoanId::new("loan-active-001")).unwrap();
        let text = loan_detail(&data.view(loan), now);
        assert!(text.contains("loan-active-001 [in_progress]"));
        assert!(text.contains("remaining ₹10400"));
        assert!(text.contains("2.00%"));
        assert!(text.contains("borrower: Amit Patel"));
    }

    #[test]
    fn settings_print_one_per_line() {
        let text = settings(&udhaar_client::fixture_data::default_settings(), Timestamp::new(0));
        assert!(text.lines().any(|l| l.starts_with("maxLoanAmount")));
    }

    #[test]
    fn user_line_names_role() {
        let u = udhaar_client::demo_user(udhaar_types::Role::Borrower);
        assert_eq!(u.id.as_str(), DEMO_BORROWER_ID);
        assert!(user(&u, Timestamp::new(0)).contains("[borrower]"));
    }
}
