//! The demo dataset.
//!
//! Times are seeded relative to `now` so the data always looks fresh. The
//! demo borrower and lender accounts are the same people who appear in the
//! loan lists, so actions taken in demo mode show up in their own views.

use crate::api::{
    ActivityLog, AdminStats, AdminUser, LoanView, Notification, PlatformSettings, UserSummary,
};
use std::collections::HashMap;
use udhaar_lifecycle::{Loan, LoanStatus};
use udhaar_moderation::{CaseState, CaseStatus, Dispute, DisputeType, Report, ReportType};
use udhaar_types::{
    Amount, DisputeId, DocumentType, LoanId, NotificationId, OnboardingStatus, ReportId, Role,
    Timestamp, User, UserId,
};
use udhaar_verification::SubmittedDocuments;

pub const DEMO_ADMIN_ID: &str = "demo-admin-001";
pub const DEMO_LENDER_ID: &str = "demo-lender-001";
pub const DEMO_BORROWER_ID: &str = "demo-borrower-001";

/// Everything the fixture backend serves.
#[derive(Clone, Debug)]
pub struct FixtureData {
    pub users: Vec<AdminUser>,
    /// Documents on file per user, for verification decisions.
    pub documents: HashMap<UserId, SubmittedDocuments>,
    /// Newest first.
    pub loans: Vec<Loan>,
    pub notifications: Vec<Notification>,
    pub reports: Vec<Report>,
    pub disputes: Vec<Dispute>,
    pub activity_logs: Vec<ActivityLog>,
    pub settings: PlatformSettings,
    pub stats: AdminStats,
}

impl FixtureData {
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.user.id == id).map(|u| &u.user)
    }

    pub fn summary(&self, id: &UserId) -> Option<UserSummary> {
        self.user(id).map(UserSummary::from)
    }

    /// Attach party summaries to a loan.
    pub fn view(&self, loan: &Loan) -> LoanView {
        LoanView {
            borrower_profile: self.summary(&loan.borrower),
            lender_profile: loan.lender.as_ref().and_then(|id| self.summary(id)),
            loan: loan.clone(),
        }
    }

    pub fn loan(&self, id: &LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| &l.id == id)
    }

    pub fn pending_verifications(&self) -> usize {
        self.users
            .iter()
            .filter(|u| matches!(u.user.onboarding(), OnboardingStatus::PendingReview))
            .count()
    }

    pub fn open_reports(&self) -> usize {
        self.reports.iter().filter(|r| r.case.status.is_open()).count()
    }

    pub fn open_disputes(&self) -> usize {
        self.disputes.iter().filter(|d| d.case.status.is_open()).count()
    }

    /// Build the dataset as of `now`.
    pub fn seed(now: Timestamp) -> Self {
        let users = seed_users(now);
        let documents = users
            .iter()
            .filter(|u| matches!(u.user.onboarding(), OnboardingStatus::PendingReview))
            .map(|u| (u.user.id.clone(), sample_documents(u.user.id.as_str())))
            .collect();
        Self {
            users,
            documents,
            loans: seed_loans(now),
            notifications: seed_notifications(now),
            reports: seed_reports(now),
            disputes: seed_disputes(now),
            activity_logs: seed_activity_logs(now),
            settings: default_settings(),
            stats: seed_stats(),
        }
    }
}

/// One of the three demo accounts.
pub fn demo_user(role: Role) -> User {
    match role {
        Role::Admin => verified(
            person(DEMO_ADMIN_ID, Role::Admin, "Rajesh", "Kumar", "admin@udhaar.demo")
                .phone("+91 98765 43210")
                .place("Mumbai", "Maharashtra")
                .scores(100, 100)
                .created(Timestamp::new(1_705_314_600)),
        ),
        Role::Lender => verified(
            person(DEMO_LENDER_ID, Role::Lender, "Priya", "Sharma", "lender@udhaar.demo")
                .phone("+91 87654 32109")
                .place("Delhi", "Delhi")
                .scores(92, 95)
                .created(Timestamp::new(1_708_440_300)),
        ),
        Role::Borrower => verified(
            person(DEMO_BORROWER_ID, Role::Borrower, "Amit", "Patel", "borrower@udhaar.demo")
                .phone("+91 76543 21098")
                .place("Bangalore", "Karnataka")
                .scores(78, 85)
                .created(Timestamp::new(1_710_062_100)),
        ),
    }
}

/// Whether `id` names one of the demo accounts (including ones created by
/// demo registration).
pub fn is_demo_account(id: &UserId) -> bool {
    id.as_str().starts_with("demo-")
}

pub fn default_settings() -> PlatformSettings {
    PlatformSettings {
        min_loan_amount: Amount::new(500),
        max_loan_amount: Amount::new(100_000),
        min_duration: 7,
        max_duration: 90,
        default_interest_rate: 2.0,
        max_interest_rate: 5.0,
        platform_fee: 1.0,
        min_trust_score: 40,
        min_repayment_score: 35,
        auto_approve_threshold: 80,
        max_active_loans_per_borrower: 3,
        max_active_loans_per_lender: 10,
        reminder_days_before: 3,
        overdue_grace_period: 5,
        maintenance_mode: false,
    }
}

// ── users ───────────────────────────────────────────────────────────────────

struct Person(User);

fn person(id: &str, role: Role, first: &str, last: &str, email: &str) -> Person {
    Person(User::new(id, role, email, first, last))
}

impl Person {
    fn phone(mut self, phone: &str) -> Self {
        self.0.phone = Some(phone.to_string());
        self
    }

    fn place(mut self, city: &str, state: &str) -> Self {
        self.0.city = Some(city.to_string());
        self.0.state = Some(state.to_string());
        self
    }

    fn scores(mut self, trust: u8, repayment: u8) -> Self {
        self.0.trust_score = trust;
        self.0.repayment_score = repayment;
        self
    }

    fn created(mut self, at: Timestamp) -> Self {
        self.0.created_at = Some(at);
        self
    }

    fn status(self, status: OnboardingStatus) -> User {
        let mut user = self.0;
        if let Err(e) = user.set_onboarding(status) {
            tracing::warn!(user = %user.id, "demo user keeps default status: {e}");
        }
        user
    }
}

fn verified(person: Person) -> User {
    person.status(OnboardingStatus::Verified)
}

fn seed_users(now: Timestamp) -> Vec<AdminUser> {
    let borrower = |id, first, last, email, phone, city, state, trust, repayment| {
        person(id, Role::Borrower, first, last, email)
            .phone(phone)
            .place(city, state)
            .scores(trust, repayment)
    };
    let mut users = vec![
        demo_user(Role::Admin),
        demo_user(Role::Lender),
        demo_user(Role::Borrower),
        verified(borrower(
            "borrower-002", "Sneha", "Reddy", "sneha@example.com", "+91 65432 10987",
            "Hyderabad", "Telangana", 82, 90,
        )),
        borrower(
            "borrower-003", "Vikram", "Singh", "vikram@example.com", "+91 54321 09876",
            "Jaipur", "Rajasthan", 65, 72,
        )
        .status(OnboardingStatus::PendingReview),
        verified(borrower(
            "borrower-004", "Neha", "Gupta", "neha@example.com", "+91 43210 98765", "Pune",
            "Maharashtra", 88, 92,
        )),
        verified(borrower(
            "borrower-005", "Rahul", "Verma", "rahul@example.com", "+91 32109 87654",
            "Chennai", "Tamil Nadu", 71, 68,
        )),
        verified(
            person("lender-002", Role::Lender, "Suresh", "Menon", "suresh@example.com")
                .place("Kochi", "Kerala")
                .scores(88, 91),
        ),
    ];

    for (i, (id, first, last, email, phone, role, city, state)) in [
        (
            "pending-user-001", "Rohit", "Verma", "rohit.verma@example.com", "+91 98123 45678",
            Role::Borrower, "Pune", "Maharashtra",
        ),
        (
            "pending-user-002", "Sneha", "Patil", "sneha.patil@example.com", "+91 97654 32109",
            Role::Lender, "Bangalore", "Karnataka",
        ),
        (
            "pending-user-003", "Arjun", "Desai", "arjun.desai@example.com", "+91 99887 76655",
            Role::Borrower, "Hyderabad", "Telangana",
        ),
    ]
    .into_iter()
    .enumerate()
    {
        users.push(
            person(id, role, first, last, email)
                .phone(phone)
                .place(city, state)
                .created(now.minus_days(i as u32 + 1))
                .status(OnboardingStatus::PendingReview),
        );
    }

    let mut blocked = person("user-blocked-001", Role::Borrower, "Blocked", "User", "blocked@example.com")
        .place("Mumbai", "Maharashtra")
        .scores(25, 30)
        .created(Timestamp::new(1_704_882_600))
        .0;
    blocked.is_blocked = true;
    users.push(blocked);

    users.into_iter().map(AdminUser::from).collect()
}

fn sample_documents(user: &str) -> SubmittedDocuments {
    let mut docs = SubmittedDocuments::new();
    for document in DocumentType::ALL {
        docs.submit(document, format!("/uploads/{user}/{document}.jpg"));
    }
    docs
}

// ── loans ───────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn pending(
    id: &str,
    borrower: &str,
    amount: u64,
    duration_days: u32,
    interest_bps: u32,
    purpose: &str,
    description: &str,
    created_at: Timestamp,
) -> Loan {
    let amount = Amount::new(amount);
    Loan {
        id: LoanId::new(id),
        borrower: UserId::new(borrower),
        lender: None,
        amount,
        duration_days,
        interest_bps,
        purpose: purpose.to_string(),
        description: description.to_string(),
        status: LoanStatus::Pending,
        total_repayable: amount.saturating_add(amount.apply_bps(interest_bps)),
        amount_repaid: Amount::ZERO,
        due_date: None,
        created_at,
        accepted_at: None,
        completed_at: None,
        disputed_from: None,
        repayments: Vec::new(),
        borrower_rating: None,
        lender_rating: None,
    }
}

/// Move a seeded loan to in-progress (or completed when fully repaid).
fn funded(mut loan: Loan, lender: &str, total: u64, repaid: u64, now: Timestamp) -> Loan {
    let accepted = loan.created_at.plus_days(1);
    loan.lender = Some(UserId::new(lender));
    loan.accepted_at = Some(accepted);
    loan.total_repayable = Amount::new(total);
    loan.amount_repaid = Amount::new(repaid);
    loan.due_date = Some(accepted.plus_days(loan.duration_days));
    if loan.is_fully_repaid() {
        loan.status = LoanStatus::Completed;
        loan.completed_at = Some(loan.due_date.unwrap_or(now).min(now));
    } else {
        loan.status = LoanStatus::InProgress;
    }
    loan
}

fn seed_loans(now: Timestamp) -> Vec<Loan> {
    let mut loans = vec![
        pending(
            "borrower-loan-003", DEMO_BORROWER_ID, 5_000, 7, 150, "Personal",
            "Emergency personal expense", now.minus_hours(1),
        ),
        pending(
            "loan-pending-001", DEMO_BORROWER_ID, 15_000, 30, 200, "Medical Emergency",
            "Need funds for urgent medical treatment for family member", now.minus_hours(2),
        ),
        pending(
            "loan-pending-004", "borrower-004", 5_000, 7, 150, "Personal",
            "Short-term personal requirement", now.minus_hours(3),
        ),
        pending(
            "loan-pending-002", "borrower-002", 8_000, 15, 200, "Education",
            "Course fee payment deadline approaching", now.minus_hours(5),
        ),
        pending(
            "loan-pending-005", "borrower-005", 12_000, 30, 200, "Rent",
            "Need help with this month's rent payment", now.minus_hours(8),
        ),
        pending(
            "loan-pending-003", "borrower-003", 25_000, 45, 250, "Business",
            "Inventory purchase for small business expansion", now.minus_days(1),
        ),
    ];

    let active = [
        funded(
            pending(
                "borrower-loan-001", DEMO_BORROWER_ID, 15_000, 30, 200, "Medical Emergency",
                "Urgent hospital bills", now.minus_days(10),
            ),
            DEMO_LENDER_ID, 15_300, 5_000, now,
        ),
        funded(
            pending(
                "loan-active-001", DEMO_BORROWER_ID, 20_000, 30, 200, "Medical Emergency",
                "Hospital bills", now.minus_days(15),
            ),
            DEMO_LENDER_ID, 20_400, 10_000, now,
        ),
        funded(
            pending(
                "loan-active-003", "borrower-003", 35_000, 60, 250, "Business",
                "Working capital", now.minus_days(20),
            ),
            DEMO_LENDER_ID, 36_750, 15_000, now,
        ),
        funded(
            pending(
                "loan-active-002", "borrower-002", 10_000, 15, 200, "Education", "Exam fees",
                now.minus_days(30),
            ),
            DEMO_LENDER_ID, 10_200, 10_200, now,
        ),
        funded(
            pending(
                "borrower-loan-002", DEMO_BORROWER_ID, 8_000, 15, 200, "Education",
                "Course fees", now.minus_days(45),
            ),
            "lender-002", 8_160, 8_160, now,
        ),
    ];
    loans.extend(active);
    loans
}

// ── notifications, cases, logs ──────────────────────────────────────────────

fn seed_notifications(now: Timestamp) -> Vec<Notification> {
    let note = |id: &str, kind: &str, title: &str, message: &str, is_read, at| Notification {
        id: NotificationId::new(id),
        kind: kind.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        is_read,
        created_at: at,
    };
    vec![
        note(
            "notif-005", "new_request", "New Loan Request",
            "Sneha Reddy is requesting ₹8,000 for Education", false,
            Timestamp::new(now.as_secs().saturating_sub(30 * 60)),
        ),
        note(
            "notif-001", "loan_accepted", "Loan Request Accepted",
            "Your loan request of ₹15,000 has been accepted by Priya Sharma", false,
            now.minus_hours(2),
        ),
        note(
            "notif-002", "payment_received", "Payment Received",
            "You received a repayment of ₹5,000 from Amit Patel", false, now.minus_hours(5),
        ),
        note(
            "notif-003", "reminder", "Payment Reminder",
            "Your loan payment of ₹10,300 is due in 5 days", true, now.minus_days(1),
        ),
        note(
            "notif-004", "verification", "Verification Approved",
            "Your identity verification has been approved. Your trust score has been updated.",
            true, now.minus_days(3),
        ),
    ]
}

fn case(status: CaseStatus, resolved_at: Option<Timestamp>) -> CaseState {
    CaseState {
        status,
        admin_note: None,
        resolved_at,
    }
}

fn seed_reports(now: Timestamp) -> Vec<Report> {
    let report = |id: &str, kind, description: &str, by: &str, against: &str, state, at| Report {
        id: ReportId::new(id),
        report_type: kind,
        description: description.to_string(),
        reported_by: UserId::new(by),
        reported_user: Some(UserId::new(against)),
        loan_id: None,
        case: state,
        created_at: at,
    };
    vec![
        report(
            "report-004", ReportType::FakeProfile,
            "User profile appears to have fake or stolen identity documents",
            DEMO_LENDER_ID, "borrower-004", case(CaseStatus::Open, None), now.minus_days(1),
        ),
        report(
            "report-001", ReportType::Fraud,
            "User attempted to create multiple accounts with different emails",
            DEMO_BORROWER_ID, "borrower-005", case(CaseStatus::Open, None), now.minus_days(2),
        ),
        report(
            "report-005", ReportType::NonPayment,
            "Borrower has not responded to repayment requests for 2 weeks", "lender-002",
            "borrower-005", case(CaseStatus::Investigating, None), now.minus_days(3),
        ),
        report(
            "report-002", ReportType::Harassment,
            "Aggressive collection messages and threatening calls", "borrower-002",
            DEMO_LENDER_ID, case(CaseStatus::Investigating, None), now.minus_days(5),
        ),
        report(
            "report-003", ReportType::PaymentIssue,
            "Payment marked as received but not actually received", "lender-002",
            "borrower-003", case(CaseStatus::Resolved, Some(now.minus_days(7))),
            now.minus_days(10),
        ),
    ]
}

fn seed_disputes(now: Timestamp) -> Vec<Dispute> {
    let dispute = |id: &str, loan: &str, kind, description: &str, by: &str, status, at| Dispute {
        id: DisputeId::new(id),
        loan_id: LoanId::new(loan),
        dispute_type: kind,
        description: description.to_string(),
        raised_by: UserId::new(by),
        notes: Vec::new(),
        case: case(status, None),
        created_at: at,
    };
    vec![
        dispute(
            "dispute-003", "loan-active-002", DisputeType::LoanTerms,
            "Borrower claims the agreed duration was 45 days, not 30 days", "borrower-002",
            CaseStatus::Open, now.minus_days(1),
        ),
        dispute(
            "dispute-001", "loan-active-001", DisputeType::Repayment,
            "Borrower claims to have paid more than recorded in the system", DEMO_BORROWER_ID,
            CaseStatus::Open, now.minus_days(3),
        ),
        dispute(
            "dispute-002", "loan-active-003", DisputeType::Terms,
            "Disagreement on agreed interest rate - borrower says 1.5%, lender recorded 2.5%",
            "borrower-003", CaseStatus::Investigating, now.minus_days(7),
        ),
    ]
}

fn seed_activity_logs(now: Timestamp) -> Vec<ActivityLog> {
    let log = |id: &str, action: &str, description: &str, user: &str, at| ActivityLog {
        id: id.to_string(),
        action: action.to_string(),
        description: description.to_string(),
        user_id: Some(UserId::new(user)),
        created_at: at,
    };
    vec![
        log(
            "log-001", "user_registered", "New user registration: Amit Patel",
            DEMO_BORROWER_ID, now.minus_hours(1),
        ),
        log(
            "log-002", "loan_created", "New loan request: ₹15,000 by Sneha Reddy",
            "borrower-002", now.minus_hours(2),
        ),
        log(
            "log-003", "loan_accepted", "Loan accepted: ₹20,000 by Priya Sharma", DEMO_LENDER_ID,
            now.minus_hours(5),
        ),
        log(
            "log-004", "payment_received", "Payment received: ₹5,000 from Amit Patel",
            DEMO_BORROWER_ID, now.minus_hours(8),
        ),
        log(
            "log-005", "user_verified", "User verification approved: Neha Gupta", "borrower-004",
            now.minus_days(1),
        ),
    ]
}

fn seed_stats() -> AdminStats {
    AdminStats {
        total_users: 1_247,
        total_lenders: 342,
        total_borrowers: 892,
        new_users_this_month: 156,
        active_loans: 423,
        completed_loans: 1_876,
        defaulted_loans: 23,
        total_lent_amount: Amount::new(15_680_000),
        pending_reports: 8,
        open_disputes: 12,
        pending_verifications: 45,
        monthly_growth: 12.5,
        average_loan_amount: Amount::new(18_500),
        repayment_rate: 94.2,
    }
}
