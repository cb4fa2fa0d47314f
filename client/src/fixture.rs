//! Demo-mode backend.
//!
//! Answers every endpoint from an in-memory dataset after a short simulated
//! delay. Mutations run through the same engines the real backend enforces
//! and are kept, so later reads agree with earlier writes. The fixture is
//! permissive: a change the engines refuse is logged and acknowledged
//! without touching the data, and lookups that miss fall back to the first
//! record of their kind.

use crate::api::*;
use crate::backend::{AckResult, ApiResult, BackendKind, LendingBackend};
use crate::envelope::{Ack, Envelope};
use crate::fixture_data::{demo_user, is_demo_account, FixtureData};
use async_trait::async_trait;
use rand::Rng;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use udhaar_lifecycle::{LifecycleError, Loan, LoanEngine, LoanPolicy, LoanRequest, RepaymentInput};
use udhaar_moderation::{Dispute, NewDispute, NewReport, Report};
use udhaar_storage::{load_session, ClientStorage, DEMO_TOKEN};
use udhaar_types::{
    Actor, Clock, DisputeId, DocumentType, LoanId, NotificationId, RejectedDocument, ReportId,
    Role, Timestamp, User, UserId,
};
use udhaar_verification::{apply_outcome, complete_onboarding, resubmit, VerificationOutcome};

/// Simulated network delay, drawn uniformly per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latency {
    min: Duration,
    max: Duration,
}

impl Latency {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max,
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    async fn wait(&self) {
        if self.max.is_zero() {
            return;
        }
        let ms = rand::thread_rng()
            .gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(500))
    }
}

/// Registration answered locally, as used when the backend is unreachable.
pub fn demo_registration(request: &RegisterRequest, now: Timestamp) -> AuthPayload {
    let id = format!("demo-{}-{}", request.role.as_str(), now.as_secs());
    let mut user = User::new(
        id,
        request.role,
        request.email.clone(),
        request.first_name.clone(),
        request.last_name.clone(),
    );
    user.phone = request.phone.clone();
    user.created_at = Some(now);
    AuthPayload {
        user,
        token: DEMO_TOKEN.to_string(),
    }
}

/// The demo account for `role`, signed in with the demo token.
pub fn demo_login(role: Role) -> AuthPayload {
    AuthPayload {
        user: demo_user(role),
        token: DEMO_TOKEN.to_string(),
    }
}

pub struct FixtureBackend {
    data: Mutex<FixtureData>,
    engine: LoanEngine,
    storage: Arc<dyn ClientStorage>,
    clock: Arc<dyn Clock>,
    latency: Latency,
}

impl fmt::Debug for FixtureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureBackend")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl FixtureBackend {
    pub fn new(storage: Arc<dyn ClientStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Mutex::new(FixtureData::seed(clock.now())),
            engine: LoanEngine::default(),
            storage,
            clock,
            latency: Latency::default(),
        }
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_policy(mut self, policy: LoanPolicy) -> Self {
        self.engine = LoanEngine::new(policy);
        self
    }

    fn data(&self) -> MutexGuard<'_, FixtureData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The signed-in user as the dataset knows them.
    ///
    /// Demo accounts always resolve to the seeded demo user of their role.
    fn current_user(&self) -> Option<User> {
        let stored = match load_session(self.storage.as_ref()) {
            Ok(session) => session.user?,
            Err(e) => {
                tracing::warn!("demo: cannot read stored session: {e}");
                return None;
            }
        };
        if !is_demo_account(&stored.id) {
            return Some(stored);
        }
        let id = demo_user(stored.role).id;
        Some(
            self.data()
                .user(&id)
                .cloned()
                .unwrap_or_else(|| demo_user(stored.role)),
        )
    }

    fn actor(&self) -> Actor {
        match self.current_user() {
            Some(user) => user.actor(),
            None => {
                tracing::warn!("demo: no stored user, acting as the demo borrower");
                demo_user(Role::Borrower).actor()
            }
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let suffix: u16 = rand::thread_rng().gen_range(0..1000);
        format!("{prefix}-new-{}{suffix:03}", self.clock.now().as_secs())
    }

    /// Run a lifecycle operation on a copy of the loan and keep the result
    /// only if the engine accepted it.
    fn change_loan(
        &self,
        id: &LoanId,
        done: &str,
        op: impl FnOnce(&LoanEngine, &mut Loan, &Actor, Timestamp) -> Result<(), LifecycleError>,
    ) -> Ack {
        let actor = self.actor();
        let now = self.clock.now();
        let mut data = self.data();
        let Some(loan) = data.loans.iter_mut().find(|l| &l.id == id) else {
            tracing::warn!(loan = %id, "demo: unknown loan, nothing changed");
            return Envelope::done(done);
        };
        let mut updated = loan.clone();
        match op(&self.engine, &mut updated, &actor, now) {
            Ok(()) => *loan = updated,
            Err(e) => tracing::warn!(loan = %id, by = %actor.id, "demo: change not applied: {e}"),
        }
        Envelope::done(done)
    }

    /// Let the clock move loans past their due date to overdue, and past the
    /// grace period to defaulted.
    fn sweep_due_loans(&self) {
        let now = self.clock.now();
        for loan in self.data().loans.iter_mut() {
            let overdue = self.engine.mark_overdue(loan, now);
            let defaulted = self.engine.mark_defaulted(loan, now);
            if overdue || defaulted {
                tracing::debug!(loan = %loan.id, status = %loan.status, "demo: loan fell due");
            }
        }
    }

    fn loans_where(&self, keep: impl Fn(&Loan) -> bool) -> Vec<LoanView> {
        self.sweep_due_loans();
        let data = self.data();
        data.loans
            .iter()
            .filter(|l| keep(l))
            .map(|l| data.view(l))
            .collect()
    }

    fn decide_verification(&self, user: &UserId, outcome: VerificationOutcome, done: &str) -> Ack {
        let mut data = self.data();
        let FixtureData {
            users, documents, ..
        } = &mut *data;
        let Some(entry) = users.iter_mut().find(|u| &u.user.id == user) else {
            tracing::warn!(%user, "demo: unknown user, verification not applied");
            return Envelope::done(done);
        };
        let mut updated = entry.user.clone();
        let mut docs = documents.get(user).cloned().unwrap_or_default();
        match apply_outcome(&mut updated, &mut docs, outcome) {
            Ok(()) => {
                *entry = AdminUser::from(updated);
                documents.insert(user.clone(), docs);
            }
            Err(e) => tracing::warn!(%user, "demo: verification not applied: {e}"),
        }
        Envelope::done(done)
    }

    fn count(n: usize) -> ApiResult<Count> {
        Ok(Envelope::ok(Count { count: n as u64 }))
    }
}

#[async_trait]
impl LendingBackend for FixtureBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Demo
    }

    async fn register(&self, request: RegisterRequest) -> ApiResult<AuthPayload> {
        self.latency.wait().await;
        let payload = demo_registration(&request, self.clock.now());
        self.data().users.push(AdminUser::from(payload.user.clone()));
        Ok(Envelope::ok(payload).with_message("Registration successful! Welcome to the Udhaar demo."))
    }

    async fn login(&self, request: LoginRequest) -> ApiResult<AuthPayload> {
        self.latency.wait().await;
        let data = self.data();
        let user = data
            .users
            .iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(request.email.trim()))
            .map(|u| u.user.clone())
            .unwrap_or_else(|| {
                tracing::warn!(email = %request.email, "demo: unknown account, signing in as the demo borrower");
                demo_user(Role::Borrower)
            });
        Ok(Envelope::ok(AuthPayload {
            user,
            token: DEMO_TOKEN.to_string(),
        })
        .with_message("Login successful"))
    }

    async fn profile(&self) -> ApiResult<User> {
        self.latency.wait().await;
        Ok(Envelope {
            success: true,
            data: self.current_user(),
            message: None,
        })
    }

    async fn update_profile(&self, update: ProfileUpdate) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let mut data = self.data();
        if let Some(entry) = data.users.iter_mut().find(|u| u.user.id == actor.id) {
            update.apply_to(&mut entry.user);
        }
        Ok(Envelope::done("Profile updated successfully"))
    }

    async fn change_password(&self, _change: PasswordChange) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("Password changed successfully"))
    }

    async fn reset_password(&self, _reset: PasswordReset) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("Password reset instructions sent"))
    }

    async fn complete_onboarding(&self, submission: OnboardingSubmission) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let mut data = self.data();
        let FixtureData {
            users, documents, ..
        } = &mut *data;
        if let Some(entry) = users.iter_mut().find(|u| u.user.id == actor.id) {
            let mut user = entry.user.clone();
            let mut docs = documents.get(&actor.id).cloned().unwrap_or_default();
            let result = if user.rejected_documents().is_empty() {
                complete_onboarding(&mut user, &mut docs, submission.documents)
            } else {
                resubmit(&mut user, &mut docs, submission.documents)
            };
            match result {
                Ok(()) => {
                    user.phone = submission.phone.or(user.phone);
                    user.city = submission.city.or(user.city);
                    user.state = submission.state.or(user.state);
                    *entry = AdminUser::from(user);
                    documents.insert(actor.id.clone(), docs);
                }
                Err(e) => tracing::warn!(user = %actor.id, "demo: onboarding not applied: {e}"),
            }
        }
        Ok(Envelope::done("Onboarding completed"))
    }

    async fn send_email_verification(&self) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("Verification email sent"))
    }

    async fn verify_email(&self, _code: VerificationCode) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("Email verified"))
    }

    async fn send_phone_verification(&self) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("OTP sent"))
    }

    async fn verify_phone(&self, _code: VerificationCode) -> AckResult {
        self.latency.wait().await;
        Ok(Envelope::done("Phone verified"))
    }

    async fn create_loan_request(&self, request: LoanRequest) -> ApiResult<LoanView> {
        self.latency.wait().await;
        let actor = self.actor();
        let id = LoanId::new(self.fresh_id("loan"));
        match self.engine.create(&actor, id, request, self.clock.now()) {
            Ok(loan) => {
                let mut data = self.data();
                let view = data.view(&loan);
                data.loans.insert(0, loan);
                Ok(Envelope::ok(view).with_message("Loan request created successfully"))
            }
            Err(e) => {
                tracing::warn!(by = %actor.id, "demo: loan request not stored: {e}");
                Ok(Envelope {
                    success: true,
                    data: None,
                    message: Some("Loan request created successfully".into()),
                })
            }
        }
    }

    async fn my_borrowings(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.latency.wait().await;
        let actor = self.actor();
        let loans = self.loans_where(|l| l.borrower == actor.id && query.matches(l));
        Ok(Envelope::ok(LoanList {
            total: loans.len(),
            loans,
            total_pages: 1,
        }))
    }

    async fn mark_fulfilled(&self, loan: &LoanId) -> AckResult {
        self.latency.wait().await;
        Ok(self.change_loan(loan, "Marked as fulfilled", |engine, loan, actor, now| {
            engine.confirm_receipt(loan, actor, now)
        }))
    }

    async fn cancel_request(&self, loan: &LoanId) -> AckResult {
        self.latency.wait().await;
        Ok(self.change_loan(loan, "Request cancelled", |engine, loan, actor, _| {
            engine.cancel(loan, actor)
        }))
    }

    async fn pending_requests(&self, query: LoanQuery) -> ApiResult<RequestList> {
        self.latency.wait().await;
        let actor = self.actor();
        let requests = self.loans_where(|l| {
            l.status == udhaar_lifecycle::LoanStatus::Pending
                && l.borrower != actor.id
                && query.matches(l)
        });
        Ok(Envelope::ok(RequestList {
            total: requests.len(),
            requests,
            total_pages: 1,
        }))
    }

    async fn my_lending(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.latency.wait().await;
        let actor = self.actor();
        let loans = self.loans_where(|l| l.lender.as_ref() == Some(&actor.id) && query.matches(l));
        Ok(Envelope::ok(LoanList {
            total: loans.len(),
            loans,
            total_pages: 1,
        }))
    }

    async fn accept_request(&self, loan: &LoanId) -> AckResult {
        self.latency.wait().await;
        Ok(self.change_loan(loan, "Request accepted", |engine, loan, actor, now| {
            engine.accept(loan, actor, now)
        }))
    }

    async fn record_repayment(&self, loan: &LoanId, input: RepaymentInput) -> AckResult {
        self.latency.wait().await;
        Ok(self.change_loan(loan, "Repayment recorded", |engine, loan, actor, now| {
            engine.record_repayment(loan, actor, input, now).map(|_| ())
        }))
    }

    async fn loan_details(&self, loan: &LoanId) -> ApiResult<LoanView> {
        self.latency.wait().await;
        self.sweep_due_loans();
        let data = self.data();
        let found = data.loan(loan).or_else(|| {
            tracing::debug!(%loan, "demo: unknown loan, showing the first one");
            data.loans.first()
        });
        Ok(Envelope {
            success: true,
            data: found.map(|l| data.view(l)),
            message: None,
        })
    }

    async fn rate_loan(&self, loan: &LoanId, rating: RatingInput) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let now = self.clock.now();
        let mut data = self.data();
        let Some(entry) = data.loans.iter_mut().find(|l| &l.id == loan) else {
            tracing::warn!(%loan, "demo: unknown loan, rating not applied");
            return Ok(Envelope::done("Rating submitted"));
        };
        let mut updated = entry.clone();
        match self
            .engine
            .rate(&mut updated, &actor, rating.rating, rating.review, now)
        {
            Ok(()) => {
                let rated = if updated.borrower == actor.id {
                    updated.lender.clone()
                } else {
                    Some(updated.borrower.clone())
                };
                *entry = updated;
                if let Some(rated) = rated {
                    if let Some(user) = data.users.iter_mut().find(|u| u.user.id == rated) {
                        if let Err(e) = user.user.record_rating(rating.rating) {
                            tracing::warn!(user = %rated, "demo: rating not recorded: {e}");
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(%loan, by = %actor.id, "demo: rating not applied: {e}"),
        }
        Ok(Envelope::done("Rating submitted"))
    }

    async fn create_report(&self, report: NewReport) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let id = ReportId::new(self.fresh_id("report"));
        match Report::file(id, &actor, report, self.clock.now()) {
            Ok(report) => self.data().reports.insert(0, report),
            Err(e) => tracing::warn!(by = %actor.id, "demo: report not filed: {e}"),
        }
        Ok(Envelope::done("Report submitted successfully"))
    }

    async fn my_reports(&self) -> ApiResult<ReportList> {
        self.latency.wait().await;
        let actor = self.actor();
        let reports: Vec<Report> = self
            .data()
            .reports
            .iter()
            .filter(|r| r.reported_by == actor.id)
            .cloned()
            .collect();
        Ok(Envelope::ok(ReportList {
            total: reports.len(),
            reports,
            total_pages: 1,
        }))
    }

    async fn all_reports(&self, query: CaseQuery) -> ApiResult<ReportList> {
        self.latency.wait().await;
        let reports: Vec<Report> = self
            .data()
            .reports
            .iter()
            .filter(|r| query.matches(r.case.status))
            .cloned()
            .collect();
        Ok(Envelope::ok(ReportList {
            total: reports.len(),
            reports,
            total_pages: 1,
        }))
    }

    async fn resolve_report(&self, report: &ReportId, resolution: ReportResolution) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let now = self.clock.now();
        let mut data = self.data();
        match data.reports.iter_mut().find(|r| &r.id == report) {
            Some(found) => {
                if let Err(e) = found.resolve(&actor, resolution.status, resolution.admin_notes, now)
                {
                    tracing::warn!(%report, "demo: report not resolved: {e}");
                }
            }
            None => tracing::warn!(%report, "demo: unknown report"),
        }
        Ok(Envelope::done("Report resolved"))
    }

    async fn create_dispute(&self, dispute: NewDispute) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let now = self.clock.now();
        let id = DisputeId::new(self.fresh_id("dispute"));
        let mut data = self.data();
        let Some(loan) = data.loans.iter_mut().find(|l| l.id == dispute.loan_id) else {
            tracing::warn!(loan = %dispute.loan_id, "demo: unknown loan, dispute not raised");
            return Ok(Envelope::done("Dispute created"));
        };
        match Dispute::raise(id, &actor, loan, dispute, now) {
            Ok(raised) => {
                let mut updated = loan.clone();
                match self.engine.raise_dispute(&mut updated, &actor) {
                    Ok(()) => *loan = updated,
                    Err(e) => tracing::debug!(loan = %loan.id, "loan status unchanged: {e}"),
                }
                data.disputes.insert(0, raised);
            }
            Err(e) => tracing::warn!(by = %actor.id, "demo: dispute not raised: {e}"),
        }
        Ok(Envelope::done("Dispute created"))
    }

    async fn my_disputes(&self) -> ApiResult<DisputeList> {
        self.latency.wait().await;
        let actor = self.actor();
        let data = self.data();
        let disputes: Vec<Dispute> = data
            .disputes
            .iter()
            .filter(|d| {
                d.raised_by == actor.id
                    || data.loan(&d.loan_id).is_some_and(|l| l.is_party(&actor.id))
            })
            .cloned()
            .collect();
        Ok(Envelope::ok(DisputeList {
            total: disputes.len(),
            disputes,
            total_pages: 1,
        }))
    }

    async fn add_dispute_note(&self, dispute: &DisputeId, note: NoteInput) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let now = self.clock.now();
        let mut data = self.data();
        match data.disputes.iter_mut().find(|d| &d.id == dispute) {
            Some(found) => {
                if let Err(e) = found.add_note(&actor, note.note, now) {
                    tracing::warn!(%dispute, "demo: note not added: {e}");
                }
            }
            None => tracing::warn!(%dispute, "demo: unknown dispute"),
        }
        Ok(Envelope::done("Note added"))
    }

    async fn all_disputes(&self, query: CaseQuery) -> ApiResult<DisputeList> {
        self.latency.wait().await;
        let disputes: Vec<Dispute> = self
            .data()
            .disputes
            .iter()
            .filter(|d| query.matches(d.case.status))
            .cloned()
            .collect();
        Ok(Envelope::ok(DisputeList {
            total: disputes.len(),
            disputes,
            total_pages: 1,
        }))
    }

    async fn resolve_dispute(
        &self,
        dispute: &DisputeId,
        resolution: DisputeResolution,
    ) -> AckResult {
        self.latency.wait().await;
        let actor = self.actor();
        let now = self.clock.now();
        let mut data = self.data();
        let FixtureData {
            disputes, loans, ..
        } = &mut *data;
        let Some(found) = disputes.iter_mut().find(|d| &d.id == dispute) else {
            tracing::warn!(%dispute, "demo: unknown dispute");
            return Ok(Envelope::done("Dispute resolved"));
        };
        if let Err(e) = found.resolve(&actor, resolution.status, resolution.admin_note, now) {
            tracing::warn!(%dispute, "demo: dispute not resolved: {e}");
            return Ok(Envelope::done("Dispute resolved"));
        }
        if let Some(loan) = loans.iter_mut().find(|l| l.id == found.loan_id) {
            if loan.status == udhaar_lifecycle::LoanStatus::Disputed {
                let mut updated = loan.clone();
                match self.engine.resolve_dispute(&mut updated, &actor) {
                    Ok(()) => *loan = updated,
                    Err(e) => tracing::warn!(loan = %loan.id, "demo: loan not restored: {e}"),
                }
            }
        }
        Ok(Envelope::done("Dispute resolved"))
    }

    async fn notifications(&self) -> ApiResult<NotificationList> {
        self.latency.wait().await;
        let notifications = self.data().notifications.clone();
        Ok(Envelope::ok(NotificationList {
            total: notifications.len(),
            notifications,
        }))
    }

    async fn unread_count(&self) -> ApiResult<Count> {
        self.latency.wait().await;
        let unread = self.data().notifications.iter().filter(|n| !n.is_read).count();
        Self::count(unread)
    }

    async fn mark_notification_read(&self, notification: &NotificationId) -> AckResult {
        self.latency.wait().await;
        match self
            .data()
            .notifications
            .iter_mut()
            .find(|n| &n.id == notification)
        {
            Some(found) => found.is_read = true,
            None => tracing::warn!(%notification, "demo: unknown notification"),
        }
        Ok(Envelope::done("Marked as read"))
    }

    async fn mark_all_notifications_read(&self) -> AckResult {
        self.latency.wait().await;
        for n in self.data().notifications.iter_mut() {
            n.is_read = true;
        }
        Ok(Envelope::done("All marked as read"))
    }

    async fn delete_notification(&self, notification: &NotificationId) -> AckResult {
        self.latency.wait().await;
        self.data().notifications.retain(|n| &n.id != notification);
        Ok(Envelope::done("Notification deleted"))
    }

    async fn dashboard(&self) -> ApiResult<Dashboard> {
        self.latency.wait().await;
        let data = self.data();
        let mut stats = data.stats.clone();
        stats.pending_reports = data.open_reports() as u64;
        stats.open_disputes = data.open_disputes() as u64;
        stats.pending_verifications = data.pending_verifications() as u64;

        let mut recent: Vec<&Loan> = data.loans.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Envelope::ok(Dashboard {
            stats,
            recent_loans: recent.into_iter().take(5).map(|l| data.view(l)).collect(),
            recent_users: data.users.iter().take(5).cloned().collect(),
        }))
    }

    async fn users(&self, query: UserQuery) -> ApiResult<UserList> {
        self.latency.wait().await;
        let users: Vec<AdminUser> = self
            .data()
            .users
            .iter()
            .filter(|u| query.matches(u))
            .cloned()
            .collect();
        Ok(Envelope::ok(UserList {
            total: users.len(),
            users,
            pages: 1,
            page: 1,
        }))
    }

    async fn user_details(&self, user: &UserId) -> ApiResult<AdminUser> {
        self.latency.wait().await;
        let data = self.data();
        let found = data.users.iter().find(|u| &u.user.id == user).or_else(|| {
            tracing::debug!(%user, "demo: unknown user, showing the first one");
            data.users.first()
        });
        Ok(Envelope {
            success: true,
            data: found.cloned(),
            message: None,
        })
    }

    async fn set_user_blocked(&self, user: &UserId, request: BlockRequest) -> AckResult {
        self.latency.wait().await;
        let mut data = self.data();
        match data.users.iter_mut().find(|u| &u.user.id == user) {
            Some(entry) => {
                let mut updated = entry.user.clone();
                updated.is_blocked = request.block;
                *entry = AdminUser::from(updated);
            }
            None => tracing::warn!(%user, "demo: unknown user"),
        }
        Ok(Envelope::done("User status updated"))
    }

    async fn delete_user(&self, user: &UserId) -> AckResult {
        self.latency.wait().await;
        let mut data = self.data();
        data.users.retain(|u| &u.user.id != user);
        data.documents.remove(user);
        Ok(Envelope::done("User deleted"))
    }

    async fn approve_verification(&self, user: &UserId) -> AckResult {
        self.latency.wait().await;
        Ok(self.decide_verification(user, VerificationOutcome::FullApproval, "Verification approved"))
    }

    async fn reject_verification(&self, user: &UserId, reason: String) -> AckResult {
        self.latency.wait().await;
        let rejected = DocumentType::ALL
            .iter()
            .map(|doc| RejectedDocument::new(*doc, reason.clone()))
            .collect();
        Ok(self.decide_verification(
            user,
            VerificationOutcome::FullRejection(rejected),
            "Verification rejected",
        ))
    }

    async fn partially_reject_verification(
        &self,
        user: &UserId,
        rejections: Vec<RejectedDocument>,
    ) -> AckResult {
        self.latency.wait().await;
        if rejections.is_empty() {
            tracing::warn!(%user, "demo: partial rejection names no documents");
            return Ok(Envelope::done("Partial rejection applied"));
        }
        Ok(self.decide_verification(
            user,
            VerificationOutcome::PartialRejection(rejections),
            "Partial rejection applied",
        ))
    }

    async fn all_loans(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.latency.wait().await;
        let loans = self.loans_where(|l| query.matches(l));
        Ok(Envelope::ok(LoanList {
            total: loans.len(),
            loans,
            total_pages: 1,
        }))
    }

    async fn settings(&self) -> ApiResult<PlatformSettings> {
        self.latency.wait().await;
        Ok(Envelope::ok(self.data().settings.clone()))
    }

    async fn update_setting(&self, update: SettingUpdate) -> AckResult {
        self.latency.wait().await;
        if let Err(e) = self.data().settings.apply(&update) {
            tracing::warn!(key = %update.key, "demo: setting not updated: {e}");
        }
        Ok(Envelope::done("Setting updated"))
    }

    async fn activity_logs(&self) -> ApiResult<ActivityLogList> {
        self.latency.wait().await;
        let logs = self.data().activity_logs.clone();
        Ok(Envelope::ok(ActivityLogList {
            total: logs.len(),
            logs,
            total_pages: 1,
        }))
    }

    async fn pending_verifications_count(&self) -> ApiResult<Count> {
        self.latency.wait().await;
        Self::count(self.data().pending_verifications())
    }

    async fn pending_reports_count(&self) -> ApiResult<Count> {
        self.latency.wait().await;
        Self::count(self.data().open_reports())
    }

    async fn pending_disputes_count(&self) -> ApiResult<Count> {
        self.latency.wait().await;
        Self::count(self.data().open_disputes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture_data::DEMO_BORROWER_ID;
    use udhaar_lifecycle::{LoanStatus, PaymentMethod};
    use udhaar_moderation::{CaseStatus, ReportType, Resolution};
    use udhaar_nullables::{NullClock, NullStorage};
    use udhaar_storage::save_session;
    use udhaar_types::{Amount, VerificationStatus};

    const NOW: u64 = 1_750_000_000;

    fn backend_as(role: Role) -> (FixtureBackend, Arc<NullClock>) {
        let storage = Arc::new(NullStorage::new());
        let login = demo_login(role);
        save_session(storage.as_ref(), &login.token, &login.user).unwrap();
        let clock = Arc::new(NullClock::new(NOW));
        let backend =
            FixtureBackend::new(storage, clock.clone()).with_latency(Latency::none());
        (backend, clock)
    }

    #[tokio::test]
    async fn created_request_shows_up_in_borrowings() {
        let (backend, _) = backend_as(Role::Borrower);
        let request = LoanRequest::new(Amount::new(12_000), 30, "Rent");

        let created = backend.create_loan_request(request).await.unwrap();
        assert!(created.success);
        let view = created.into_data().unwrap();
        assert_eq!(view.loan.status, LoanStatus::Pending);
        assert!(view.loan.id.as_str().starts_with("loan-new-"));
        assert_eq!(view.loan.total_repayable, Amount::new(12_240));

        let mine = backend
            .my_borrowings(LoanQuery::default())
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(mine.loans[0].loan.id, view.loan.id);
        assert_eq!(mine.total, mine.loans.len());
    }

    #[tokio::test]
    async fn refused_request_is_not_stored() {
        let (backend, _) = backend_as(Role::Borrower);
        let before = backend
            .my_borrowings(LoanQuery::default())
            .await
            .unwrap()
            .into_data()
            .unwrap()
            .total;

        let refused = backend
            .create_loan_request(LoanRequest::new(Amount::new(10), 30, "Snacks"))
            .await
            .unwrap();
        assert!(refused.success);
        assert!(refused.data.is_none());

        let after = backend
            .my_borrowings(LoanQuery::default())
            .await
            .unwrap()
            .into_data()
            .unwrap()
            .total;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn accepted_request_moves_to_lending() {
        let (backend, _) = backend_as(Role::Lender);
        let id = LoanId::new("loan-pending-002");

        let pending = backend.pending_requests(LoanQuery::default()).await.unwrap();
        assert!(pending
            .into_data()
            .unwrap()
            .requests
            .iter()
            .any(|r| r.loan.id == id));

        backend.accept_request(&id).await.unwrap();

        let lending = backend
            .my_lending(LoanQuery::status(LoanStatus::Accepted))
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(lending.loans.len(), 1);
        assert_eq!(lending.loans[0].loan.id, id);
        assert_eq!(
            lending.loans[0].lender_profile.as_ref().map(|l| l.full_name()).as_deref(),
            Some("Priya Sharma")
        );
        let pending = backend
            .pending_requests(LoanQuery::default())
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert!(pending.requests.iter().all(|r| r.loan.id != id));
    }

    #[tokio::test]
    async fn refused_transition_is_acknowledged_without_change() {
        let (backend, _) = backend_as(Role::Lender);
        let completed = LoanId::new("loan-active-002");

        let ack = backend.accept_request(&completed).await.unwrap();
        assert!(ack.success);

        let loan = backend.loan_details(&completed).await.unwrap().into_data().unwrap();
        assert_eq!(loan.loan.status, LoanStatus::Completed);
    }

    #[tokio::test]
    async fn repayment_completes_loan() {
        let (backend, _) = backend_as(Role::Lender);
        let id = LoanId::new("loan-active-001");

        backend
            .record_repayment(&id, RepaymentInput::new(Amount::new(10_400), PaymentMethod::Upi))
            .await
            .unwrap();

        let loan = backend.loan_details(&id).await.unwrap().into_data().unwrap().loan;
        assert_eq!(loan.status, LoanStatus::Completed);
        assert_eq!(loan.amount_repaid, loan.total_repayable);
        assert_eq!(loan.repayments.len(), 1);
    }

    #[tokio::test]
    async fn unknown_loan_falls_back_to_first() {
        let (backend, _) = backend_as(Role::Borrower);
        let loan = backend
            .loan_details(&LoanId::new("no-such-loan"))
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert!(!loan.loan.id.as_str().is_empty());
    }

    #[tokio::test]
    async fn loans_fall_overdue_then_default_as_time_passes() {
        let (backend, clock) = backend_as(Role::Borrower);
        let id = LoanId::new("loan-active-001");
        let status = |view: LoanView| view.loan.status;
        let loan = backend.loan_details(&id).await.unwrap().into_data().unwrap().loan;
        assert_eq!(loan.status, LoanStatus::InProgress);
        let due = loan.due_date.unwrap();

        clock.set(due.as_secs() + 1);
        let view = backend.loan_details(&id).await.unwrap().into_data().unwrap();
        assert_eq!(status(view), LoanStatus::Overdue);

        clock.set(due.plus_days(6).as_secs());
        let mine = backend
            .my_borrowings(LoanQuery::default())
            .await
            .unwrap()
            .into_data()
            .unwrap();
        let swept = mine.loans.into_iter().find(|v| v.loan.id == id).unwrap();
        assert_eq!(status(swept), LoanStatus::Defaulted);
    }

    async fn unread(backend: &FixtureBackend) -> u64 {
        backend.unread_count().await.unwrap().into_data().unwrap().count
    }

    #[tokio::test]
    async fn notifications_mark_read_and_delete() {
        let (backend, _) = backend_as(Role::Borrower);
        assert_eq!(unread(&backend).await, 3);

        backend
            .mark_notification_read(&NotificationId::new("notif-001"))
            .await
            .unwrap();
        assert_eq!(unread(&backend).await, 2);

        backend
            .delete_notification(&NotificationId::new("notif-002"))
            .await
            .unwrap();
        backend.mark_all_notifications_read().await.unwrap();
        assert_eq!(unread(&backend).await, 0);
        let all = backend.notifications().await.unwrap().into_data().unwrap();
        assert_eq!(all.total, 4);
    }

    #[tokio::test]
    async fn verification_decisions_update_users() {
        let (backend, _) = backend_as(Role::Admin);
        let before = backend
            .pending_verifications_count()
            .await
            .unwrap()
            .into_data()
            .unwrap()
            .count;

        backend
            .approve_verification(&UserId::new("pending-user-001"))
            .await
            .unwrap();
        backend
            .partially_reject_verification(
                &UserId::new("pending-user-002"),
                vec![RejectedDocument::new(DocumentType::Selfie, "Face not visible")],
            )
            .await
            .unwrap();

        let after = backend
            .pending_verifications_count()
            .await
            .unwrap()
            .into_data()
            .unwrap()
            .count;
        assert_eq!(after, before - 2);

        let user = backend
            .user_details(&UserId::new("pending-user-002"))
            .await
            .unwrap()
            .into_data()
            .unwrap()
            .user;
        assert_eq!(user.verification_status(), VerificationStatus::Rejected);
        assert_eq!(user.rejected_documents()[0].document, DocumentType::Selfie);
    }

    #[tokio::test]
    async fn reports_flow_through_admin_queue() {
        let (backend, _) = backend_as(Role::Borrower);
        backend
            .create_report(NewReport {
                reported_user_id: UserId::new("borrower-005"),
                report_type: ReportType::Harassment,
                description: "Repeated threatening messages after repayment".into(),
                loan_id: None,
            })
            .await
            .unwrap();
        let mine = backend.my_reports().await.unwrap().into_data().unwrap();
        assert_eq!(mine.total, 2);
        assert!(mine.reports[0].id.as_str().starts_with("report-new-"));
    }

    #[tokio::test]
    async fn resolving_dispute_restores_loan() {
        let storage = Arc::new(NullStorage::new());
        let clock = Arc::new(NullClock::new(NOW));
        let backend = FixtureBackend::new(storage.clone(), clock).with_latency(Latency::none());
        let loan = LoanId::new("loan-active-001");

        let borrower = demo_login(Role::Borrower);
        save_session(storage.as_ref(), &borrower.token, &borrower.user).unwrap();
        backend
            .create_dispute(NewDispute {
                loan_id: loan.clone(),
                dispute_type: udhaar_moderation::DisputeType::Repayment,
                description: "Paid 2000 in cash that is not recorded".into(),
            })
            .await
            .unwrap();
        let details = backend.loan_details(&loan).await.unwrap().into_data().unwrap();
        assert_eq!(details.loan.status, LoanStatus::Disputed);
        let raised = backend.my_disputes().await.unwrap().into_data().unwrap().disputes[0]
            .id
            .clone();

        let admin = demo_login(Role::Admin);
        save_session(storage.as_ref(), &admin.token, &admin.user).unwrap();
        backend
            .resolve_dispute(
                &raised,
                DisputeResolution {
                    status: Resolution::Resolved,
                    admin_note: Some("Cash receipt verified".into()),
                },
            )
            .await
            .unwrap();

        let details = backend.loan_details(&loan).await.unwrap().into_data().unwrap();
        assert_eq!(details.loan.status, LoanStatus::InProgress);
        let open = backend
            .all_disputes(CaseQuery {
                status: Some(CaseStatus::Resolved),
                ..CaseQuery::default()
            })
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(open.disputes[0].id, raised);
    }

    #[tokio::test]
    async fn demo_login_by_email() {
        let (backend, _) = backend_as(Role::Borrower);
        let payload = backend
            .login(LoginRequest {
                email: "LENDER@udhaar.demo".into(),
                password: "anything".into(),
            })
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(payload.user.role, Role::Lender);
        assert_eq!(payload.token, DEMO_TOKEN);

        let blocked = backend
            .login(LoginRequest {
                email: "blocked@example.com".into(),
                password: "x".into(),
            })
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(blocked.user.email, "blocked@example.com");
    }

    #[tokio::test]
    async fn unknown_email_signs_in_as_demo_borrower() {
        let (backend, _) = backend_as(Role::Lender);
        let payload = backend
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(payload.user.id.as_str(), DEMO_BORROWER_ID);
        assert_eq!(payload.token, DEMO_TOKEN);
    }

    #[test]
    fn demo_registration_uses_role_and_time() {
        let payload = demo_registration(
            &RegisterRequest {
                email: "new@example.com".into(),
                password: "pw".into(),
                first_name: "New".into(),
                last_name: "Person".into(),
                phone: None,
                role: Role::Lender,
            },
            Timestamp::new(42),
        );
        assert_eq!(payload.user.id.as_str(), "demo-lender-42");
        assert_eq!(payload.token, DEMO_TOKEN);
        assert!(!payload.user.is_onboarding_complete());
    }

    #[tokio::test]
    async fn settings_update_is_kept() {
        let (backend, _) = backend_as(Role::Admin);
        backend
            .update_setting(SettingUpdate {
                key: "maxActiveLoansPerBorrower".into(),
                value: "5".into(),
            })
            .await
            .unwrap();
        let settings = backend.settings().await.unwrap().into_data().unwrap();
        assert_eq!(settings.max_active_loans_per_borrower, 5);
    }

    #[tokio::test]
    async fn latency_is_simulated() {
        let storage = Arc::new(NullStorage::new());
        let backend = FixtureBackend::new(storage, Arc::new(NullClock::new(NOW)))
            .with_latency(Latency::new(Duration::from_millis(20), Duration::from_millis(40)));
        let started = std::time::Instant::now();
        backend.unread_count().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
