//! Command handlers.
//!
//! Each mutation is first checked by the local engines against the latest
//! copy of the record, so an impossible request never reaches the backend.

use crate::commands::{
    AdminAction, Command, DisputeAction, LoanAction, NotificationAction, ReportAction,
};
use crate::output::{self, Output};
use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;
use udhaar_access::evaluate;
use udhaar_client::api::{
    BlockRequest, CaseQuery, DisputeResolution, LoanQuery, NoteInput, OnboardingSubmission,
    RatingInput, RegisterRequest, ReportResolution, SettingUpdate, UserQuery,
};
use udhaar_client::{Ack, ClientError, Envelope, LendingBackend};
use udhaar_lifecycle::{LoanEngine, LoanRequest, RepaymentInput};
use udhaar_moderation::{NewDispute, NewReport};
use udhaar_session::{Poller, SessionStore};
use udhaar_types::{
    Actor, Clock, DisputeId, DocumentType, LoanId, NotificationId, ReportId, Role, UserId,
};
use udhaar_verification::{decide, DocumentDecisions, SubmittedDocuments};

pub struct App {
    pub session: SessionStore,
    pub backend: Arc<dyn LendingBackend>,
    pub engine: LoanEngine,
    pub clock: Arc<dyn Clock>,
    pub out: Output,
    pub poll_interval: Duration,
}

impl App {
    /// Unwrap a backend reply; an expired session is cleared first.
    fn payload<T>(&self, result: Result<Envelope<T>, ClientError>) -> anyhow::Result<T> {
        Ok(self.session.reconcile(result)?.into_data()?)
    }

    fn acked(&self, result: Result<Ack, ClientError>) -> anyhow::Result<Ack> {
        Ok(self.session.reconcile(result)?)
    }

    fn actor(&self) -> anyhow::Result<Actor> {
        match self.session.user() {
            Some(user) => Ok(user.actor()),
            None => bail!("not signed in (try `udhaar login` or `udhaar demo-login borrower`)"),
        }
    }

    fn require_role(&self, role: Role) -> anyhow::Result<Actor> {
        let actor = self.actor()?;
        if actor.role != role {
            bail!("this command is for {role}s, you are signed in as {}", actor.role);
        }
        Ok(actor)
    }

    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Login { email, password } => {
                let user = self.session.login(&email, &password).await?;
                self.out.show(&user, output::user)
            }
            Command::Register {
                email,
                password,
                first_name,
                last_name,
                phone,
                role,
            } => {
                if role == Role::Admin {
                    bail!("admin accounts cannot be self-registered");
                }
                let user = self
                    .session
                    .register(RegisterRequest {
                        email,
                        password,
                        first_name,
                        last_name,
                        phone,
                        role,
                    })
                    .await?;
                self.out.show(&user, output::user)
            }
            Command::DemoLogin { role } => {
                let user = self.session.login_demo(role)?;
                self.out.show(&user, output::user)
            }
            Command::Logout => {
                self.session.logout()?;
                self.out.show("signed out", |s, _| s.to_string())
            }
            Command::Whoami { refresh } => {
                if refresh {
                    self.session.refresh_user().await?;
                }
                match self.session.user() {
                    Some(user) => self.out.show(&user, output::user),
                    None => bail!("not signed in"),
                }
            }
            Command::Access { path } => {
                let outcome = evaluate(&path, &self.session.snapshot());
                self.out.show(&outcome, |o, _| o.to_string())
            }
            Command::Onboard {
                identity,
                address,
                selfie,
                phone,
                city,
                state,
            } => {
                self.onboard([identity, address, selfie], phone, city, state)
                    .await
            }
            Command::Loans { action } => self.loans(action).await,
            Command::Notifications { action } => self.notifications(action).await,
            Command::Reports { action } => self.reports(action).await,
            Command::Disputes { action } => self.disputes(action).await,
            Command::Admin { action } => self.admin(action).await,
        }
    }

    async fn onboard(
        &self,
        references: [Option<String>; 3],
        phone: Option<String>,
        city: Option<String>,
        state: Option<String>,
    ) -> anyhow::Result<()> {
        let user = self.session.user().context("not signed in")?;
        let mut documents = SubmittedDocuments::new();
        for (doc, reference) in DocumentType::ALL.into_iter().zip(references) {
            if let Some(reference) = reference {
                documents.submit(doc, reference);
            }
        }
        let rejected = user.rejected_documents();
        if rejected.is_empty() {
            if let Some(missing) = documents.first_missing() {
                bail!("missing the {missing} document");
            }
        } else if let Some(r) = rejected.iter().find(|r| !documents.contains(r.document)) {
            bail!("the {} document was rejected ({}); submit a replacement", r.document, r.reason);
        }

        let ack = self
            .backend
            .complete_onboarding(OnboardingSubmission {
                phone,
                city,
                state,
                documents,
                ..OnboardingSubmission::default()
            })
            .await;
        let ack = self.acked(ack)?;
        if let Err(e) = self.session.refresh_user().await {
            tracing::debug!("profile not refreshed after onboarding: {e}");
        }
        self.out.ack(&ack, "documents submitted for review")
    }

    async fn loan(&self, id: &LoanId) -> anyhow::Result<udhaar_lifecycle::Loan> {
        let result = self.backend.loan_details(id).await;
        Ok(self.payload(result)?.loan)
    }

    async fn loans(&self, action: LoanAction) -> anyhow::Result<()> {
        let now = self.clock.now();
        match action {
            LoanAction::List { status } => {
                let actor = self.actor()?;
                let query = LoanQuery {
                    status,
                    ..LoanQuery::default()
                };
                let loans = match actor.role {
                    Role::Borrower => self.payload(self.backend.my_borrowings(query).await)?.loans,
                    Role::Lender => self.payload(self.backend.my_lending(query).await)?.loans,
                    Role::Admin => self.payload(self.backend.all_loans(query).await)?.loans,
                };
                self.out.lines(&loans, "no loans", output::loan_line)
            }
            LoanAction::Pending => {
                let requests = self.backend.pending_requests(LoanQuery::default()).await;
                let requests = self.payload(requests)?;
                self.out.lines(&requests.requests, "no open requests", output::loan_line)
            }
            LoanAction::Show { id } => {
                let view = self.payload(self.backend.loan_details(&LoanId::new(id)).await)?;
                self.out.show(&view, output::loan_detail)
            }
            LoanAction::Request {
                amount,
                days,
                purpose,
                description,
                interest_bps,
            } => {
                let actor = self.require_role(Role::Borrower)?;
                let mut request = LoanRequest::new(amount, days, purpose);
                request.description = description.unwrap_or_default();
                request.interest_bps = interest_bps;
                self.engine
                    .create(&actor, LoanId::new("preview"), request.clone(), now)?;
                let created = self.backend.create_loan_request(request).await;
                let view = self.payload(created)?;
                self.out.show(&view, output::loan_detail)
            }
            LoanAction::Accept { id } => {
                let actor = self.actor()?;
                let id = LoanId::new(id);
                let mut loan = self.loan(&id).await?;
                self.engine.accept(&mut loan, &actor, now)?;
                let ack = self.backend.accept_request(&id).await;
                self.out.ack(&self.acked(ack)?, "request accepted")
            }
            LoanAction::Cancel { id } => {
                let actor = self.actor()?;
                let id = LoanId::new(id);
                let mut loan = self.loan(&id).await?;
                self.engine.cancel(&mut loan, &actor)?;
                let ack = self.backend.cancel_request(&id).await;
                self.out.ack(&self.acked(ack)?, "request cancelled")
            }
            LoanAction::Confirm { id } => {
                let actor = self.actor()?;
                let id = LoanId::new(id);
                let mut loan = self.loan(&id).await?;
                self.engine.confirm_receipt(&mut loan, &actor, now)?;
                let ack = self.backend.mark_fulfilled(&id).await;
                self.out.ack(&self.acked(ack)?, "receipt confirmed")
            }
            LoanAction::Repay {
                id,
                amount,
                method,
                reference,
                remarks,
            } => {
                let actor = self.actor()?;
                let id = LoanId::new(id);
                let mut input = RepaymentInput::new(amount, method);
                input.transaction_reference = reference;
                input.remarks = remarks;
                let mut loan = self.loan(&id).await?;
                self.engine
                    .record_repayment(&mut loan, &actor, input.clone(), now)?;
                let ack = self.backend.record_repayment(&id, input).await;
                self.out.ack(&self.acked(ack)?, "repayment recorded")
            }
            LoanAction::Rate { id, score, review } => {
                let actor = self.actor()?;
                let id = LoanId::new(id);
                let mut loan = self.loan(&id).await?;
                self.engine
                    .rate(&mut loan, &actor, score, review.clone(), now)?;
                let ack = self
                    .backend
                    .rate_loan(&id, RatingInput { rating: score, review })
                    .await;
                self.out.ack(&self.acked(ack)?, "rating submitted")
            }
        }
    }

    async fn notifications(&self, action: NotificationAction) -> anyhow::Result<()> {
        self.actor()?;
        match action {
            NotificationAction::List => {
                let result = self.backend.notifications().await;
                let list = self.payload(result)?;
                self.out
                    .lines(&list.notifications, "no notifications", output::notification)
            }
            NotificationAction::Read { id } => {
                let read = self
                    .backend
                    .mark_notification_read(&NotificationId::new(id))
                    .await;
                let ack = self.acked(read)?;
                self.out.ack(&ack, "marked as read")
            }
            NotificationAction::ReadAll => {
                let ack = self.acked(self.backend.mark_all_notifications_read().await)?;
                self.out.ack(&ack, "all marked as read")
            }
            NotificationAction::Delete { id } => {
                let deleted = self
                    .backend
                    .delete_notification(&NotificationId::new(id))
                    .await;
                let ack = self.acked(deleted)?;
                self.out.ack(&ack, "deleted")
            }
            NotificationAction::Watch => {
                let poller =
                    Poller::unread_notifications(self.backend.clone(), self.poll_interval);
                let mut rx = poller.subscribe();
                loop {
                    tokio::select! {
                        changed = rx.changed() => {
                            if changed.is_err() {
                                bail!("session expired");
                            }
                            let count = *rx.borrow_and_update();
                            if let Some(count) = count {
                                self.out.show(&count, |c, _| format!("{c} unread"))?;
                            }
                        }
                        _ = tokio::signal::ctrl_c() => return Ok(()),
                    }
                }
            }
        }
    }

    async fn reports(&self, action: ReportAction) -> anyhow::Result<()> {
        match action {
            ReportAction::File {
                user,
                kind,
                description,
                loan,
            } => {
                self.actor()?;
                let ack = self
                    .backend
                    .create_report(NewReport {
                        reported_user_id: UserId::new(user),
                        report_type: kind,
                        description,
                        loan_id: loan.map(LoanId::new),
                    })
                    .await;
                self.out.ack(&self.acked(ack)?, "report submitted")
            }
            ReportAction::Mine => {
                self.actor()?;
                let list = self.payload(self.backend.my_reports().await)?;
                self.out.lines(&list.reports, "no reports", output::report)
            }
        }
    }

    async fn disputes(&self, action: DisputeAction) -> anyhow::Result<()> {
        let actor = self.actor()?;
        match action {
            DisputeAction::Raise {
                loan,
                kind,
                description,
            } => {
                let id = LoanId::new(loan);
                let mut current = self.loan(&id).await?;
                self.engine.raise_dispute(&mut current, &actor)?;
                let ack = self
                    .backend
                    .create_dispute(NewDispute {
                        loan_id: id,
                        dispute_type: kind,
                        description,
                    })
                    .await;
                self.out.ack(&self.acked(ack)?, "dispute raised")
            }
            DisputeAction::Mine => {
                let list = self.payload(self.backend.my_disputes().await)?;
                self.out.lines(&list.disputes, "no disputes", output::dispute)
            }
            DisputeAction::Note { id, note } => {
                let ack = self
                    .backend
                    .add_dispute_note(&DisputeId::new(id), NoteInput { note })
                    .await;
                self.out.ack(&self.acked(ack)?, "note added")
            }
        }
    }

    async fn admin(&self, action: AdminAction) -> anyhow::Result<()> {
        self.require_role(Role::Admin)?;
        let backend = &self.backend;
        match action {
            AdminAction::Dashboard => {
                let dashboard = self.payload(backend.dashboard().await)?;
                self.out.show(&dashboard, |d, now| {
                    let mut text = output::stats(&d.stats, now);
                    for view in &d.recent_loans {
                        text.push('\n');
                        text.push_str(&output::loan_line(view, now));
                    }
                    text
                })
            }
            AdminAction::Users {
                pending,
                role,
                search,
            } => {
                let mut query = if pending {
                    UserQuery::pending_verification()
                } else {
                    UserQuery::default()
                };
                query.role = role;
                query.search = search;
                let list = self.payload(backend.users(query).await)?;
                self.out.lines(&list.users, "no users", output::admin_user)
            }
            AdminAction::User { id } => {
                let entry = self.payload(backend.user_details(&UserId::new(id)).await)?;
                self.out.show(&entry.user, output::user)
            }
            AdminAction::Block { id, reason } => {
                let request = BlockRequest {
                    block: true,
                    reason,
                };
                let ack = self.acked(backend.set_user_blocked(&UserId::new(id), request).await)?;
                self.out.ack(&ack, "user blocked")
            }
            AdminAction::Unblock { id } => {
                let request = BlockRequest {
                    block: false,
                    reason: None,
                };
                let ack = self.acked(backend.set_user_blocked(&UserId::new(id), request).await)?;
                self.out.ack(&ack, "user unblocked")
            }
            AdminAction::DeleteUser { id } => {
                let ack = self.acked(backend.delete_user(&UserId::new(id)).await)?;
                self.out.ack(&ack, "user deleted")
            }
            AdminAction::Review {
                user,
                identity,
                address,
                selfie,
            } => {
                let decisions = DocumentDecisions {
                    identity: Some(identity),
                    address: Some(address),
                    selfie: Some(selfie),
                };
                let outcome = decide(&decisions)?;
                let ack = self.acked(
                    backend
                        .submit_verification(&UserId::new(user), outcome)
                        .await,
                )?;
                self.out.ack(&ack, "verification decided")
            }
            AdminAction::Loans { status } => {
                let query = LoanQuery {
                    status,
                    ..LoanQuery::default()
                };
                let list = self.payload(backend.all_loans(query).await)?;
                self.out.lines(&list.loans, "no loans", output::loan_line)
            }
            AdminAction::Reports { status } => {
                let query = CaseQuery {
                    status,
                    ..CaseQuery::default()
                };
                let list = self.payload(backend.all_reports(query).await)?;
                self.out.lines(&list.reports, "no reports", output::report)
            }
            AdminAction::ResolveReport { id, status, note } => {
                let resolution = ReportResolution {
                    status,
                    admin_notes: note,
                };
                let ack = self.acked(
                    backend
                        .resolve_report(&ReportId::new(id), resolution)
                        .await,
                )?;
                self.out.ack(&ack, "report closed")
            }
            AdminAction::Disputes { status } => {
                let query = CaseQuery {
                    status,
                    ..CaseQuery::default()
                };
                let list = self.payload(backend.all_disputes(query).await)?;
                self.out.lines(&list.disputes, "no disputes", output::dispute)
            }
            AdminAction::ResolveDispute { id, status, note } => {
                let resolution = DisputeResolution {
                    status,
                    admin_note: note,
                };
                let ack = self.acked(
                    backend
                        .resolve_dispute(&DisputeId::new(id), resolution)
                        .await,
                )?;
                self.out.ack(&ack, "dispute closed")
            }
            AdminAction::Settings => {
                let settings = self.payload(backend.settings().await)?;
                self.out.show(&settings, output::settings)
            }
            AdminAction::Set { key, value } => {
                let mut preview = self.payload(backend.settings().await)?;
                let update = SettingUpdate { key, value };
                preview.apply(&update).map_err(anyhow::Error::msg)?;
                let ack = self.acked(backend.update_setting(update).await)?;
                self.out.ack(&ack, "setting updated")
            }
            AdminAction::Logs => {
                let list = self.payload(backend.activity_logs().await)?;
                self.out.lines(&list.logs, "no activity", output::activity)
            }
            AdminAction::Queues => {
                let verifications = self.payload(backend.pending_verifications_count().await)?.count;
                let reports = self.payload(backend.pending_reports_count().await)?.count;
                let disputes = self.payload(backend.pending_disputes_count().await)?.count;
                let queues = serde_json::json!({
                    "verifications": verifications,
                    "reports": reports,
                    "disputes": disputes,
                });
                self.out.show(&queues, |_, _| {
                    format!(
                        "verifications {verifications}, reports {reports}, disputes {disputes}"
                    )
                })
            }
        }
    }
}
