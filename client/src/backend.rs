//! The interface every lending backend implements.

use crate::api::*;
use crate::envelope::{Ack, Envelope};
use crate::error::ClientError;
use async_trait::async_trait;
use std::fmt;
use udhaar_lifecycle::{LoanRequest, RepaymentInput};
use udhaar_moderation::{NewDispute, NewReport};
use udhaar_types::{DisputeId, LoanId, NotificationId, RejectedDocument, ReportId, User, UserId};
use udhaar_verification::VerificationOutcome;

pub type ApiResult<T> = Result<Envelope<T>, ClientError>;
pub type AckResult = Result<Ack, ClientError>;

/// Which kind of backend is answering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Live,
    Demo,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Demo => "demo",
        })
    }
}

/// The lending platform's API.
///
/// Implemented by [`HttpBackend`](crate::HttpBackend) against the REST
/// server and by [`FixtureBackend`](crate::FixtureBackend) for demo mode.
/// Both return the same envelope shapes.
#[async_trait]
pub trait LendingBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    // Auth
    async fn register(&self, request: RegisterRequest) -> ApiResult<AuthPayload>;
    async fn login(&self, request: LoginRequest) -> ApiResult<AuthPayload>;
    async fn profile(&self) -> ApiResult<User>;
    async fn update_profile(&self, update: ProfileUpdate) -> AckResult;
    async fn change_password(&self, change: PasswordChange) -> AckResult;
    async fn reset_password(&self, reset: PasswordReset) -> AckResult;
    async fn complete_onboarding(&self, submission: OnboardingSubmission) -> AckResult;
    async fn send_email_verification(&self) -> AckResult;
    async fn verify_email(&self, code: VerificationCode) -> AckResult;
    async fn send_phone_verification(&self) -> AckResult;
    async fn verify_phone(&self, code: VerificationCode) -> AckResult;

    // Loans
    async fn create_loan_request(&self, request: LoanRequest) -> ApiResult<LoanView>;
    async fn my_borrowings(&self, query: LoanQuery) -> ApiResult<LoanList>;
    /// The borrower confirms the funds arrived.
    async fn mark_fulfilled(&self, loan: &LoanId) -> AckResult;
    async fn cancel_request(&self, loan: &LoanId) -> AckResult;
    async fn pending_requests(&self, query: LoanQuery) -> ApiResult<RequestList>;
    async fn my_lending(&self, query: LoanQuery) -> ApiResult<LoanList>;
    async fn accept_request(&self, loan: &LoanId) -> AckResult;
    async fn record_repayment(&self, loan: &LoanId, input: RepaymentInput) -> AckResult;
    async fn loan_details(&self, loan: &LoanId) -> ApiResult<LoanView>;
    async fn rate_loan(&self, loan: &LoanId, rating: RatingInput) -> AckResult;

    // Reports
    async fn create_report(&self, report: NewReport) -> AckResult;
    async fn my_reports(&self) -> ApiResult<ReportList>;
    async fn all_reports(&self, query: CaseQuery) -> ApiResult<ReportList>;
    async fn resolve_report(&self, report: &ReportId, resolution: ReportResolution) -> AckResult;

    // Disputes
    async fn create_dispute(&self, dispute: NewDispute) -> AckResult;
    async fn my_disputes(&self) -> ApiResult<DisputeList>;
    async fn add_dispute_note(&self, dispute: &DisputeId, note: NoteInput) -> AckResult;
    async fn all_disputes(&self, query: CaseQuery) -> ApiResult<DisputeList>;
    async fn resolve_dispute(
        &self,
        dispute: &DisputeId,
        resolution: DisputeResolution,
    ) -> AckResult;

    // Notifications
    async fn notifications(&self) -> ApiResult<NotificationList>;
    async fn unread_count(&self) -> ApiResult<Count>;
    async fn mark_notification_read(&self, notification: &NotificationId) -> AckResult;
    async fn mark_all_notifications_read(&self) -> AckResult;
    async fn delete_notification(&self, notification: &NotificationId) -> AckResult;

    // Admin
    async fn dashboard(&self) -> ApiResult<Dashboard>;
    async fn users(&self, query: UserQuery) -> ApiResult<UserList>;
    async fn user_details(&self, user: &UserId) -> ApiResult<AdminUser>;
    async fn set_user_blocked(&self, user: &UserId, request: BlockRequest) -> AckResult;
    async fn delete_user(&self, user: &UserId) -> AckResult;
    async fn approve_verification(&self, user: &UserId) -> AckResult;
    async fn reject_verification(&self, user: &UserId, reason: String) -> AckResult;
    async fn partially_reject_verification(
        &self,
        user: &UserId,
        rejections: Vec<RejectedDocument>,
    ) -> AckResult;
    async fn all_loans(&self, query: LoanQuery) -> ApiResult<LoanList>;
    async fn settings(&self) -> ApiResult<PlatformSettings>;
    async fn update_setting(&self, update: SettingUpdate) -> AckResult;
    async fn activity_logs(&self) -> ApiResult<ActivityLogList>;
    async fn pending_verifications_count(&self) -> ApiResult<Count>;
    async fn pending_reports_count(&self) -> ApiResult<Count>;
    async fn pending_disputes_count(&self) -> ApiResult<Count>;

    /// Send an admin's review outcome to the matching endpoint.
    async fn submit_verification(
        &self,
        user: &UserId,
        outcome: VerificationOutcome,
    ) -> AckResult {
        let reason = outcome.combined_reason();
        match outcome {
            VerificationOutcome::FullApproval => self.approve_verification(user).await,
            VerificationOutcome::FullRejection(_) => {
                self.reject_verification(user, reason.unwrap_or_default())
                    .await
            }
            VerificationOutcome::PartialRejection(rejections) => {
                self.partially_reject_verification(user, rejections).await
            }
        }
    }
}
