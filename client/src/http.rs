//! HTTP client for the lending platform's REST API.

use crate::api::*;
use crate::backend::{AckResult, ApiResult, BackendKind, LendingBackend};
use crate::envelope::Ack;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use udhaar_lifecycle::{LoanRequest, RepaymentInput};
use udhaar_moderation::{NewDispute, NewReport};
use udhaar_storage::{clear_session, ClientStorage, TOKEN_KEY};
use udhaar_types::{DisputeId, LoanId, NotificationId, RejectedDocument, ReportId, User, UserId};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shown when login cannot reach the backend at all.
pub const BACKEND_OFFLINE: &str =
    "Backend is offline. Please use demo login to explore the platform.";

/// Talks to the real backend.
///
/// Every request carries the stored bearer token. A `401` on an
/// authenticated request clears both session keys and surfaces as
/// [`ClientError::AuthExpired`]; nothing is retried.
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn ClientStorage>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn ClientStorage>) -> Self {
        Self::with_timeout(base_url, storage, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        storage: Arc<dyn ClientStorage>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        configure: impl FnOnce(RequestBuilder) -> RequestBuilder + Send,
    ) -> ApiResult<T> {
        let mut builder = self.http_client.request(method.clone(), self.url(path));
        let token = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let authenticated = token.is_some();
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = configure(builder).send().await.map_err(map_send_error)?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "api call");

        if status == StatusCode::UNAUTHORIZED && authenticated {
            if let Err(e) = clear_session(self.storage.as_ref()) {
                tracing::warn!("failed to clear expired session: {e}");
            }
            tracing::warn!(path, "session rejected by backend, stored credentials cleared");
            return Err(ClientError::AuthExpired);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Ack>(&body)
                .ok()
                .and_then(|ack| ack.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("{path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.call(Method::GET, path, |b| b).await
    }

    async fn get_with<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + Sync,
    {
        self.call(Method::GET, path, |b| b.query(query)).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        self.call(method, path, |b| b.json(body)).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> AckResult {
        self.send_json(Method::POST, path, body).await
    }

    async fn post_empty(&self, path: &str) -> AckResult {
        self.call(Method::POST, path, |b| b).await
    }

    async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> AckResult {
        self.send_json(Method::PUT, path, body).await
    }

    async fn put_empty(&self, path: &str) -> AckResult {
        self.call(Method::PUT, path, |b| b).await
    }

    async fn delete(&self, path: &str) -> AckResult {
        self.call(Method::DELETE, path, |b| b).await
    }
}

fn map_send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Network(format!("request timed out: {e}"))
    } else if e.is_connect() {
        ClientError::Network(format!("connection failed: {e}"))
    } else if e.is_builder() {
        ClientError::Config(format!("invalid request: {e}"))
    } else {
        ClientError::Network(e.to_string())
    }
}

#[derive(Serialize)]
struct ApproveBody {
    approve: bool,
}

#[derive(Serialize)]
struct RejectBody {
    reason: String,
}

#[derive(Serialize)]
struct PartialRejectBody {
    rejections: Vec<RejectedDocument>,
}

#[async_trait]
impl LendingBackend for HttpBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    async fn register(&self, request: RegisterRequest) -> ApiResult<AuthPayload> {
        self.send_json(Method::POST, "/auth/register", &request).await
    }

    async fn login(&self, request: LoginRequest) -> ApiResult<AuthPayload> {
        self.send_json(Method::POST, "/auth/login", &request)
            .await
            .map_err(|e| match e {
                ClientError::Network(_) => ClientError::Network(BACKEND_OFFLINE.into()),
                other => other,
            })
    }

    async fn profile(&self) -> ApiResult<User> {
        self.get("/auth/profile").await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> AckResult {
        self.put("/auth/profile", &update).await
    }

    async fn change_password(&self, change: PasswordChange) -> AckResult {
        self.post("/auth/change-password", &change).await
    }

    async fn reset_password(&self, reset: PasswordReset) -> AckResult {
        self.post("/auth/reset-password", &reset).await
    }

    async fn complete_onboarding(&self, submission: OnboardingSubmission) -> AckResult {
        self.post("/auth/onboarding", &submission).await
    }

    async fn send_email_verification(&self) -> AckResult {
        self.post_empty("/auth/send-email-verification").await
    }

    async fn verify_email(&self, code: VerificationCode) -> AckResult {
        self.post("/auth/verify-email", &code).await
    }

    async fn send_phone_verification(&self) -> AckResult {
        self.post_empty("/auth/send-phone-verification").await
    }

    async fn verify_phone(&self, code: VerificationCode) -> AckResult {
        self.post("/auth/verify-phone", &code).await
    }

    async fn create_loan_request(&self, request: LoanRequest) -> ApiResult<LoanView> {
        self.send_json(Method::POST, "/loans/request", &request)
            .await
    }

    async fn my_borrowings(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.get_with("/loans/my-requests", &query).await
    }

    async fn mark_fulfilled(&self, loan: &LoanId) -> AckResult {
        self.post_empty(&format!("/loans/{loan}/fulfill")).await
    }

    async fn cancel_request(&self, loan: &LoanId) -> AckResult {
        self.post_empty(&format!("/loans/{loan}/cancel")).await
    }

    async fn pending_requests(&self, query: LoanQuery) -> ApiResult<RequestList> {
        self.get_with("/loans/pending", &query).await
    }

    async fn my_lending(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.get_with("/loans/my-lending", &query).await
    }

    async fn accept_request(&self, loan: &LoanId) -> AckResult {
        self.post_empty(&format!("/loans/{loan}/accept")).await
    }

    async fn record_repayment(&self, loan: &LoanId, input: RepaymentInput) -> AckResult {
        self.post(&format!("/loans/{loan}/repayment"), &input).await
    }

    async fn loan_details(&self, loan: &LoanId) -> ApiResult<LoanView> {
        self.get(&format!("/loans/{loan}")).await
    }

    async fn rate_loan(&self, loan: &LoanId, rating: RatingInput) -> AckResult {
        self.post(&format!("/loans/{loan}/rate"), &rating).await
    }

    async fn create_report(&self, report: NewReport) -> AckResult {
        self.post("/reports", &report).await
    }

    async fn my_reports(&self) -> ApiResult<ReportList> {
        self.get("/reports/my-reports").await
    }

    async fn all_reports(&self, query: CaseQuery) -> ApiResult<ReportList> {
        self.get_with("/admin/reports", &query).await
    }

    async fn resolve_report(&self, report: &ReportId, resolution: ReportResolution) -> AckResult {
        self.put(&format!("/admin/reports/{report}"), &resolution)
            .await
    }

    async fn create_dispute(&self, dispute: NewDispute) -> AckResult {
        self.post("/disputes", &dispute).await
    }

    async fn my_disputes(&self) -> ApiResult<DisputeList> {
        self.get("/disputes/my-disputes").await
    }

    async fn add_dispute_note(&self, dispute: &DisputeId, note: NoteInput) -> AckResult {
        self.post(&format!("/disputes/{dispute}/note"), &note).await
    }

    async fn all_disputes(&self, query: CaseQuery) -> ApiResult<DisputeList> {
        self.get_with("/admin/disputes", &query).await
    }

    async fn resolve_dispute(
        &self,
        dispute: &DisputeId,
        resolution: DisputeResolution,
    ) -> AckResult {
        self.put(&format!("/admin/disputes/{dispute}"), &resolution)
            .await
    }

    async fn notifications(&self) -> ApiResult<NotificationList> {
        self.get("/notifications").await
    }

    async fn unread_count(&self) -> ApiResult<Count> {
        self.get("/notifications/unread-count").await
    }

    async fn mark_notification_read(&self, notification: &NotificationId) -> AckResult {
        self.put_empty(&format!("/notifications/{notification}/read"))
            .await
    }

    async fn mark_all_notifications_read(&self) -> AckResult {
        self.put_empty("/notifications/read-all").await
    }

    async fn delete_notification(&self, notification: &NotificationId) -> AckResult {
        self.delete(&format!("/notifications/{notification}")).await
    }

    async fn dashboard(&self) -> ApiResult<Dashboard> {
        self.get("/admin/dashboard").await
    }

    async fn users(&self, query: UserQuery) -> ApiResult<UserList> {
        self.get_with("/admin/users", &query).await
    }

    async fn user_details(&self, user: &UserId) -> ApiResult<AdminUser> {
        self.get(&format!("/admin/users/{user}")).await
    }

    async fn set_user_blocked(&self, user: &UserId, request: BlockRequest) -> AckResult {
        self.put(&format!("/admin/users/{user}/block"), &request)
            .await
    }

    async fn delete_user(&self, user: &UserId) -> AckResult {
        self.delete(&format!("/admin/users/{user}")).await
    }

    async fn approve_verification(&self, user: &UserId) -> AckResult {
        self.put(
            &format!("/admin/users/{user}/verify"),
            &ApproveBody { approve: true },
        )
        .await
    }

    async fn reject_verification(&self, user: &UserId, reason: String) -> AckResult {
        self.put(&format!("/admin/users/{user}/reject"), &RejectBody { reason })
            .await
    }

    async fn partially_reject_verification(
        &self,
        user: &UserId,
        rejections: Vec<RejectedDocument>,
    ) -> AckResult {
        self.put(
            &format!("/admin/users/{user}/partial-reject"),
            &PartialRejectBody { rejections },
        )
        .await
    }

    async fn all_loans(&self, query: LoanQuery) -> ApiResult<LoanList> {
        self.get_with("/admin/loans", &query).await
    }

    async fn settings(&self) -> ApiResult<PlatformSettings> {
        self.get("/admin/settings").await
    }

    async fn update_setting(&self, update: SettingUpdate) -> AckResult {
        self.put("/admin/settings", &update).await
    }

    async fn activity_logs(&self) -> ApiResult<ActivityLogList> {
        self.get("/admin/activity-logs").await
    }

    async fn pending_verifications_count(&self) -> ApiResult<Count> {
        self.get("/admin/verifications/pending-count").await
    }

    async fn pending_reports_count(&self) -> ApiResult<Count> {
        self.get("/admin/reports/pending-count").await
    }

    async fn pending_disputes_count(&self) -> ApiResult<Count> {
        self.get("/admin/disputes/pending-count").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use udhaar_moderation::Resolution;
    use udhaar_nullables::NullStorage;
    use udhaar_storage::USER_KEY;
    use udhaar_types::Role;

    /// Serve exactly one canned response; the join handle yields the raw
    /// request that was received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (url, handle)
    }

    /// Headers received, plus as many body bytes as `content-length` names.
    fn request_complete(request: &[u8]) -> bool {
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    fn request_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn signed_in_storage() -> Arc<NullStorage> {
        let user = User::new("u1", Role::Borrower, "amit@example.com", "Amit", "Patel");
        Arc::new(
            NullStorage::new()
                .with(TOKEN_KEY, "abc123")
                .with(USER_KEY, &serde_json::to_string(&user).unwrap()),
        )
    }

    #[test]
    fn url_joins_base_and_path() {
        let backend = HttpBackend::new("http://localhost:5000/api/", Arc::new(NullStorage::new()));
        assert_eq!(backend.base_url(), "http://localhost:5000/api");
        assert_eq!(
            backend.url("/loans/pending"),
            "http://localhost:5000/api/loans/pending"
        );
        assert_eq!(backend.kind(), BackendKind::Live);
    }

    #[tokio::test]
    async fn sends_bearer_token_and_parses_envelope() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"success":true,"data":{"count":3}}"#,
        )
        .await;
        let backend = HttpBackend::new(url, signed_in_storage());

        let count = backend.unread_count().await.unwrap().into_data().unwrap();
        assert_eq!(count.count, 3);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/notifications/unread-count"));
        assert!(request.contains("authorization: bearer abc123"));
    }

    #[tokio::test]
    async fn unauthorized_clears_stored_session() {
        let (url, server) = serve_once(
            "401 Unauthorized",
            r#"{"success":false,"message":"Token expired"}"#,
        )
        .await;
        let storage = signed_in_storage();
        let backend = HttpBackend::new(url, storage.clone());

        let err = backend.profile().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthExpired));
        assert!(storage.keys().is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unauthenticated_401_is_an_api_error() {
        let (url, server) = serve_once(
            "401 Unauthorized",
            r#"{"success":false,"message":"Invalid credentials"}"#,
        )
        .await;
        let backend = HttpBackend::new(url, Arc::new(NullStorage::new()));

        let err = backend
            .login(LoginRequest {
                email: "a@b.c".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_carries_backend_message() {
        let (url, server) = serve_once(
            "400 Bad Request",
            r#"{"success":false,"message":"Amount below minimum"}"#,
        )
        .await;
        let backend = HttpBackend::new(url, signed_in_storage());

        let err = backend
            .accept_request(&LoanId::new("loan-pending-001"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Api { status: 400, ref message } if message == "Amount below minimum")
        );
        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /api/loans/loan-pending-001/accept"));
    }

    #[tokio::test]
    async fn report_resolution_sends_admin_notes() {
        let (url, server) = serve_once("200 OK", r#"{"success":true,"message":"ok"}"#).await;
        let backend = HttpBackend::new(url, signed_in_storage());

        backend
            .resolve_report(
                &ReportId::new("report-001"),
                ReportResolution {
                    status: Resolution::Dismissed,
                    admin_notes: Some("No evidence".into()),
                },
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("put /api/admin/reports/report-001"));
        assert_eq!(
            request_body(&request),
            serde_json::json!({ "status": "dismissed", "adminNotes": "No evidence" })
        );
    }

    #[tokio::test]
    async fn dispute_dismissal_is_sent_as_closed() {
        let (url, server) = serve_once("200 OK", r#"{"success":true,"message":"ok"}"#).await;
        let backend = HttpBackend::new(url, signed_in_storage());

        backend
            .resolve_dispute(
                &DisputeId::new("dispute-001"),
                DisputeResolution {
                    status: Resolution::Dismissed,
                    admin_note: Some("Terms were clear".into()),
                },
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("put /api/admin/disputes/dispute-001"));
        assert_eq!(
            request_body(&request),
            serde_json::json!({ "status": "closed", "adminNote": "Terms were clear" })
        );
    }

    #[tokio::test]
    async fn login_while_offline_suggests_demo() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::with_timeout(
            format!("http://{addr}/api"),
            Arc::new(NullStorage::new()),
            Duration::from_secs(2),
        );
        let err = backend
            .login(LoginRequest {
                email: "a@b.c".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.to_string(), format!("backend unreachable: {BACKEND_OFFLINE}"));
    }
}
