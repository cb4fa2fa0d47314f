//! Request and response bodies exchanged with the lending backend.
//!
//! Everything here is plain serde data in the backend's camelCase wire form.
//! The fixture backend produces the same types, so callers cannot tell the
//! two apart.

use serde::{Deserialize, Serialize};
use udhaar_lifecycle::{Accrual, Loan, LoanPolicy, LoanStatus};
use udhaar_moderation::{CaseStatus, Dispute, Report, Resolution};
use udhaar_types::{
    AccountStatus, Amount, NotificationId, Role, Timestamp, User, UserId, VerificationStatus,
};
use udhaar_verification::SubmittedDocuments;

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ProfileUpdate {
    /// Copy the present fields onto `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(first) = &self.first_name {
            user.first_name = first.clone();
        }
        if let Some(last) = &self.last_name {
            user.last_name = last.clone();
        }
        if self.phone.is_some() {
            user.phone = self.phone.clone();
        }
        if self.city.is_some() {
            user.city = self.city.clone();
        }
        if self.state.is_some() {
            user.state = self.state.clone();
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub email: String,
}

/// An email or SMS one-time code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    pub code: String,
}

/// Profile details and document references submitted at the end of
/// onboarding (or when resubmitting rejected documents).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    pub documents: SubmittedDocuments,
}

// ── Users ───────────────────────────────────────────────────────────────────

/// The public face of a user attached to loans and cases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub trust_score: u8,
    #[serde(default)]
    pub repayment_score: u8,
    #[serde(default)]
    pub is_verified: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            trust_score: user.trust_score,
            repayment_score: user.repayment_score,
            is_verified: user.is_admin_verified(),
        }
    }
}

impl UserSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user as listed on the admin pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    pub status: AccountStatus,
}

impl From<User> for AdminUser {
    fn from(user: User) -> Self {
        let status = user.account_status();
        Self { user, status }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<AdminUser>,
    pub total: usize,
    #[serde(default = "one")]
    pub pages: u32,
    #[serde(default = "one")]
    pub page: u32,
}

fn one() -> u32 {
    1
}

// ── Loans ───────────────────────────────────────────────────────────────────

/// A loan with its parties' summaries attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    #[serde(rename = "borrower", default, skip_serializing_if = "Option::is_none")]
    pub borrower_profile: Option<UserSummary>,
    #[serde(rename = "lender", default, skip_serializing_if = "Option::is_none")]
    pub lender_profile: Option<UserSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanList {
    pub loans: Vec<LoanView>,
    pub total: usize,
    #[serde(default = "one")]
    pub total_pages: u32,
}

/// Pending requests as seen by lenders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestList {
    pub requests: Vec<LoanView>,
    pub total: usize,
    #[serde(default = "one")]
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingInput {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

// ── Reports / disputes ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportList {
    pub reports: Vec<Report>,
    pub total: usize,
    #[serde(default = "one")]
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeList {
    pub disputes: Vec<Dispute>,
    pub total: usize,
    #[serde(default = "one")]
    pub total_pages: u32,
}

/// How an admin closes a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResolution {
    pub status: Resolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

/// How an admin closes a dispute. A dismissal goes out as `closed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeResolution {
    #[serde(with = "dispute_status")]
    pub status: Resolution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

mod dispute_status {
    use serde::{Deserialize, Deserializer, Serializer};
    use udhaar_moderation::Resolution;

    pub fn serialize<S: Serializer>(status: &Resolution, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(match status {
            Resolution::Resolved => "resolved",
            Resolution::Dismissed => "closed",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Resolution, D::Error> {
        Resolution::deserialize(d)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub note: String,
}

// ── Notifications ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub total: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

// ── Admin ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_lenders: u64,
    pub total_borrowers: u64,
    pub new_users_this_month: u64,
    pub active_loans: u64,
    pub completed_loans: u64,
    pub defaulted_loans: u64,
    pub total_lent_amount: Amount,
    pub pending_reports: u64,
    pub open_disputes: u64,
    pub pending_verifications: u64,
    pub monthly_growth: f64,
    pub average_loan_amount: Amount,
    pub repayment_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: AdminStats,
    pub recent_loans: Vec<LoanView>,
    pub recent_users: Vec<AdminUser>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub action: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogList {
    pub logs: Vec<ActivityLog>,
    pub total: usize,
    #[serde(default = "one")]
    pub total_pages: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    pub block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One platform setting; the backend takes every value as a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingUpdate {
    pub key: String,
    pub value: String,
}

/// Platform-wide settings managed by admins. Rates are percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSettings {
    pub min_loan_amount: Amount,
    pub max_loan_amount: Amount,
    pub min_duration: u32,
    pub max_duration: u32,
    pub default_interest_rate: f64,
    pub max_interest_rate: f64,
    pub platform_fee: f64,
    pub min_trust_score: u8,
    pub min_repayment_score: u8,
    pub auto_approve_threshold: u8,
    pub max_active_loans_per_borrower: u32,
    pub max_active_loans_per_lender: u32,
    pub reminder_days_before: u32,
    pub overdue_grace_period: u32,
    pub maintenance_mode: bool,
}

impl PlatformSettings {
    /// Loan bounds implied by these settings.
    pub fn to_loan_policy(&self) -> LoanPolicy {
        LoanPolicy {
            min_amount: self.min_loan_amount,
            max_amount: self.max_loan_amount,
            min_duration_days: self.min_duration,
            max_duration_days: self.max_duration,
            default_interest_bps: percent_to_bps(self.default_interest_rate),
            max_interest_bps: percent_to_bps(self.max_interest_rate),
            overdue_grace_days: self.overdue_grace_period,
            interest_accrual: Accrual::default(),
        }
    }

    /// Apply one `{ key, value }` update, parsing `value` as the type the
    /// setting already has.
    pub fn apply(&mut self, update: &SettingUpdate) -> Result<(), String> {
        let mut json = serde_json::to_value(&*self).map_err(|e| e.to_string())?;
        let map = json
            .as_object_mut()
            .ok_or_else(|| "settings are not an object".to_string())?;
        let current = map
            .get(&update.key)
            .ok_or_else(|| format!("unknown setting `{}`", update.key))?;
        let raw = update.value.trim();
        let parsed = match current {
            serde_json::Value::Bool(_) => raw
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|_| format!("`{}` expects true or false", update.key))?,
            serde_json::Value::Number(_) => raw
                .parse::<serde_json::Number>()
                .map(serde_json::Value::Number)
                .map_err(|_| format!("`{}` expects a number", update.key))?,
            _ => serde_json::Value::String(raw.to_string()),
        };
        map.insert(update.key.clone(), parsed);
        *self = serde_json::from_value(json)
            .map_err(|e| format!("invalid value for `{}`: {e}", update.key))?;
        Ok(())
    }
}

fn percent_to_bps(percent: f64) -> u32 {
    (percent * 100.0).round().max(0.0) as u32
}

// ── Queries ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl LoanQuery {
    pub fn status(status: LoanStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.status.map_or(true, |s| s == loan.status)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_onboarding_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl UserQuery {
    /// Users waiting for a verification decision.
    pub fn pending_verification() -> Self {
        Self {
            verification_status: Some(VerificationStatus::Pending),
            ..Self::default()
        }
    }

    pub fn matches(&self, user: &AdminUser) -> bool {
        let u = &user.user;
        if self.role.is_some_and(|r| r != u.role) {
            return false;
        }
        if self.status.is_some_and(|s| s != user.status) {
            return false;
        }
        if self
            .verification_status
            .is_some_and(|v| v != u.verification_status())
        {
            return false;
        }
        if self
            .is_onboarding_complete
            .is_some_and(|c| c != u.is_onboarding_complete())
        {
            return false;
        }
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase) {
            let haystack = format!("{} {}", u.full_name(), u.email).to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl CaseQuery {
    pub fn matches(&self, status: CaseStatus) -> bool {
        self.status.map_or(true, |s| s == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PlatformSettings {
        serde_json::from_str(
            r#"{"minLoanAmount":500,"maxLoanAmount":100000,"minDuration":7,"maxDuration":90,
                "defaultInterestRate":2,"maxInterestRate":5,"platformFee":1,"minTrustScore":40,
                "minRepaymentScore":35,"autoApproveThreshold":80,"maxActiveLoansPerBorrower":3,
                "maxActiveLoansPerLender":10,"reminderDaysBefore":3,"overdueGracePeriod":5,
                "maintenanceMode":false}"#,
        )
        .unwrap()
    }

    #[test]
    fn settings_map_to_loan_policy() {
        let policy = settings().to_loan_policy();
        assert_eq!(policy.min_amount, Amount::new(500));
        assert_eq!(policy.default_interest_bps, 200);
        assert_eq!(policy.max_interest_bps, 500);
        assert_eq!(policy.overdue_grace_days, 5);
    }

    #[test]
    fn setting_update_parses_by_existing_type() {
        let mut s = settings();
        s.apply(&SettingUpdate {
            key: "maintenanceMode".into(),
            value: "true".into(),
        })
        .unwrap();
        s.apply(&SettingUpdate {
            key: "defaultInterestRate".into(),
            value: "2.5".into(),
        })
        .unwrap();
        assert!(s.maintenance_mode);
        assert_eq!(s.to_loan_policy().default_interest_bps, 250);
    }

    #[test]
    fn bad_setting_updates_leave_settings_alone() {
        let mut s = settings();
        let before = s.clone();
        assert!(s
            .apply(&SettingUpdate {
                key: "noSuchKey".into(),
                value: "1".into()
            })
            .is_err());
        assert!(s
            .apply(&SettingUpdate {
                key: "maxDuration".into(),
                value: "lots".into()
            })
            .is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn loan_view_flattens_loan() {
        let json = r#"{
            "id":"loan-pending-002","borrowerId":"borrower-002","amount":8000,"duration":15,
            "interestRate":2,"purpose":"Education","status":"pending","createdAt":1700000000,
            "borrower":{"id":"borrower-002","firstName":"Sneha","lastName":"Reddy","trustScore":82,
                        "repaymentScore":90,"isVerified":true}
        }"#;
        let view: LoanView = serde_json::from_str(json).unwrap();
        assert_eq!(view.loan.status, LoanStatus::Pending);
        assert_eq!(view.loan.interest_bps, 200);
        assert_eq!(
            view.borrower_profile.map(|b| b.full_name()).as_deref(),
            Some("Sneha Reddy")
        );
        assert_eq!(view.lender_profile, None);
    }

    #[test]
    fn user_query_filters() {
        let user = User::new("u1", Role::Lender, "priya@example.com", "Priya", "Sharma");
        let listed = AdminUser::from(user);
        assert!(UserQuery::default().matches(&listed));
        assert!(UserQuery {
            role: Some(Role::Lender),
            search: Some("PRIYA".into()),
            ..UserQuery::default()
        }
        .matches(&listed));
        assert!(!UserQuery::pending_verification().matches(&listed));
    }
}
