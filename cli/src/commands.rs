//! Command-line surface.

use crate::parse;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use udhaar_client::BackendMode;
use udhaar_lifecycle::{LoanStatus, PaymentMethod};
use udhaar_moderation::{CaseStatus, DisputeType, ReportType, Resolution};
use udhaar_types::{Amount, Role};
use udhaar_verification::Decision;

#[derive(Parser)]
#[command(name = "udhaar", about = "Udhaar peer-to-peer lending client", version)]
pub struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "UDHAAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend: "live", "demo", or "auto" (demo when signed in with demo login).
    #[arg(long, env = "UDHAAR_MODE")]
    pub mode: Option<BackendMode>,

    /// Base URL of the REST API.
    #[arg(long, env = "UDHAAR_API_URL")]
    pub api_url: Option<String>,

    /// File holding the stored session.
    #[arg(long, env = "UDHAAR_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "UDHAAR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "UDHAAR_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Print payloads as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "UDHAAR_PASSWORD")]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "UDHAAR_PASSWORD")]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
        /// "borrower" or "lender".
        #[arg(long, default_value = "borrower")]
        role: Role,
    },
    /// Sign in as a seeded demo account (no backend needed).
    DemoLogin {
        /// "admin", "lender" or "borrower".
        role: Role,
    },
    Logout,
    /// Show the signed-in user.
    Whoami {
        /// Re-fetch the profile first.
        #[arg(long)]
        refresh: bool,
    },
    /// Check where navigating to a path would lead.
    Access { path: String },
    /// Submit onboarding documents (or replace rejected ones).
    Onboard {
        #[arg(long)]
        identity: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        selfie: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Borrow, lend, repay and rate.
    Loans {
        #[command(subcommand)]
        action: LoanAction,
    },
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Report a user.
    Reports {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Dispute a loan.
    Disputes {
        #[command(subcommand)]
        action: DisputeAction,
    },
    /// Admin queues and platform settings.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
pub enum LoanAction {
    /// Your loans: borrowings, lendings, or everything for admins.
    List {
        #[arg(long, value_parser = parse::wire::<LoanStatus>)]
        status: Option<LoanStatus>,
    },
    /// Open requests from other borrowers.
    Pending,
    Show { id: String },
    /// Ask for a loan.
    Request {
        #[arg(long, value_parser = parse::amount)]
        amount: Amount,
        #[arg(long)]
        days: u32,
        #[arg(long)]
        purpose: String,
        #[arg(long)]
        description: Option<String>,
        /// Interest in basis points (200 = 2%).
        #[arg(long)]
        interest_bps: Option<u32>,
    },
    /// Fund a pending request.
    Accept { id: String },
    /// Withdraw your pending request.
    Cancel { id: String },
    /// Confirm the money arrived.
    Confirm { id: String },
    /// Record a repayment you received.
    Repay {
        id: String,
        #[arg(long, value_parser = parse::amount)]
        amount: Amount,
        #[arg(long, default_value = "upi", value_parser = parse::wire::<PaymentMethod>)]
        method: PaymentMethod,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Rate the other party of a completed loan.
    Rate {
        id: String,
        #[arg(long)]
        score: u8,
        #[arg(long)]
        review: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum NotificationAction {
    List,
    /// Mark one notification as read.
    Read { id: String },
    ReadAll,
    Delete { id: String },
    /// Print the unread count as it changes until interrupted.
    Watch,
}

#[derive(Subcommand)]
pub enum ReportAction {
    File {
        /// The user being reported.
        #[arg(long)]
        user: String,
        #[arg(long = "type", value_parser = parse::wire::<ReportType>)]
        kind: ReportType,
        #[arg(long)]
        description: String,
        #[arg(long)]
        loan: Option<String>,
    },
    Mine,
}

#[derive(Subcommand)]
pub enum DisputeAction {
    Raise {
        #[arg(long)]
        loan: String,
        #[arg(long = "type", value_parser = parse::wire::<DisputeType>)]
        kind: DisputeType,
        #[arg(long)]
        description: String,
    },
    Mine,
    /// Add a note to an open dispute.
    Note { id: String, note: String },
}

#[derive(Subcommand)]
pub enum AdminAction {
    Dashboard,
    Users {
        /// Only users waiting for verification review.
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        search: Option<String>,
    },
    User { id: String },
    Block {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Unblock { id: String },
    DeleteUser { id: String },
    /// Decide a verification: each document `approve` or `reject:<reason>`.
    Review {
        user: String,
        #[arg(long, value_parser = parse::decision)]
        identity: Decision,
        #[arg(long, value_parser = parse::decision)]
        address: Decision,
        #[arg(long, value_parser = parse::decision)]
        selfie: Decision,
    },
    Loans {
        #[arg(long, value_parser = parse::wire::<LoanStatus>)]
        status: Option<LoanStatus>,
    },
    Reports {
        #[arg(long, value_parser = parse::wire::<CaseStatus>)]
        status: Option<CaseStatus>,
    },
    ResolveReport {
        id: String,
        #[arg(long, default_value = "resolved", value_parser = parse::wire::<Resolution>)]
        status: Resolution,
        #[arg(long)]
        note: Option<String>,
    },
    Disputes {
        #[arg(long, value_parser = parse::wire::<CaseStatus>)]
        status: Option<CaseStatus>,
    },
    ResolveDispute {
        id: String,
        #[arg(long, default_value = "resolved", value_parser = parse::wire::<Resolution>)]
        status: Resolution,
        #[arg(long)]
        note: Option<String>,
    },
    Settings,
    /// Change one platform setting.
    Set { key: String, value: String },
    Logs,
    /// Counts waiting on an admin.
    Queues,
}
