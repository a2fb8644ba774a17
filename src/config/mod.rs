pub mod cli;
pub mod settings;
pub mod toml_config;

use crate::domain::model::{Role, TimeLogStatus};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use settings::ClientSettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "timeclock")]
#[command(about = "Check in, check out and manage time logs from the terminal")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "API base URL (overrides TIMECLOCK_API_URL)")]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Where access/refresh tokens are kept")]
    pub token_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account, optionally redeeming an invitation code
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        invitation_code: Option<String>,
    },
    /// End the session and forget stored tokens
    Logout,
    /// Show the signed-in user's profile
    Whoami,
    /// Update the signed-in user's profile
    Profile(ProfileArgs),
    /// Upload a profile photo
    UploadPhoto { path: PathBuf },
    /// Start a work session
    CheckIn(ClockArgs),
    /// Finish the active work session
    CheckOut(ClockArgs),
    /// Show the active work session, if any
    Status,
    /// List time logs
    Logs {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        status: Option<TimeLogStatus>,
        #[arg(long, help = "Print per-day totals instead of raw logs")]
        summary: bool,
    },
    /// Fetch the hours report for a period
    Report {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Record a manual time log for an employee (requires approval)
    Manual {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        check_in: DateTime<Utc>,
        #[arg(long)]
        check_out: DateTime<Utc>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List manual time logs awaiting approval
    Pending,
    /// Approve a manual time log
    Approve { id: i64 },
    /// Reject a manual time log
    Reject {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Manage users
    #[command(subcommand)]
    Users(UserCommand),
    /// Manage invitations
    #[command(subcommand)]
    Invitations(InvitationCommand),
    /// Manage the company profile
    #[command(subcommand)]
    Company(CompanyCommand),
}

#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, requires = "confirm_password")]
    pub password: Option<String>,
    #[arg(long)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ClockArgs {
    #[arg(long, help = "Photo taken at the moment of clocking")]
    pub photo: Option<PathBuf>,
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[arg(long, help = "First day (YYYY-MM-DD)")]
    pub from: Option<NaiveDate>,
    #[arg(long, help = "Last day (YYYY-MM-DD)")]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum UserCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum InvitationCommand {
    List,
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "employee")]
        role: Role,
    },
    Delete {
        id: i64,
    },
    Validate {
        code: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CompanyCommand {
    Show,
    Create(CompanyArgs),
    Update(CompanyArgs),
    Delete,
}

#[derive(Debug, Clone, Args)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}
