//! These structs provide the CLI interface for the spendlog CLI.

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::view::SortKey;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// spendlog: a command-line client for a personal expense-tracking API.
///
/// Record expenses (title, amount, date, category), list and search them, edit or delete
/// entries, and view a monthly total plus a per-category breakdown. All data lives on the
/// server; this program holds only your configuration and your login session, in the
/// spendlog home directory.
///
/// Start with `spendlog init` to point the program at your server, then `spendlog register`
/// and `spendlog login`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    Init(InitArgs),
    /// Create an account on the expense server.
    Register(RegisterArgs),
    /// Sign in and save the session.
    Login(LoginArgs),
    /// Clear the saved session.
    Logout,
    /// List one page of expenses, optionally searched, date-bounded and re-sorted.
    List(ListArgs),
    /// Record a new expense.
    Add(AddArgs),
    /// Replace all fields of an existing expense.
    Edit(EditArgs),
    /// Delete an expense (asks for confirmation unless --yes is given).
    Delete(DeleteArgs),
    /// Show the month total and the per-category breakdown.
    Summary(SummaryArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where spendlog configuration and the saved session are held.
    /// Defaults to ~/.spendlog
    #[arg(long, env = "SPENDLOG_HOME", default_value_t = default_spendlog_home())]
    home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the expense API, e.g. http://127.0.0.1:5001/api
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Default number of records per page for the list command.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Optional display name.
    #[arg(long, default_value = "")]
    pub name: String,
}

#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// Case-insensitive substring to match against title or category.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Sort order for the fetched page.
    #[arg(long, value_enum, default_value_t = SortKey::default())]
    pub sort: SortKey,

    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Records per page; defaults to the configured page size.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Only include expenses on or after this date (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only include expenses on or before this date (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    /// The amount spent, e.g. 3.50
    #[arg(long)]
    pub amount: String,

    /// The date of the expense (YYYY-MM-DD).
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub category: String,
}

#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The id of the expense to replace.
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub amount: String,

    /// The date of the expense (YYYY-MM-DD).
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub category: String,
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the expense to delete.
    #[arg(long)]
    pub id: i64,

    /// Skip the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Year for the month total; must be given together with --month. Defaults to the
    /// current month.
    #[arg(long)]
    pub year: Option<i32>,

    /// Month (1-12) for the month total; must be given together with --year.
    #[arg(long)]
    pub month: Option<u32>,

    /// Lower date bound (YYYY-MM-DD) for the category breakdown.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Upper date bound (YYYY-MM-DD) for the category breakdown.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

fn default_spendlog_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".spendlog"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SPENDLOG_HOME instead of relying on the default \
                spendlog home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from(".spendlog")
        }
    })
}

/// A `PathBuf` wrapper that implements `Display`, so it can serve as a clap default.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
