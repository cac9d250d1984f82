//! The Remote Expense Store boundary.
//!
//! Everything the client knows about persistence lives behind the [`ExpenseStore`] trait: the
//! real implementation talks HTTP to the expense API, and a seeded in-memory implementation is
//! compiled into the production binary so the whole program can run top-to-bottom without a
//! server (select it with `SPENDLOG_IN_TEST_MODE`).

mod http;
pub(crate) mod test_store;

use crate::model::{CategoryTotal, Expense, MonthSummary, NewExpense};
use crate::session::{Session, User};
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) use test_store::TestStore;

/// Request parameters for `GET /expenses`. Date-range filtering and paging belong to the
/// server; the client never re-paginates the page it gets back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRequest {
    /// 1-based page number.
    pub page: u32,
    /// Records per page. The server clamps this to 1..=100.
    pub page_size: u32,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
}

/// Optional date range for the category summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// The set of operations the expense API provides. CRUD on expense records, the two server
/// aggregates, and the auth endpoints.
#[async_trait::async_trait]
pub trait ExpenseStore {
    /// Fetches one page of expenses. A non-array response is coerced to an empty page.
    async fn list(&mut self, request: &ListRequest) -> Result<Vec<Expense>>;

    /// Creates an expense and returns the server's representation of it (with its new id).
    async fn create(&mut self, payload: &NewExpense) -> Result<Expense>;

    /// Replaces all four fields of an existing expense.
    async fn update(&mut self, id: i64, payload: &NewExpense) -> Result<Expense>;

    /// Deletes an expense by id.
    async fn delete(&mut self, id: i64) -> Result<()>;

    /// Total spent in the given month. A missing `total` field comes back as `"0"`.
    async fn month_summary(&mut self, year: i32, month: u32) -> Result<MonthSummary>;

    /// Per-category totals over an optional date range. A non-array response is coerced to
    /// an empty collection.
    async fn category_summary(&mut self, range: &DateRange) -> Result<Vec<CategoryTotal>>;

    /// Exchanges credentials for a bearer token and the user's identity.
    async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse>;

    /// Creates an account and returns the created-user representation.
    async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User>;
}

/// Selects which `ExpenseStore` implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Talk to the configured expense API over HTTP.
    #[default]
    Remote,
    /// Use the seeded in-memory store; no network access at all.
    Test,
}

impl Mode {
    /// When SPENDLOG_IN_TEST_MODE is set and non-zero in length the mode is `Test`, otherwise
    /// `Remote`.
    pub fn from_env() -> Self {
        match std::env::var("SPENDLOG_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Remote,
        }
    }
}

/// Constructs the store for the given mode. The session, when present, supplies the bearer
/// token attached to authenticated requests.
pub(crate) fn store(
    config: &Config,
    session: Option<&Session>,
    mode: Mode,
) -> Result<Box<dyn ExpenseStore + Send>> {
    Ok(match mode {
        Mode::Remote => Box::new(http::HttpStore::new(config, session)?),
        Mode::Test => Box::new(TestStore::attach(config.store_key())),
    })
}
