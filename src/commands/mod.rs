//! Command handlers for the spendlog CLI.
//!
//! This module contains implementations for all CLI subcommands. Each handler loads what it
//! needs (config, session), talks to the expense store, and returns an [`Out`] with a
//! printable message and optional structured data.

mod add;
mod auth;
mod delete;
mod edit;
mod init;
mod list;
mod summary;

use crate::error::is_auth_error;
use crate::model::Expense;
use crate::{Config, Result, Session};
use anyhow::anyhow;
use format_num::NumberFormat;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::{debug, warn};

pub use add::add;
pub use auth::{login, logout, register};
pub use delete::delete;
pub use edit::edit;
pub use init::init;
pub use list::list;
pub use summary::summary;

/// The output type for a command: a message that can be printed to the user plus, optionally,
/// structured data describing the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the saved session or fails with a pointer at the login command. Auth is mandatory
/// for every data command; there is no unauthenticated browsing.
pub(crate) async fn require_session(config: &Config) -> Result<Session> {
    Session::load(config)
        .await?
        .ok_or_else(|| anyhow!("You are not logged in. Run 'spendlog login' first"))
}

/// A 401 means the saved session is no longer valid; clear it so the next command prompts a
/// fresh login instead of retrying a dead token.
pub(crate) async fn drop_session_if_unauthorized<T>(
    config: &Config,
    result: Result<T>,
) -> Result<T> {
    if let Err(e) = &result {
        if is_auth_error(e) {
            if let Err(clear_error) = Session::clear(config).await {
                warn!("Failed to clear the invalid session: {clear_error:#}");
            } else {
                debug!("Cleared the saved session after a 401");
            }
        }
    }
    result
}

/// Formats a raw amount string for display: thousands separators and two decimals when it
/// parses, the raw text untouched when it does not.
pub(crate) fn format_amount(raw: &str) -> String {
    let Ok(amount) = crate::model::Amount::from_str(raw) else {
        return raw.to_string();
    };
    match amount.value().to_f64() {
        Some(value) => NumberFormat::new().format(",.2f", value),
        None => raw.to_string(),
    }
}

/// Renders expenses as an aligned text table.
pub(crate) fn render_expense_table(rows: &[Expense]) -> String {
    let headers = ["ID", "Date", "Title", "Category", "Amount"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|e| {
            [
                e.id.to_string(),
                e.date.clone(),
                e.title.clone(),
                e.category.clone(),
                format_amount(&e.amount),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for (i, header) in headers.iter().enumerate() {
        out.push_str(&format!("{:<width$}  ", header, width = widths[i]));
    }
    out.push('\n');
    for row in &cells {
        out.push('\n');
        for (i, cell) in row.iter().enumerate() {
            // Amounts read better right-aligned.
            if i == 4 {
                out.push_str(&format!("{:>width$}  ", cell, width = widths[i]));
            } else {
                out.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DateRange, Mode};
    use crate::model::NewExpense;
    use crate::test::TestEnv;
    use crate::view::ListState;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1234.5"), "1,234.50");
        assert_eq!(format_amount("3.50"), "3.50");
        assert_eq!(format_amount("abc"), "abc");
    }

    #[tokio::test]
    async fn test_commands_end_to_end_in_test_mode() {
        let env = TestEnv::new().await;
        let config = env.config();

        // Not logged in yet: data commands refuse locally, the summary is unavailable.
        assert!(list(config.clone(), Mode::Test, ListState::default())
            .await
            .is_err());
        let unavailable = summary(
            config.clone(),
            Mode::Test,
            Some(2024),
            Some(1),
            DateRange::default(),
        )
        .await
        .unwrap();
        assert!(unavailable.message().contains("unavailable"));

        // Log in against the seeded test store.
        let out = login(
            config.clone(),
            Mode::Test,
            crate::api::test_store::SEED_USER_EMAIL,
            crate::api::test_store::SEED_USER_PASSWORD,
        )
        .await
        .unwrap();
        assert!(out.message().contains("Logged in"));

        // Add, list, delete.
        let added = add(
            config.clone(),
            Mode::Test,
            NewExpense::new("Cinema", "12.00", "2024-02-01", "Fun"),
        )
        .await
        .unwrap();
        let created_id = added.structure().unwrap().id;

        let listed = list(
            config.clone(),
            Mode::Test,
            ListState {
                search: "cinema".to_string(),
                ..ListState::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(listed.structure().unwrap().len(), 1);

        let deleted = delete(config.clone(), Mode::Test, created_id, true).await.unwrap();
        assert!(deleted.message().contains("Deleted"));

        // Summary is now available and carries the seeded categories.
        let ready = summary(
            config.clone(),
            Mode::Test,
            Some(2024),
            Some(1),
            DateRange::default(),
        )
        .await
        .unwrap();
        assert!(ready.message().contains("Food"));

        logout(config.clone()).await.unwrap();
        assert!(list(config, Mode::Test, ListState::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_without_confirmation_is_a_no_op() {
        let env = TestEnv::new().await;
        let config = env.config();
        login(
            config.clone(),
            Mode::Test,
            crate::api::test_store::SEED_USER_EMAIL,
            crate::api::test_store::SEED_USER_PASSWORD,
        )
        .await
        .unwrap();

        let out = delete(config.clone(), Mode::Test, 1, false).await.unwrap();
        assert!(out.message().contains("Not deleting"));

        let listed = list(config, Mode::Test, ListState::default()).await.unwrap();
        assert!(listed.structure().unwrap().iter().any(|e| e.id == 1));
    }
}
