//! The expense record as it travels over the wire, plus the payload for create/update.

use crate::error::ApiError;
use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// One expense as returned by the server.
///
/// `amount` and `date` are kept as text because that is what the server sends (the amount may
/// also arrive as a JSON number, which is normalized to text on deserialization). The parsed
/// forms are produced on demand and are `Option`s: a record that fails to parse must still
/// flow through filtering, sorting and display without failing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
}

impl Expense {
    /// The amount as a decimal, if it parses.
    pub fn parsed_amount(&self) -> Option<Amount> {
        Amount::from_str(&self.amount).ok()
    }

    /// The date as a calendar date, if it is well-formed `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Accepts either a JSON string or a JSON number and yields text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// The full field set sent to the server on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: String,
    pub date: String,
    pub category: String,
}

impl NewExpense {
    pub fn new(
        title: impl Into<String>,
        amount: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            date: date.into(),
            category: category.into(),
        }
    }

    /// Required-field validation, run before any network call is attempted. All four fields
    /// must be non-empty after trimming. Reports every problem, not just the first.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        for (name, value) in [
            ("title", &self.title),
            ("amount", &self.amount),
            ("date", &self.date),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{name} cannot be empty"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(problems))
        }
    }
}
