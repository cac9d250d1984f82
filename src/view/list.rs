//! The list view-model: a pure projection from a fetched page of expenses plus the user's
//! filter/sort state to the sequence of rows to display.
//!
//! Pagination and date-range filtering are the server's job (it returns at most one page, in
//! its own default order); this module only searches and sorts the page already in hand. The
//! projection is deterministic and has no side effects, which is what makes it testable apart
//! from the network.

use crate::model::Expense;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// Which single comparator to apply. Exactly one is ever in effect.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first. The server's own default order, so this is ours too.
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

serde_plain::derive_display_from_serialize!(SortKey);
serde_plain::derive_fromstr_from_deserialize!(SortKey);

/// The ephemeral filter/sort/page state owned by one viewing session. Not persisted; a new
/// invocation starts from `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    /// Substring to match (case-insensitively) against title or category. Whitespace-only
    /// behaves the same as empty: no filtering.
    pub search: String,
    pub sort: SortKey,
    /// 1-based page number sent to the server.
    pub page: u32,
    /// Records per page sent to the server. The server clamps this to 1..=100.
    pub page_size: u32,
    /// Inclusive date-range bounds sent to the server.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: 10,
            from: None,
            to: None,
        }
    }
}

/// Projects a fetched page through the search filter and the selected sort.
///
/// The sort is stable and its comparators are total: records whose key does not parse sort
/// after every parseable record in both directions, keeping their incoming order among
/// themselves, so parseable keys stay correctly ordered relative to each other and the sort
/// can never panic or fail to terminate. Every input record appears in the output exactly
/// once unless the search filter excludes it.
pub fn project(records: &[Expense], state: &ListState) -> Vec<Expense> {
    let mut rows: Vec<Expense> = match normalized_search(&state.search) {
        Some(needle) => records
            .iter()
            .filter(|e| matches_search(e, &needle))
            .cloned()
            .collect(),
        None => records.to_vec(),
    };

    // Descending orders reverse the key, not the whole comparison, so unparseable keys land
    // at the end either way.
    match state.sort {
        SortKey::DateAsc => rows.sort_by(|a, b| compare_keys(a.parsed_date(), b.parsed_date())),
        SortKey::DateDesc => rows.sort_by(|a, b| {
            compare_keys(a.parsed_date().map(Reverse), b.parsed_date().map(Reverse))
        }),
        SortKey::AmountAsc => {
            rows.sort_by(|a, b| compare_keys(a.parsed_amount(), b.parsed_amount()))
        }
        SortKey::AmountDesc => rows.sort_by(|a, b| {
            compare_keys(a.parsed_amount().map(Reverse), b.parsed_amount().map(Reverse))
        }),
    }
    rows
}

/// Trims the search text and lowers it; `None` means "do not filter".
fn normalized_search(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Case-insensitive substring match against title or category. An empty field simply does not
/// match; it never fails.
fn matches_search(expense: &Expense, needle: &str) -> bool {
    expense.title.to_lowercase().contains(needle)
        || expense.category.to_lowercase().contains(needle)
}

/// Total comparator over optional keys. A missing (unparseable) key sorts greater than any
/// present key and equal to other missing keys, so the ordering stays transitive and a stable
/// sort keeps the unparseable records in their incoming order at the end.
fn compare_keys<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: i64, title: &str, category: &str, amount: &str, date: &str) -> Expense {
        Expense {
            id,
            title: title.to_string(),
            category: category.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, "Coffee", "Food", "3.50", "2024-01-05"),
            expense(2, "Bus", "Transport", "1.20", "2024-01-02"),
        ]
    }

    fn titles(rows: &[Expense]) -> Vec<&str> {
        rows.iter().map(|e| e.title.as_str()).collect()
    }

    fn state(search: &str, sort: SortKey) -> ListState {
        ListState {
            search: search.to_string(),
            sort,
            ..ListState::default()
        }
    }

    #[test]
    fn test_date_ascending() {
        let rows = project(&sample(), &state("", SortKey::DateAsc));
        assert_eq!(titles(&rows), vec!["Bus", "Coffee"]);
    }

    #[test]
    fn test_amount_descending() {
        let rows = project(&sample(), &state("", SortKey::AmountDesc));
        assert_eq!(titles(&rows), vec!["Coffee", "Bus"]);
    }

    #[test]
    fn test_search_no_match_yields_empty() {
        let rows = project(&sample(), &state("zzz", SortKey::DateDesc));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_search_matches_on_category_too() {
        // "foo" is a substring of category "Food", so the Coffee record is retained.
        let rows = project(&sample(), &state("foo", SortKey::DateDesc));
        assert_eq!(titles(&rows), vec!["Coffee"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_and_category() {
        let rows = project(&sample(), &state("COFF", SortKey::DateDesc));
        assert_eq!(titles(&rows), vec!["Coffee"]);

        let rows = project(&sample(), &state("transport", SortKey::DateDesc));
        assert_eq!(titles(&rows), vec!["Bus"]);
    }

    #[test]
    fn test_whitespace_search_filters_nothing() {
        let all = project(&sample(), &state("", SortKey::DateAsc));
        let spaces = project(&sample(), &state("   \t", SortKey::DateAsc));
        assert_eq!(all, spaces);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        for sort in [
            SortKey::DateAsc,
            SortKey::DateDesc,
            SortKey::AmountAsc,
            SortKey::AmountDesc,
        ] {
            assert!(project(&[], &state("anything", sort)).is_empty());
        }
    }

    #[test]
    fn test_sort_is_stable_on_equal_keys() {
        let records = vec![
            expense(1, "Lunch", "Food", "12.00", "2024-03-10"),
            expense(2, "Dinner", "Food", "25.00", "2024-03-10"),
            expense(3, "Taxi", "Transport", "12.00", "2024-03-11"),
        ];

        // Equal dates keep input order.
        let by_date = project(&records, &state("", SortKey::DateAsc));
        assert_eq!(titles(&by_date), vec!["Lunch", "Dinner", "Taxi"]);

        // Equal amounts keep input order, in both directions.
        let by_amount = project(&records, &state("", SortKey::AmountAsc));
        assert_eq!(titles(&by_amount), vec!["Lunch", "Taxi", "Dinner"]);
        let by_amount_desc = project(&records, &state("", SortKey::AmountDesc));
        assert_eq!(titles(&by_amount_desc), vec!["Dinner", "Lunch", "Taxi"]);
    }

    #[test]
    fn test_unparseable_amount_does_not_panic_and_loses_no_records() {
        let records = vec![
            expense(1, "Coffee", "Food", "3.50", "2024-01-05"),
            expense(2, "Mystery", "Misc", "abc", "2024-01-03"),
            expense(3, "Bus", "Transport", "1.20", "2024-01-02"),
        ];
        let rows = project(&records, &state("", SortKey::AmountAsc));
        // Parseable amounts ascend, the unparseable record goes to the end.
        assert_eq!(titles(&rows), vec!["Bus", "Coffee", "Mystery"]);
    }

    #[test]
    fn test_parseable_keys_order_across_an_unparseable_record() {
        // The record in the middle must not shield the outer two from being compared.
        let records = vec![
            expense(1, "Taxi", "Transport", "9.00", "2024-01-03"),
            expense(2, "Mystery", "Misc", "abc", "2024-01-02"),
            expense(3, "Tea", "Food", "1.00", "2024-01-01"),
        ];
        let rows = project(&records, &state("", SortKey::AmountAsc));
        assert_eq!(titles(&rows), vec!["Tea", "Taxi", "Mystery"]);
        let rows = project(&records, &state("", SortKey::AmountDesc));
        assert_eq!(titles(&rows), vec!["Taxi", "Tea", "Mystery"]);
    }

    #[test]
    fn test_unparseable_date_does_not_panic() {
        let records = vec![
            expense(1, "Coffee", "Food", "3.50", "2024-01-05"),
            expense(2, "Mystery", "Misc", "2.00", "99-99"),
            expense(3, "Bus", "Transport", "1.20", "2024-01-02"),
        ];
        let rows = project(&records, &state("", SortKey::DateDesc));
        assert_eq!(titles(&rows), vec!["Coffee", "Bus", "Mystery"]);

        let rows = project(&records, &state("", SortKey::DateAsc));
        assert_eq!(titles(&rows), vec!["Bus", "Coffee", "Mystery"]);
    }

    #[test]
    fn test_projection_is_idempotent_under_identical_state() {
        let s = state("o", SortKey::AmountDesc);
        let once = project(&sample(), &s);
        let twice = project(&once, &s);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_key_round_trips_as_text() {
        assert_eq!(SortKey::DateDesc.to_string(), "date_desc");
        assert_eq!(
            "amount_asc".parse::<SortKey>().unwrap(),
            SortKey::AmountAsc
        );
    }
}
