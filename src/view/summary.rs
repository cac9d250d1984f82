//! The aggregate view-model: reshapes the two server aggregates (month total, per-category
//! totals) into display-ready pairs, coercing malformed data instead of failing.

use crate::model::{Amount, CategoryTotal, MonthSummary};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// One display-ready slice of the category breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub label: String,
    pub value: Decimal,
}

/// The aggregate display state. `Unavailable` means no viewer is established and the
/// aggregates were never requested, which is distinct from a `Ready` view with no slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryView {
    Unavailable,
    Ready {
        year: i32,
        month: u32,
        month_total: String,
        slices: Vec<Slice>,
    },
}

impl SummaryView {
    pub fn ready(year: i32, month: u32, summary: MonthSummary, rows: Vec<CategoryTotal>) -> Self {
        SummaryView::Ready {
            year,
            month,
            month_total: summary.total,
            slices: slices(rows),
        }
    }
}

/// Coerces each category row to a `{label, value}` pair. A total that fails to parse becomes
/// zero so the breakdown stays renderable.
pub fn slices(rows: Vec<CategoryTotal>) -> Vec<Slice> {
    rows.into_iter()
        .map(|row| {
            let value = match Amount::from_str(&row.total) {
                Ok(amount) => amount.value(),
                Err(e) => {
                    warn!("Malformed category total for '{}': {e}", row.category);
                    Decimal::ZERO
                }
            };
            Slice {
                label: row.category,
                value,
            }
        })
        .collect()
}
