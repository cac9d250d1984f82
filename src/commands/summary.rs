//! The summary command: the month total and the category breakdown.

use crate::api::{DateRange, Mode};
use crate::commands::{drop_session_if_unauthorized, Out};
use crate::view::{Slice, SummaryView};
use crate::{api, Config, Result, Session};
use anyhow::bail;
use chrono::Datelike;
use format_num::NumberFormat;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// The structured form of a rendered summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub year: i32,
    pub month: u32,
    pub month_total: String,
    pub categories: Vec<CategoryLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryLine {
    pub label: String,
    pub value: Decimal,
}

/// Fetches the two aggregates and renders them. When no session is established the
/// aggregates are not requested at all: the result is an explicit "unavailable" message,
/// which is not the same thing as a summary with no data.
pub async fn summary(
    config: Config,
    mode: Mode,
    year: Option<i32>,
    month: Option<u32>,
    range: DateRange,
) -> Result<Out<SummaryData>> {
    let view = match Session::load(&config).await? {
        None => SummaryView::Unavailable,
        Some(session) => {
            let (year, month) = resolve_month(year, month)?;
            let mut store = api::store(&config, Some(&session), mode)?;

            let month_summary = store.month_summary(year, month).await;
            let month_summary = drop_session_if_unauthorized(&config, month_summary).await?;
            let categories = store.category_summary(&range).await;
            let categories = drop_session_if_unauthorized(&config, categories).await?;

            SummaryView::ready(year, month, month_summary, categories)
        }
    };

    Ok(match view {
        SummaryView::Unavailable => Out::new_message(
            "The summary is unavailable: nobody is logged in. Run 'spendlog login' first.",
        ),
        SummaryView::Ready {
            year,
            month,
            month_total,
            slices,
        } => {
            let message = render(year, month, &month_total, &slices);
            let data = SummaryData {
                year,
                month,
                month_total,
                categories: slices
                    .into_iter()
                    .map(|s| CategoryLine {
                        label: s.label,
                        value: s.value,
                    })
                    .collect(),
            };
            Out::new(message, data)
        }
    })
}

/// Year and month must be given together; when neither is given the current month is used.
fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<(i32, u32)> {
    match (year, month) {
        (Some(year), Some(month)) => {
            if !(1..=12).contains(&month) {
                bail!("--month must be between 1 and 12, got {month}");
            }
            Ok((year, month))
        }
        (None, None) => {
            let now = chrono::Local::now();
            Ok((now.year(), now.month()))
        }
        _ => bail!("--year and --month must be given together"),
    }
}

fn render(year: i32, month: u32, month_total: &str, slices: &[Slice]) -> String {
    let num = NumberFormat::new();
    let mut out = format!(
        "Total for {year}-{month:02}: {}\n",
        super::format_amount(month_total)
    );

    if slices.is_empty() {
        out.push_str("\nNo category data to display.");
        return out;
    }

    let sum: Decimal = slices.iter().map(|s| s.value).sum();
    let label_width = slices.iter().map(|s| s.label.len()).max().unwrap_or(0);
    for slice in slices {
        let value = slice.value.to_f64().unwrap_or(0.0);
        let percent = if sum.is_zero() {
            0.0
        } else {
            let total = sum.to_f64().unwrap_or(f64::INFINITY);
            value / total * 100.0
        };
        out.push_str(&format!(
            "\n{:<label_width$}  {:>12}  {:>5.1}%",
            slice.label,
            num.format(",.2f", value),
            percent,
        ));
    }
    out
}
