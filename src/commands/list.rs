//! The list command: fetch a page of expenses and display it filtered and sorted.

use crate::api::Mode;
use crate::commands::{drop_session_if_unauthorized, render_expense_table, require_session, Out};
use crate::model::Expense;
use crate::view::{ListScreen, ListState};
use crate::{api, Config, Result};

/// Fetches the requested page from the store, projects it through the search filter and the
/// selected sort, and renders the result as a table.
pub async fn list(config: Config, mode: Mode, state: ListState) -> Result<Out<Vec<Expense>>> {
    let session = require_session(&config).await?;
    let mut store = api::store(&config, Some(&session), mode)?;

    let page = state.page;
    let mut screen = ListScreen::new(state);
    let refreshed = screen.refresh(store.as_mut()).await;
    drop_session_if_unauthorized(&config, refreshed).await?;

    let rows = screen.visible();
    let message = if rows.is_empty() {
        format!("No expenses to show on page {page}.")
    } else {
        render_expense_table(&rows)
    };
    Ok(Out::new(message, rows))
}
