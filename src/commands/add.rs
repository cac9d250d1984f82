//! The add command: validate locally, create on the server, refetch.

use crate::api::Mode;
use crate::commands::{drop_session_if_unauthorized, format_amount, require_session, Out};
use crate::model::{Expense, NewExpense};
use crate::view::{ListScreen, ListState};
use crate::{api, Config, Result};

/// Creates an expense. Required-field validation runs before any network call; on success
/// the screen jumps back to page 1 and refetches, so the staleness contract holds even for
/// a one-shot CLI invocation.
pub async fn add(config: Config, mode: Mode, payload: NewExpense) -> Result<Out<Expense>> {
    let session = require_session(&config).await?;
    let mut store = api::store(&config, Some(&session), mode)?;

    let mut screen = ListScreen::new(ListState {
        page_size: config.page_size(),
        ..ListState::default()
    });
    let created =
        drop_session_if_unauthorized(&config, screen.create(store.as_mut(), &payload).await)
            .await?;

    let message = format!(
        "Added expense {}: {} ({}) {} on {}.",
        created.id,
        created.title,
        created.category,
        format_amount(&created.amount),
        created.date
    );
    Ok(Out::new(message, created))
}
