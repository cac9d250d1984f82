//! The delete command.

use crate::api::Mode;
use crate::commands::{drop_session_if_unauthorized, require_session, Out};
use crate::view::{ListScreen, ListState};
use crate::{api, Config, Result};

/// Deletes an expense by id. The confirmation decision is collected by the caller (a prompt
/// or `--yes` in the CLI) and arrives here as a plain bool, so the command itself is not tied
/// to any input mechanism. Without confirmation nothing is sent.
pub async fn delete(config: Config, mode: Mode, id: i64, confirmed: bool) -> Result<Out<i64>> {
    if !confirmed {
        return Ok(Out::new_message(format!("Not deleting expense {id}.")));
    }
    let session = require_session(&config).await?;
    let mut store = api::store(&config, Some(&session), mode)?;

    let mut screen = ListScreen::new(ListState {
        page_size: config.page_size(),
        ..ListState::default()
    });
    let deleted = screen.delete(store.as_mut(), id).await;
    drop_session_if_unauthorized(&config, deleted).await?;

    Ok(Out::new(format!("Deleted expense {id}."), id))
}
