//! The edit command: replace all four fields of an existing expense.

use crate::api::Mode;
use crate::commands::{drop_session_if_unauthorized, require_session, Out};
use crate::model::{Expense, NewExpense};
use crate::view::{ListScreen, ListState};
use crate::{api, Config, Result};

/// Updates an expense. The edit payload is the full field set: an update replaces the record,
/// it does not patch it. Validation runs before the network call.
pub async fn edit(config: Config, mode: Mode, id: i64, payload: NewExpense) -> Result<Out<Expense>> {
    let session = require_session(&config).await?;
    let mut store = api::store(&config, Some(&session), mode)?;

    let mut screen = ListScreen::new(ListState {
        page_size: config.page_size(),
        ..ListState::default()
    });
    let updated =
        drop_session_if_unauthorized(&config, screen.update(store.as_mut(), id, &payload).await)
            .await?;

    let message = format!("Updated expense {}.", updated.id);
    Ok(Out::new(message, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_store::{SEED_USER_EMAIL, SEED_USER_PASSWORD};
    use crate::commands::login;
    use crate::error::ApiError;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_edit_rejects_empty_fields_locally() {
        let env = TestEnv::new().await;
        let config = env.config();
        login(config.clone(), Mode::Test, SEED_USER_EMAIL, SEED_USER_PASSWORD)
            .await
            .unwrap();

        let incomplete = NewExpense::new("Coffee", "", "2024-01-05", "Food");
        let err = edit(config, Mode::Test, 1, incomplete).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_replaces_all_fields() {
        let env = TestEnv::new().await;
        let config = env.config();
        login(config.clone(), Mode::Test, SEED_USER_EMAIL, SEED_USER_PASSWORD)
            .await
            .unwrap();

        let payload = NewExpense::new("Groceries weekly", "91.00", "2024-01-21", "Food");
        let out = edit(config, Mode::Test, 1, payload).await.unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.title, "Groceries weekly");
        assert_eq!(updated.amount, "91.00");
        assert_eq!(updated.date, "2024-01-21");
    }

    #[tokio::test]
    async fn test_edit_unknown_id_is_a_server_error() {
        let env = TestEnv::new().await;
        let config = env.config();
        login(config.clone(), Mode::Test, SEED_USER_EMAIL, SEED_USER_PASSWORD)
            .await
            .unwrap();

        let payload = NewExpense::new("X", "1.00", "2024-01-01", "Y");
        let err = edit(config, Mode::Test, 999_999, payload).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Server { status: 404, .. })
        ));
    }
}
