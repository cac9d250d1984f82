//! The list screen: owns the cached page fetched from the store, the filter/sort state, and
//! the staleness bookkeeping around refetches.
//!
//! The store is the sole owner of persisted data; this type holds a transient, possibly-stale
//! copy. Every successful mutation marks the copy stale and refetches before anything is
//! projected again. A refresh commits its response only if no newer refresh superseded it.

use crate::api::{ExpenseStore, ListRequest};
use crate::fetch::{Generations, QueryKey, Ticket};
use crate::model::{Expense, NewExpense};
use crate::view::list::{project, ListState};
use crate::Result;
use tracing::debug;

pub struct ListScreen {
    state: ListState,
    records: Vec<Expense>,
    generations: Generations,
    stale: bool,
}

impl ListScreen {
    pub fn new(state: ListState) -> Self {
        Self {
            state,
            records: Vec::new(),
            generations: Generations::new(),
            stale: true,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// True when a mutation has invalidated the cached page (or nothing was fetched yet).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn request(&self) -> ListRequest {
        ListRequest {
            page: self.state.page,
            page_size: self.state.page_size,
            from: self.state.from,
            to: self.state.to,
        }
    }

    /// Refetches the current page. If another refresh was issued while this one was in
    /// flight, the response is discarded rather than applied.
    pub async fn refresh(&mut self, store: &mut (dyn ExpenseStore + Send)) -> Result<()> {
        let ticket = self.generations.begin(QueryKey::Expenses);
        let rows = store.list(&self.request()).await?;
        if !self.commit(ticket, rows) {
            debug!("Discarding superseded expense fetch");
        }
        Ok(())
    }

    /// Applies a fetched page if the ticket is still current. Returns whether it was applied.
    fn commit(&mut self, ticket: Ticket, rows: Vec<Expense>) -> bool {
        if !self.generations.is_current(ticket) {
            return false;
        }
        self.records = rows;
        self.stale = false;
        true
    }

    /// The rows to display: the cached page projected through search and sort.
    pub fn visible(&self) -> Vec<Expense> {
        project(&self.records, &self.state)
    }

    /// Validates locally, creates on the store, then jumps back to page 1 and refetches.
    pub async fn create(
        &mut self,
        store: &mut (dyn ExpenseStore + Send),
        payload: &NewExpense,
    ) -> Result<Expense> {
        payload.validate()?;
        let created = store.create(payload).await?;
        self.state.page = 1;
        self.stale = true;
        self.refresh(store).await?;
        Ok(created)
    }

    /// Validates locally, replaces all fields of the expense, then refetches.
    pub async fn update(
        &mut self,
        store: &mut (dyn ExpenseStore + Send),
        id: i64,
        payload: &NewExpense,
    ) -> Result<Expense> {
        payload.validate()?;
        let updated = store.update(id, payload).await?;
        self.stale = true;
        self.refresh(store).await?;
        Ok(updated)
    }

    /// Deletes the expense and refetches. Confirmation happens before this is called.
    pub async fn delete(
        &mut self,
        store: &mut (dyn ExpenseStore + Send),
        id: i64,
    ) -> Result<()> {
        store.delete(id).await?;
        self.stale = true;
        self.refresh(store).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestStore;
    use crate::error::ApiError;
    use crate::fetch::QueryKey;
    use crate::test::unique_store_key;
    use crate::view::list::SortKey;

    fn screen() -> ListScreen {
        ListScreen::new(ListState::default())
    }

    #[tokio::test]
    async fn test_refresh_fills_the_page() {
        let mut store = TestStore::attach(unique_store_key());
        let mut screen = screen();
        assert!(screen.is_stale());
        screen.refresh(&mut store).await.unwrap();
        assert!(!screen.is_stale());
        assert_eq!(screen.visible().len(), 8);
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_discarded() {
        let mut store = TestStore::attach(unique_store_key());
        let mut screen = screen();
        screen.refresh(&mut store).await.unwrap();
        let before = screen.visible();

        // A ticket taken before a newer fetch begins must not be committable.
        let stale_ticket = screen.generations.begin(QueryKey::Expenses);
        let _ = screen.generations.begin(QueryKey::Expenses);
        let applied = screen.commit(stale_ticket, Vec::new());
        assert!(!applied);
        assert_eq!(screen.visible(), before);
    }

    #[tokio::test]
    async fn test_create_validates_before_touching_the_store() {
        let mut store = TestStore::attach(unique_store_key());
        let mut screen = screen();
        screen.refresh(&mut store).await.unwrap();
        let count = screen.visible().len();

        let incomplete = NewExpense::new("", "3.50", "2024-01-05", "");
        let err = screen.create(&mut store, &incomplete).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Validation(_))
        ));

        screen.refresh(&mut store).await.unwrap();
        assert_eq!(screen.visible().len(), count);
    }

    #[tokio::test]
    async fn test_create_resets_page_and_refetches() {
        let mut store = TestStore::attach(unique_store_key());
        let mut screen = ListScreen::new(ListState {
            page: 2,
            page_size: 5,
            sort: SortKey::DateDesc,
            ..ListState::default()
        });
        screen.refresh(&mut store).await.unwrap();

        let created = screen
            .create(
                &mut store,
                &NewExpense::new("Cinema", "12.00", "2024-03-01", "Fun"),
            )
            .await
            .unwrap();
        assert_eq!(screen.state().page, 1);
        assert!(!screen.is_stale());
        // Newest first, so the new expense leads the refreshed first page.
        assert_eq!(screen.visible().first().map(|e| e.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_delete_refetches_without_the_record() {
        let mut store = TestStore::attach(unique_store_key());
        let mut screen = ListScreen::new(ListState {
            page_size: 100,
            ..ListState::default()
        });
        screen.refresh(&mut store).await.unwrap();
        let victim = screen.visible().first().unwrap().id;

        screen.delete(&mut store, victim).await.unwrap();
        assert!(screen.visible().iter().all(|e| e.id != victim));
    }
}
