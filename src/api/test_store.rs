//! Implements the `ExpenseStore` trait with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without a server. It reimplements the server's observable
//! semantics: search-free paging ordered newest first, inclusive date-range bounds, payload
//! validation on mutations, and string-rendered aggregate totals.
//!
//! State is process-global and keyed (by the config home, in practice) so that separate
//! command invocations within one process share a store while tests stay isolated.

use crate::api::{DateRange, ExpenseStore, ListRequest, LoginResponse};
use crate::error::ApiError;
use crate::model::{Amount, CategoryTotal, Expense, MonthSummary, NewExpense};
use crate::session::User;
use crate::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

const PAGE_SIZE_MAX: u32 = 100;

static STORES: OnceLock<Mutex<HashMap<String, StoreState>>> = OnceLock::new();

fn stores() -> &'static Mutex<HashMap<String, StoreState>> {
    STORES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An `ExpenseStore` that holds everything in memory. By default it is seeded with some
/// existing data; state is looked up by key on every call.
pub(crate) struct TestStore {
    key: String,
}

impl TestStore {
    /// Attaches to (creating and seeding if necessary) the store state for `key`.
    pub(crate) fn attach(key: impl Into<String>) -> Self {
        let key = key.into();
        stores()
            .lock()
            .expect("test store lock poisoned")
            .entry(key.clone())
            .or_insert_with(StoreState::seeded);
        Self { key }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut map = stores().lock().expect("test store lock poisoned");
        let state = map
            .get_mut(&self.key)
            .expect("test store state missing for key");
        f(state)
    }
}

#[derive(Debug)]
struct StoreState {
    next_id: i64,
    expenses: BTreeMap<i64, Expense>,
    /// email -> (password, user)
    users: HashMap<String, (String, User)>,
}

impl StoreState {
    fn seeded() -> Self {
        let seed: Vec<Expense> =
            serde_json::from_str(EXPENSE_SEED).expect("invalid expense seed data");
        let next_id = seed.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let expenses = seed.into_iter().map(|e| (e.id, e)).collect();

        let mut users = HashMap::new();
        users.insert(
            SEED_USER_EMAIL.to_string(),
            (
                SEED_USER_PASSWORD.to_string(),
                User {
                    id: 1,
                    email: SEED_USER_EMAIL.to_string(),
                    name: Some("Test User".to_string()),
                },
            ),
        );

        Self {
            next_id,
            expenses,
            users,
        }
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub(crate) const SEED_USER_EMAIL: &str = "test@spendlog.dev";
pub(crate) const SEED_USER_PASSWORD: &str = "hunter2";

#[async_trait::async_trait]
impl ExpenseStore for TestStore {
    async fn list(&mut self, request: &ListRequest) -> Result<Vec<Expense>> {
        self.with_state(|state| {
            let mut rows: Vec<Expense> = state
                .expenses
                .values()
                .filter(|e| in_range(e, request.from, request.to))
                .cloned()
                .collect();

            // Server default order: newest first, ties broken by id descending.
            rows.sort_by(|a, b| {
                (b.parsed_date(), b.id).cmp(&(a.parsed_date(), a.id))
            });

            let page = request.page.max(1);
            let page_size = request.page_size.clamp(1, PAGE_SIZE_MAX) as usize;
            let offset = (page as usize - 1) * page_size;
            Ok(rows.into_iter().skip(offset).take(page_size).collect())
        })
    }

    async fn create(&mut self, payload: &NewExpense) -> Result<Expense> {
        let parsed = parse_payload(payload)?;
        self.with_state(|state| {
            let id = state.take_id();
            let expense = Expense {
                id,
                title: parsed.title,
                amount: parsed.amount.to_string(),
                date: parsed.date.to_string(),
                category: parsed.category,
            };
            state.expenses.insert(id, expense.clone());
            Ok(expense)
        })
    }

    async fn update(&mut self, id: i64, payload: &NewExpense) -> Result<Expense> {
        let parsed = parse_payload(payload)?;
        self.with_state(|state| {
            let expense = state.expenses.get_mut(&id).ok_or(ApiError::Server {
                status: 404,
                message: "not found".to_string(),
            })?;
            expense.title = parsed.title;
            expense.amount = parsed.amount.to_string();
            expense.date = parsed.date.to_string();
            expense.category = parsed.category;
            Ok(expense.clone())
        })
    }

    async fn delete(&mut self, id: i64) -> Result<()> {
        self.with_state(|state| {
            if state.expenses.remove(&id).is_none() {
                return Err(ApiError::Server {
                    status: 404,
                    message: "not found".to_string(),
                }
                .into());
            }
            Ok(())
        })
    }

    async fn month_summary(&mut self, year: i32, month: u32) -> Result<MonthSummary> {
        self.with_state(|state| {
            let total: Decimal = state
                .expenses
                .values()
                .filter(|e| {
                    e.parsed_date()
                        .map(|d| d.year() == year && d.month() == month)
                        .unwrap_or(false)
                })
                .filter_map(|e| e.parsed_amount())
                .map(|a| a.value())
                .sum();
            Ok(MonthSummary {
                total: total.round_dp(2).to_string(),
            })
        })
    }

    async fn category_summary(&mut self, range: &DateRange) -> Result<Vec<CategoryTotal>> {
        self.with_state(|state| {
            let mut totals: HashMap<String, Decimal> = HashMap::new();
            for expense in state
                .expenses
                .values()
                .filter(|e| in_range(e, range.from, range.to))
            {
                if let Some(amount) = expense.parsed_amount() {
                    *totals.entry(expense.category.clone()).or_default() += amount.value();
                }
            }
            let mut rows: Vec<CategoryTotal> = totals
                .into_iter()
                .map(|(category, total)| CategoryTotal {
                    category,
                    total: total.round_dp(2).to_string(),
                })
                .collect();
            // Largest category first, like the server.
            rows.sort_by(|a, b| {
                let a_total = Amount::from_str(&a.total).map(|x| x.value()).unwrap_or_default();
                let b_total = Amount::from_str(&b.total).map(|x| x.value()).unwrap_or_default();
                b_total.cmp(&a_total)
            });
            Ok(rows)
        })
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse> {
        self.with_state(|state| {
            match state.users.get(email) {
                Some((stored_password, user)) if stored_password == password => {
                    Ok(LoginResponse {
                        access_token: format!("test-token-{}", user.id),
                        user: user.clone(),
                    })
                }
                // The server answers 401 with an error body for bad credentials.
                _ => Err(ApiError::Auth.into()),
            }
        })
    }

    async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User> {
        self.with_state(|state| {
            if email.is_empty() || password.is_empty() {
                return Err(ApiError::Server {
                    status: 400,
                    message: "email and password required".to_string(),
                }
                .into());
            }
            if state.users.contains_key(email) {
                return Err(ApiError::Server {
                    status: 400,
                    message: "email already registered".to_string(),
                }
                .into());
            }
            let id = state.users.len() as i64 + 1;
            let user = User {
                id,
                email: email.to_string(),
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
            };
            state
                .users
                .insert(email.to_string(), (password.to_string(), user.clone()));
            Ok(user)
        })
    }
}

fn in_range(expense: &Expense, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(date) = expense.parsed_date() else {
        return false;
    };
    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

/// A validated mutation payload. Mirrors the server's checks: all fields present and
/// non-empty, the amount numeric and positive, the date well-formed.
struct ParsedPayload {
    title: String,
    amount: Amount,
    date: NaiveDate,
    category: String,
}

fn parse_payload(payload: &NewExpense) -> Result<ParsedPayload> {
    let mut errors = Vec::new();
    let title = payload.title.trim().to_string();
    let category = payload.category.trim().to_string();
    if title.is_empty() {
        errors.push("title cannot be empty".to_string());
    }
    if category.is_empty() {
        errors.push("category cannot be empty".to_string());
    }
    let amount = match Amount::from_str(&payload.amount) {
        Ok(a) if a.is_positive() => Some(a),
        Ok(_) => {
            errors.push("amount must be > 0".to_string());
            None
        }
        Err(_) => {
            errors.push("amount must be a valid number".to_string());
            None
        }
    };
    let date = match NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push("date must be in YYYY-MM-DD format".to_string());
            None
        }
    };
    if !errors.is_empty() {
        return Err(ApiError::Server {
            status: 400,
            message: serde_json::json!({ "errors": errors }).to_string(),
        }
        .into());
    }
    Ok(ParsedPayload {
        title,
        amount: amount.expect("amount validated"),
        date: date.expect("date validated"),
        category,
    })
}

/// Seed expense data, in the server's wire shape.
const EXPENSE_SEED: &str = r#"[
  {"id": 1, "title": "Groceries", "amount": "87.43", "date": "2024-01-20", "category": "Food"},
  {"id": 2, "title": "Coffee", "amount": "6.75", "date": "2024-01-19", "category": "Food"},
  {"id": 3, "title": "Fuel", "amount": "52.30", "date": "2024-01-18", "category": "Transport"},
  {"id": 4, "title": "Lunch", "amount": "14.85", "date": "2024-01-17", "category": "Food"},
  {"id": 5, "title": "Electricity", "amount": "142.67", "date": "2024-01-16", "category": "Utilities"},
  {"id": 6, "title": "Bus pass", "amount": "45.00", "date": "2024-01-15", "category": "Transport"},
  {"id": 7, "title": "Internet", "amount": "89.99", "date": "2023-12-11", "category": "Utilities"},
  {"id": 8, "title": "Dinner out", "amount": "42.30", "date": "2023-12-07", "category": "Food"}
]"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::unique_store_key;

    #[tokio::test]
    async fn test_list_orders_newest_first_and_pages() {
        let mut store = TestStore::attach(unique_store_key());
        let page1 = store
            .list(&ListRequest {
                page: 1,
                page_size: 3,
                from: None,
                to: None,
            })
            .await
            .unwrap();
        assert_eq!(page1.len(), 3);
        assert_eq!(page1[0].date, "2024-01-20");
        assert_eq!(page1[1].date, "2024-01-19");

        let page3 = store
            .list(&ListRequest {
                page: 3,
                page_size: 3,
                from: None,
                to: None,
            })
            .await
            .unwrap();
        assert_eq!(page3.len(), 2);
    }

    #[tokio::test]
    async fn test_list_date_range_is_inclusive() {
        let mut store = TestStore::attach(unique_store_key());
        let rows = store
            .list(&ListRequest {
                page: 1,
                page_size: 100,
                from: Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
                to: Some(NaiveDate::from_ymd_opt(2024, 1, 18).unwrap()),
            })
            .await
            .unwrap();
        let dates: Vec<&str> = rows.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-18", "2024-01-17", "2024-01-16", "2024-01-15"]);
    }

    #[tokio::test]
    async fn test_create_validates_like_the_server() {
        let mut store = TestStore::attach(unique_store_key());
        let bad = NewExpense::new("Coffee", "-2.00", "2024-01-05", "Food");
        let err = store.create(&bad).await.unwrap_err();
        let api = err.downcast_ref::<ApiError>().expect("expected ApiError");
        match api {
            ApiError::Server { status, message } => {
                assert_eq!(*status, 400);
                assert!(message.contains("amount must be > 0"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete_roundtrip() {
        let mut store = TestStore::attach(unique_store_key());
        let created = store
            .create(&NewExpense::new("Cinema", "12.00", "2024-02-01", "Fun"))
            .await
            .unwrap();
        assert_eq!(created.title, "Cinema");

        let updated = store
            .update(
                created.id,
                &NewExpense::new("Cinema", "15.50", "2024-02-01", "Fun"),
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, "15.50");

        store.delete(created.id).await.unwrap();
        let err = store.delete(created.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Server { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_month_summary_sums_only_that_month() {
        let mut store = TestStore::attach(unique_store_key());
        let summary = store.month_summary(2023, 12).await.unwrap();
        assert_eq!(summary.total, "132.29");
    }

    #[tokio::test]
    async fn test_category_summary_groups_and_orders_descending() {
        let mut store = TestStore::attach(unique_store_key());
        let rows = store
            .category_summary(&DateRange::default())
            .await
            .unwrap();
        let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Utilities", "Food", "Transport"]);
        assert_eq!(rows[1].total, "151.33");
    }

    #[tokio::test]
    async fn test_login_and_register() {
        let mut store = TestStore::attach(unique_store_key());
        let response = store
            .login(SEED_USER_EMAIL, SEED_USER_PASSWORD)
            .await
            .unwrap();
        assert!(!response.access_token.is_empty());
        assert_eq!(response.user.email, SEED_USER_EMAIL);

        let err = store.login(SEED_USER_EMAIL, "wrong").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Auth)
        ));

        let user = store
            .register("new@spendlog.dev", "secret", "New User")
            .await
            .unwrap();
        assert_eq!(user.email, "new@spendlog.dev");
        let err = store
            .register("new@spendlog.dev", "secret", "")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Server { status: 400, .. })
        ));
    }
}
