//! Data types shared between the API boundary and the view layer.

mod amount;
mod expense;
mod summary;

pub use amount::Amount;
pub use expense::{Expense, NewExpense};
pub use summary::{CategoryTotal, MonthSummary};
