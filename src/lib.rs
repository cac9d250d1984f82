mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
mod fetch;
pub mod model;
mod session;
mod utils;
pub mod view;

pub use api::{DateRange, ExpenseStore, ListRequest, Mode};
pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use session::{Session, User};
