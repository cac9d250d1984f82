//! View-models: pure transformations from fetched data plus UI state to display-ready data.

pub mod list;
mod screen;
pub mod summary;

pub use list::{project, ListState, SortKey};
pub use screen::ListScreen;
pub use summary::{slices, Slice, SummaryView};
