//! quizdesk: client-side tables of the quiz-management app.
//!
//! Teachers' roster and statistics tables are modelled as an in-memory page
//! and driven by a [`table::SortableTableController`]: header clicks sort
//! the rows in place and row controls are rebound after every re-render.

pub mod actions;
pub mod api_client;
pub mod config;
pub mod table;
pub mod table_display;
pub mod utils;
