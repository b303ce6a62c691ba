//! Sortable tables
//!
//! This module provides the page model the tables live in, column
//! mappings and comparators, per-table sort state, and the controller
//! that ties header clicks to sorting and row rebinding.

pub mod column;
pub mod compare;
pub mod controller;
pub mod dom;
pub mod state;

pub use column::{ColumnMapping, ColumnSpec, ColumnType};
pub use controller::{
    register_sortable_table, sort_rows, RowBinder, SortIndicators, SortOutcome,
    SortableTableController, TableRegistration,
};
pub use dom::{CellContent, HeaderCell, HtmlTable, NodeId, Page, RowControl, TableBody, TableCell, TableRow};
pub use state::{SortOrder, TableState};
