use crate::table::column::{ColumnMapping, ColumnType};
use crate::table::compare::compare_optional_cells;
use crate::table::dom::{HtmlTable, Page, TableBody, TableRow};
use crate::table::state::{SortOrder, TableState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Glyphs shown in the indicator child of sortable headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortIndicators {
    pub ascending: String,
    pub descending: String,
    pub neutral: String,
}

impl Default for SortIndicators {
    fn default() -> Self {
        Self {
            ascending: "↑".to_string(),
            descending: "↓".to_string(),
            neutral: "↕".to_string(),
        }
    }
}

impl SortIndicators {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            ascending: "^".to_string(),
            descending: "v".to_string(),
            neutral: "-".to_string(),
        }
    }

    pub fn for_order(&self, order: SortOrder) -> &str {
        match order {
            SortOrder::Ascending => &self.ascending,
            SortOrder::Descending => &self.descending,
        }
    }
}

/// Re-attaches row-level controls after the body has been restructured.
///
/// Implementations must be idempotent: binding replaces, never stacks.
pub trait RowBinder {
    fn rebind(&self, body: &mut TableBody);
}

impl<F> RowBinder for F
where
    F: Fn(&mut TableBody),
{
    fn rebind(&self, body: &mut TableBody) {
        self(body)
    }
}

/// Everything needed to register one table with the controller
pub struct TableRegistration {
    table_id: String,
    mapping: ColumnMapping,
    default_sort: Option<String>,
    empty_state_colspan: Option<usize>,
    binder: Option<Box<dyn RowBinder>>,
}

impl TableRegistration {
    pub fn new(table_id: &str, mapping: ColumnMapping) -> Self {
        Self {
            table_id: table_id.to_string(),
            mapping,
            default_sort: None,
            empty_state_colspan: None,
            binder: None,
        }
    }

    pub fn default_sort(mut self, column: Option<&str>) -> Self {
        self.default_sort = column.map(|c| c.to_string());
        self
    }

    /// Span of the placeholder cell; defaults to the table's header count
    pub fn empty_state_colspan(mut self, colspan: usize) -> Self {
        self.empty_state_colspan = Some(colspan);
        self
    }

    pub fn rebind_with(mut self, binder: impl RowBinder + 'static) -> Self {
        self.binder = Some(Box::new(binder));
        self
    }
}

/// Column key and type captured from a sortable header at registration
#[derive(Debug, Clone, PartialEq, Eq)]
struct SortableHeader {
    position: usize,
    column: String,
    column_type: ColumnType,
}

struct RegisteredTable {
    mapping: ColumnMapping,
    state: TableState,
    headers: Vec<SortableHeader>,
    empty_state_colspan: usize,
    binder: Option<Box<dyn RowBinder>>,
}

/// Result of one sort-and-render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// Rows were reordered and re-appended
    Sorted { rows: usize },
    /// The body only holds the empty-state placeholder
    EmptyState,
    /// The table has no body
    NoBody,
}

/// A row together with the cell texts it is compared on.
/// Owns the row for the duration of the sort.
struct RowRecord {
    /// One entry per mapped column; `None` when the row is too short
    values: Vec<Option<String>>,
    row: TableRow,
}

impl RowRecord {
    fn extract(row: TableRow, mapping: &ColumnMapping) -> Self {
        let values = mapping
            .iter()
            .map(|spec| row.cell_text(spec.index).map(str::to_string))
            .collect();
        Self { values, row }
    }

    fn value(&self, position: Option<usize>) -> Option<&str> {
        position
            .and_then(|p| self.values.get(p))
            .and_then(|v| v.as_deref())
    }
}

/// Reorder the body rows of `table` by `column`.
///
/// The sort is stable and moves the existing rows; no row is created,
/// dropped or duplicated.
pub fn sort_rows(
    table: &mut HtmlTable,
    column: &str,
    column_type: ColumnType,
    order: SortOrder,
    mapping: &ColumnMapping,
    empty_state_colspan: usize,
) -> SortOutcome {
    let Some(body) = table.body.as_mut() else {
        return SortOutcome::NoBody;
    };

    if body.rows.len() == 1 && body.rows[0].is_placeholder(empty_state_colspan) {
        trace!(target: "table", "Table '{}' shows its empty state, nothing to sort", table.id);
        return SortOutcome::EmptyState;
    }

    let position = mapping.position(column);
    if position.is_none() {
        debug!(target: "table", "Column '{}' is not mapped for table '{}'", column, table.id);
    }

    let mut records: Vec<RowRecord> = body
        .take_rows()
        .into_iter()
        .map(|row| RowRecord::extract(row, mapping))
        .collect();

    // sort_by is stable, so ties keep their current relative order
    records.sort_by(|a, b| {
        order.apply(compare_optional_cells(
            a.value(position),
            b.value(position),
            column_type,
        ))
    });

    let rows = records.len();
    body.rows.extend(records.into_iter().map(|r| r.row));
    SortOutcome::Sorted { rows }
}

/// Owns the sort state of every registered table on a page
pub struct SortableTableController {
    tables: HashMap<String, RegisteredTable>,
    indicators: SortIndicators,
}

impl Default for SortableTableController {
    fn default() -> Self {
        Self::new(SortIndicators::default())
    }
}

impl SortableTableController {
    pub fn new(indicators: SortIndicators) -> Self {
        Self {
            tables: HashMap::new(),
            indicators,
        }
    }

    pub fn indicators(&self) -> &SortIndicators {
        &self.indicators
    }

    /// Register a table. Returns `false` (and does nothing) when the page
    /// has no such table or the table has no body.
    pub fn register(&mut self, page: &mut Page, registration: TableRegistration) -> bool {
        let TableRegistration {
            table_id,
            mapping,
            default_sort,
            empty_state_colspan,
            binder,
        } = registration;

        let Some(table) = page.table_mut(&table_id) else {
            debug!(target: "table", "Table '{}' not on this page, skipping", table_id);
            return false;
        };
        if table.body.is_none() {
            debug!(target: "table", "Table '{}' has no body, skipping", table_id);
            return false;
        }

        let headers: Vec<SortableHeader> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.sortable)
            .filter_map(|(position, h)| {
                let column = h.column.clone()?;
                // data-type wins; without one the mapping decides
                let column_type = h
                    .column_type
                    .as_deref()
                    .map(ColumnType::from_attr)
                    .or_else(|| mapping.get(&column).map(|c| c.column_type))
                    .unwrap_or(ColumnType::Text);
                Some(SortableHeader {
                    position,
                    column,
                    column_type,
                })
            })
            .collect();

        let state = TableState::new(default_sort.as_deref());
        let empty_state_colspan = empty_state_colspan.unwrap_or_else(|| table.column_count());

        refresh_indicators(table, &state, &self.indicators);

        debug!(
            target: "table",
            "Registered table '{}' with {} sortable headers (default sort: {:?})",
            table_id,
            headers.len(),
            state.active_column
        );

        self.tables.insert(
            table_id,
            RegisteredTable {
                mapping,
                state,
                headers,
                empty_state_colspan,
                binder,
            },
        );
        true
    }

    pub fn is_registered(&self, table_id: &str) -> bool {
        self.tables.contains_key(table_id)
    }

    pub fn state(&self, table_id: &str) -> Option<&TableState> {
        self.tables.get(table_id).map(|t| &t.state)
    }

    /// Handle a click on the header at `header_position`.
    ///
    /// Returns the direction the table is now sorted in, or `None` when the
    /// table is unknown or the header is not sortable.
    pub fn click_header(
        &mut self,
        page: &mut Page,
        table_id: &str,
        header_position: usize,
    ) -> Option<SortOrder> {
        let registered = self.tables.get_mut(table_id)?;
        let header = registered
            .headers
            .iter()
            .find(|h| h.position == header_position)?
            .clone();
        let table = page.table_mut(table_id)?;

        let order = registered.state.on_header_click(&header.column);
        refresh_indicators(table, &registered.state, &self.indicators);

        debug!(
            target: "table",
            "Sorting '{}' by '{}' ({:?})",
            table_id, header.column, order
        );

        let outcome = sort_rows(
            table,
            &header.column,
            header.column_type,
            order,
            &registered.mapping,
            registered.empty_state_colspan,
        );

        if let SortOutcome::Sorted { rows } = outcome {
            trace!(target: "table", "Re-rendered {} rows of '{}'", rows, table_id);
            if let (Some(binder), Some(body)) = (registered.binder.as_ref(), table.body.as_mut()) {
                binder.rebind(body);
            }
        }

        Some(order)
    }

    /// Click the sortable header whose `data-column` is `column`
    pub fn click_header_by_key(
        &mut self,
        page: &mut Page,
        table_id: &str,
        column: &str,
    ) -> Option<SortOrder> {
        let position = self
            .tables
            .get(table_id)?
            .headers
            .iter()
            .find(|h| h.column == column)?
            .position;
        self.click_header(page, table_id, position)
    }

    /// Run the table's binder without sorting
    pub fn rebind(&self, page: &mut Page, table_id: &str) -> bool {
        let Some(binder) = self.tables.get(table_id).and_then(|t| t.binder.as_ref()) else {
            return false;
        };
        let Some(body) = page.body_mut(table_id) else {
            return false;
        };
        binder.rebind(body);
        true
    }
}

fn refresh_indicators(table: &mut HtmlTable, state: &TableState, indicators: &SortIndicators) {
    for header in table.headers.iter_mut().filter(|h| h.sortable) {
        let Some(indicator) = header.indicator.as_mut() else {
            continue;
        };
        let active = header
            .column
            .as_deref()
            .is_some_and(|c| state.is_active(c));
        *indicator = if active {
            indicators.for_order(state.direction).to_string()
        } else {
            indicators.neutral.clone()
        };
    }
}

/// Register `table_id` with default options: empty-state span equal to the
/// header count and no row binder.
pub fn register_sortable_table(
    controller: &mut SortableTableController,
    page: &mut Page,
    table_id: &str,
    mapping: ColumnMapping,
    default_sort_column: Option<&str>,
) -> bool {
    controller.register(
        page,
        TableRegistration::new(table_id, mapping).default_sort(default_sort_column),
    )
}
