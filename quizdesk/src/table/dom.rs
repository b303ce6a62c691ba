//! In-memory model of the rendered page: tables, header cells, body rows.
//!
//! Rows carry a [`NodeId`] assigned at creation. Sorting moves row values
//! around; it never creates new ones, so the id (and anything attached to the
//! row such as an in-progress edit or a bound control) travels with the row.

use crate::actions::{RowAction, RowCommand};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a row element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    /// Cell temporarily replaced by a text input during an inline edit
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub content: CellContent,
    pub colspan: usize,
    pub class: Option<String>,
}

impl TableCell {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(value.into()),
            colspan: 1,
            class: None,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn spanning(mut self, colspan: usize) -> Self {
        self.colspan = colspan;
        self
    }

    /// Visible text of the cell. An input contributes no text.
    pub fn text_content(&self) -> &str {
        match &self.content {
            CellContent::Text(text) => text,
            CellContent::Input(_) => "",
        }
    }

    pub fn input_value(&self) -> Option<&str> {
        match &self.content {
            CellContent::Input(value) => Some(value),
            CellContent::Text(_) => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.as_deref() == Some(class)
    }
}

/// A clickable control inside a row (edit, delete, reset, retry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowControl {
    pub action: RowAction,
    pub glyph: String,
    pub title: String,
    handler: Option<RowCommand>,
}

impl RowControl {
    pub fn new(action: RowAction, glyph: &str, title: &str) -> Self {
        Self {
            action,
            glyph: glyph.to_string(),
            title: title.to_string(),
            handler: None,
        }
    }

    /// Install the click handler, replacing any previous one
    pub fn bind(&mut self, command: RowCommand) {
        self.handler = Some(command);
    }

    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }

    pub fn click(&self) -> Option<RowCommand> {
        self.handler.clone()
    }
}

/// A body row. Not `Clone`: a row exists exactly once in the page.
#[derive(Debug, PartialEq, Eq)]
pub struct TableRow {
    id: NodeId,
    pub attributes: BTreeMap<String, String>,
    pub cells: Vec<TableCell>,
    pub controls: Vec<RowControl>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            id: NodeId::next(),
            attributes: BTreeMap::new(),
            cells,
            controls: Vec::new(),
        }
    }

    /// Full-width placeholder row shown when the table has no data
    pub fn placeholder(message: &str, colspan: usize) -> Self {
        Self::new(vec![TableCell::text(message).spanning(colspan)])
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_control(mut self, control: RowControl) -> Self {
        self.controls.push(control);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }

    /// Trimmed text of the cell at `index`, if the row has that many cells
    pub fn cell_text(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text_content().trim())
    }

    pub fn cell_by_class(&self, class: &str) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.has_class(class))
    }

    pub fn cell_by_class_mut(&mut self, class: &str) -> Option<&mut TableCell> {
        self.cells.iter_mut().find(|c| c.has_class(class))
    }

    /// Single cell spanning `colspan` columns
    pub fn is_placeholder(&self, colspan: usize) -> bool {
        self.cells.len() == 1 && self.cells[0].colspan == colspan
    }

    pub fn control(&self, action: RowAction) -> Option<&RowControl> {
        self.controls.iter().find(|c| c.action == action)
    }

    pub fn control_mut(&mut self, action: RowAction) -> Option<&mut RowControl> {
        self.controls.iter_mut().find(|c| c.action == action)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TableBody {
    pub rows: Vec<TableRow>,
}

impl TableBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Detach every row, leaving the body empty
    pub fn take_rows(&mut self) -> Vec<TableRow> {
        std::mem::take(&mut self.rows)
    }

    pub fn append(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn row_ids(&self) -> Vec<NodeId> {
        self.rows.iter().map(|r| r.id()).collect()
    }

    pub fn row(&self, id: NodeId) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn row_mut(&mut self, id: NodeId) -> Option<&mut TableRow> {
        self.rows.iter_mut().find(|r| r.id() == id)
    }

    pub fn remove_row(&mut self, id: NodeId) -> Option<TableRow> {
        let position = self.rows.iter().position(|r| r.id() == id)?;
        Some(self.rows.remove(position))
    }

    /// Column `index` of every row, in body order
    pub fn column_texts(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.cell_text(index).unwrap_or("").to_string())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub sortable: bool,
    /// `data-column`
    pub column: Option<String>,
    /// `data-type`
    pub column_type: Option<String>,
    /// Text of the glyph child; `None` when the header has no such child
    pub indicator: Option<String>,
}

impl HeaderCell {
    pub fn plain(label: &str) -> Self {
        Self {
            label: label.to_string(),
            sortable: false,
            column: None,
            column_type: None,
            indicator: None,
        }
    }

    pub fn sortable(label: &str, column: &str, column_type: &str) -> Self {
        Self {
            label: label.to_string(),
            sortable: true,
            column: Some(column.to_string()),
            column_type: Some(column_type.to_string()),
            indicator: Some(String::new()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct HtmlTable {
    pub id: String,
    pub headers: Vec<HeaderCell>,
    pub body: Option<TableBody>,
}

impl HtmlTable {
    pub fn new(id: &str, headers: Vec<HeaderCell>) -> Self {
        Self {
            id: id.to_string(),
            headers,
            body: Some(TableBody::new()),
        }
    }

    /// A table rendered without a `<tbody>`
    pub fn without_body(id: &str, headers: Vec<HeaderCell>) -> Self {
        Self {
            id: id.to_string(),
            headers,
            body: None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// The set of tables present on the current page
#[derive(Debug, Default)]
pub struct Page {
    tables: HashMap<String, HtmlTable>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&mut self, table: HtmlTable) {
        self.tables.insert(table.id.clone(), table);
    }

    pub fn table(&self, id: &str) -> Option<&HtmlTable> {
        self.tables.get(id)
    }

    pub fn table_mut(&mut self, id: &str) -> Option<&mut HtmlTable> {
        self.tables.get_mut(id)
    }

    pub fn body(&self, table_id: &str) -> Option<&TableBody> {
        self.table(table_id)?.body.as_ref()
    }

    pub fn body_mut(&mut self, table_id: &str) -> Option<&mut TableBody> {
        self.table_mut(table_id)?.body.as_mut()
    }

    /// Click a row control and return the command its handler resolves to
    pub fn click_control(
        &self,
        table_id: &str,
        row_id: NodeId,
        action: RowAction,
    ) -> Option<RowCommand> {
        self.body(table_id)?.row(row_id)?.control(action)?.click()
    }
}
