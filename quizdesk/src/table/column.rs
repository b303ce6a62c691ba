use serde::{Deserialize, Serialize};

/// How cell values of a column are compared when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
}

impl ColumnType {
    /// Read the type from a header's `data-type` attribute.
    /// Anything other than `number` compares as text.
    pub fn from_attr(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("number") {
            ColumnType::Number
        } else {
            ColumnType::Text
        }
    }

    pub fn as_attr(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Text => "string",
        }
    }
}

/// A single logical column: its key, physical cell position and value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: String,
    pub index: usize,
    pub column_type: ColumnType,
}

/// Ordered association between column keys and cell positions.
///
/// Built once when a table is registered and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<ColumnSpec>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column; a repeated key replaces the earlier entry in place
    pub fn with_column(mut self, key: &str, index: usize, column_type: ColumnType) -> Self {
        let spec = ColumnSpec {
            key: key.to_string(),
            index,
            column_type,
        };
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(existing) => *existing = spec,
            None => self.columns.push(spec),
        }
        self
    }

    pub fn number(self, key: &str, index: usize) -> Self {
        self.with_column(key, index, ColumnType::Number)
    }

    pub fn text(self, key: &str, index: usize) -> Self {
        self.with_column(key, index, ColumnType::Text)
    }

    pub fn get(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Position of a key within the mapping (not the cell index)
    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
