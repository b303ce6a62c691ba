use crate::actions::{RowAction, RowCommand};
use crate::table::{ColumnMapping, HeaderCell, HtmlTable, RowBinder, RowControl, TableBody, TableCell, TableRow};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

pub const STATISTICS_TABLE_ID: &str = "statsTable";
pub const STATISTICS_COLUMN_COUNT: usize = 10;

const EMPTY_MESSAGE: &str = "No results yet.";

/// One student's quiz result, per category plus total.
///
/// Scores are kept as the service writes them, `"correct/total"` strings
/// such as `"3/5"`. Plain numbers are accepted and kept as their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResult {
    /// Record id; the service writes it next to `student_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
    pub name: String,
    pub group: String,
    #[serde(default, deserialize_with = "score_text")]
    pub mathematics: String,
    #[serde(default, deserialize_with = "score_text")]
    pub physics: String,
    #[serde(default, deserialize_with = "score_text")]
    pub chemistry: String,
    #[serde(default, deserialize_with = "score_text")]
    pub biology: String,
    #[serde(default, deserialize_with = "score_text")]
    pub computer_science: String,
    #[serde(default, deserialize_with = "score_text")]
    pub total: String,
}

impl StudentResult {
    /// The student this result belongs to
    pub fn owner_id(&self) -> Option<i64> {
        self.student_id.or(self.id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Score {
    Number(serde_json::Number),
    Text(String),
}

fn score_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Score>::deserialize(deserializer)? {
        Some(Score::Number(n)) => n.to_string(),
        Some(Score::Text(text)) => text,
        None => String::new(),
    })
}

/// Parse a results file: either one result record, as written per
/// student by the quiz service, or an array of them
pub fn parse_results(contents: &str) -> Result<Vec<StudentResult>> {
    let value: Value = serde_json::from_str(contents).context("Results file is not JSON")?;
    let results = match value {
        Value::Array(_) => serde_json::from_value(value),
        single => serde_json::from_value(single).map(|r| vec![r]),
    };
    results.context("Invalid result record")
}

pub fn statistics_columns() -> ColumnMapping {
    ColumnMapping::new()
        .number("id", 0)
        .text("name", 1)
        .text("group", 2)
        .number("mathematics", 3)
        .number("physics", 4)
        .number("chemistry", 5)
        .number("biology", 6)
        .number("computer_science", 7)
        .number("total", 8)
}

pub fn build_statistics_table() -> HtmlTable {
    HtmlTable::new(
        STATISTICS_TABLE_ID,
        vec![
            HeaderCell::sortable("ID", "id", "number"),
            HeaderCell::sortable("Name", "name", "string"),
            HeaderCell::sortable("Group", "group", "string"),
            HeaderCell::sortable("Mathematics", "mathematics", "number"),
            HeaderCell::sortable("Physics", "physics", "number"),
            HeaderCell::sortable("Chemistry", "chemistry", "number"),
            HeaderCell::sortable("Biology", "biology", "number"),
            HeaderCell::sortable("Computer Science", "computer_science", "number"),
            HeaderCell::sortable("Total", "total", "number"),
            HeaderCell::plain("Actions"),
        ],
    )
}

fn result_row(result: &StudentResult) -> TableRow {
    TableRow::new(vec![
        TableCell::text(
            result
                .owner_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        ),
        TableCell::text(&result.name),
        TableCell::text(&result.group),
        TableCell::text(&result.mathematics),
        TableCell::text(&result.physics),
        TableCell::text(&result.chemistry),
        TableCell::text(&result.biology),
        TableCell::text(&result.computer_science),
        TableCell::text(&result.total),
        TableCell::text(""),
    ])
    .with_control(RowControl::new(RowAction::RetryQuiz, "🔁", "Allow retry"))
}

pub fn render_results(body: &mut TableBody, results: &[StudentResult]) {
    body.take_rows();

    if results.is_empty() {
        body.append(TableRow::placeholder(EMPTY_MESSAGE, STATISTICS_COLUMN_COUNT));
        return;
    }

    for result in results {
        body.append(result_row(result));
    }
    debug!(target: "actions", "Rendered {} result rows", results.len());
}

/// Binds each row's retry control to the student id in its first cell
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsBinder;

impl RowBinder for StatisticsBinder {
    fn rebind(&self, body: &mut TableBody) {
        for row in body.rows.iter_mut() {
            let student_id = match row.cell_text(0) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => continue,
            };
            if let Some(control) = row.control_mut(RowAction::RetryQuiz) {
                control.bind(RowCommand::new(RowAction::RetryQuiz, &student_id));
            }
        }
    }
}
