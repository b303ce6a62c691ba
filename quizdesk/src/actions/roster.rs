use crate::actions::{RowAction, RowCommand};
use crate::api_client::EditStudentRequest;
use crate::table::{
    CellContent, ColumnMapping, HeaderCell, HtmlTable, RowBinder, RowControl, TableBody,
    TableCell, TableRow,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ROSTER_TABLE_ID: &str = "studentsTable";
pub const ROSTER_COLUMN_COUNT: usize = 6;
pub const STUDENT_ID_ATTR: &str = "data-student-id";

const NAME_CLASS: &str = "editable-name";
const GROUP_CLASS: &str = "editable-group";
const EMPTY_MESSAGE: &str = "No students yet.";
const MASKED_PASSWORD: &str = "********";

const EDIT_GLYPH: &str = "✏️";
const SAVE_GLYPH: &str = "💾";

/// A roster entry. Accepts both the service's keys and the roster file's
/// capitalised keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Group")]
    pub group: String,
    #[serde(alias = "Username")]
    pub username: String,
}

pub fn roster_columns() -> ColumnMapping {
    ColumnMapping::new()
        .number("id", 0)
        .text("name", 1)
        .text("group", 2)
        .text("username", 3)
}

pub fn build_roster_table() -> HtmlTable {
    HtmlTable::new(
        ROSTER_TABLE_ID,
        vec![
            HeaderCell::sortable("ID", "id", "number"),
            HeaderCell::sortable("Name", "name", "string"),
            HeaderCell::sortable("Group", "group", "string"),
            HeaderCell::sortable("Username", "username", "string"),
            HeaderCell::plain("Password"),
            HeaderCell::plain("Actions"),
        ],
    )
}

fn student_row(student: &Student) -> TableRow {
    TableRow::new(vec![
        TableCell::text(student.id.to_string()),
        TableCell::text(&student.name).with_class(NAME_CLASS),
        TableCell::text(&student.group).with_class(GROUP_CLASS),
        TableCell::text(&student.username),
        TableCell::text(MASKED_PASSWORD),
        TableCell::text(""),
    ])
    .with_attribute(STUDENT_ID_ATTR, student.id.to_string())
    .with_control(RowControl::new(RowAction::ResetPassword, "🔄", "Reset Password"))
    .with_control(RowControl::new(RowAction::Edit, EDIT_GLYPH, "Edit"))
    .with_control(RowControl::new(RowAction::Delete, "❌", "Delete"))
}

/// Replace the body with one row per student, or the empty-state row.
/// Callers rebind afterwards.
pub fn render_students(body: &mut TableBody, students: &[Student]) {
    body.take_rows();

    if students.is_empty() {
        body.append(TableRow::placeholder(EMPTY_MESSAGE, ROSTER_COLUMN_COUNT));
        return;
    }

    for student in students {
        body.append(student_row(student));
    }
    debug!(target: "actions", "Rendered {} roster rows", students.len());
}

pub fn is_editing(row: &TableRow) -> bool {
    row.cell_by_class(NAME_CLASS)
        .and_then(|c| c.input_value())
        .is_some()
}

/// Swap the name and group cells for inputs holding their current text.
/// Returns `false` when the row is already being edited or is not a
/// roster row.
pub fn begin_edit(row: &mut TableRow) -> bool {
    if is_editing(row) || row.cell_by_class(GROUP_CLASS).is_none() {
        return false;
    }
    for class in [NAME_CLASS, GROUP_CLASS] {
        let Some(cell) = row.cell_by_class_mut(class) else {
            return false;
        };
        let current = cell.text_content().to_string();
        cell.content = CellContent::Input(current);
    }
    if let Some(control) = row.control_mut(RowAction::Edit) {
        control.glyph = SAVE_GLYPH.to_string();
        control.title = "Save".to_string();
    }
    true
}

/// Build the save request from the row's inputs
pub fn edit_request(row: &TableRow) -> Option<EditStudentRequest> {
    let id = row.attribute(STUDENT_ID_ATTR)?;
    let name = row.cell_by_class(NAME_CLASS)?.input_value()?;
    let group = row.cell_by_class(GROUP_CLASS)?.input_value()?;
    Some(EditStudentRequest {
        id: id.to_string(),
        name: name.to_string(),
        group: group.to_string(),
    })
}

/// Leave edit mode showing the values the service accepted
pub fn finish_edit(row: &mut TableRow, name: &str, group: &str) {
    if let Some(cell) = row.cell_by_class_mut(NAME_CLASS) {
        cell.content = CellContent::Text(name.to_string());
    }
    if let Some(cell) = row.cell_by_class_mut(GROUP_CLASS) {
        cell.content = CellContent::Text(group.to_string());
    }
    if let Some(control) = row.control_mut(RowAction::Edit) {
        control.glyph = EDIT_GLYPH.to_string();
        control.title = "Edit".to_string();
    }
}

/// Binds roster row controls to the row's own student id
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterBinder;

impl RowBinder for RosterBinder {
    fn rebind(&self, body: &mut TableBody) {
        for row in body.rows.iter_mut() {
            let Some(student_id) = row.attribute(STUDENT_ID_ATTR).map(|s| s.to_string()) else {
                continue;
            };
            let edit_action = if is_editing(row) {
                RowAction::Save
            } else {
                RowAction::Edit
            };

            for control in row.controls.iter_mut() {
                let action = match control.action {
                    RowAction::Edit => edit_action,
                    RowAction::Delete => RowAction::Delete,
                    RowAction::ResetPassword => RowAction::ResetPassword,
                    _ => continue,
                };
                control.bind(RowCommand::new(action, &student_id));
            }
        }
    }
}
