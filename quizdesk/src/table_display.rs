use crate::table::{HtmlTable, TableRow};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

fn header_label(label: &str, indicator: Option<&str>) -> String {
    match indicator {
        Some(glyph) if !glyph.is_empty() => format!("{} {}", label, glyph),
        _ => label.to_string(),
    }
}

fn row_cells(row: &TableRow, column_count: usize) -> Vec<Cell> {
    let mut cells: Vec<Cell> = row
        .cells
        .iter()
        .map(|cell| match cell.input_value() {
            Some(value) => Cell::new(format!("[{}]", value)),
            None => Cell::new(cell.text_content().trim()),
        })
        .collect();

    // Controls are rendered into the last cell of the row
    if !row.controls.is_empty() && cells.len() == column_count {
        let glyphs: Vec<&str> = row.controls.iter().map(|c| c.glyph.as_str()).collect();
        cells[column_count - 1] = Cell::new(glyphs.join(" "));
    }
    cells
}

/// Render a page table for the terminal
pub fn render_table(table: &HtmlTable) -> Table {
    let mut output = Table::new();
    output.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = table
        .headers
        .iter()
        .map(|h| Cell::new(header_label(&h.label, h.indicator.as_deref())).add_attribute(Attribute::Bold))
        .collect();
    output.set_header(headers);

    if let Some(body) = &table.body {
        for row in &body.rows {
            output.add_row(row_cells(row, table.column_count()));
        }
    }

    output
}
