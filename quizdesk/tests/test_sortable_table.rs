use quizdesk::table::{
    register_sortable_table, ColumnMapping, HeaderCell, HtmlTable, NodeId, Page, SortOrder,
    SortableTableController, TableCell, TableRegistration, TableRow,
};

const TABLE_ID: &str = "scores";

fn scores_page(rows: &[(&str, &str, &str)]) -> Page {
    let mut table = HtmlTable::new(
        TABLE_ID,
        vec![
            HeaderCell::sortable("ID", "id", "number"),
            HeaderCell::sortable("Name", "name", "string"),
            HeaderCell::sortable("Total", "total", "number"),
            HeaderCell::plain("Actions"),
        ],
    );
    let body = table.body.as_mut().unwrap();
    for (id, name, total) in rows {
        body.append(TableRow::new(vec![
            TableCell::text(*id),
            TableCell::text(*name),
            TableCell::text(*total),
            TableCell::text(""),
        ]));
    }
    let mut page = Page::new();
    page.insert_table(table);
    page
}

fn scores_mapping() -> ColumnMapping {
    ColumnMapping::new()
        .number("id", 0)
        .text("name", 1)
        .number("total", 2)
}

fn registered(rows: &[(&str, &str, &str)]) -> (Page, SortableTableController) {
    let mut page = scores_page(rows);
    let mut controller = SortableTableController::default();
    assert!(register_sortable_table(
        &mut controller,
        &mut page,
        TABLE_ID,
        scores_mapping(),
        None
    ));
    (page, controller)
}

fn column(page: &Page, index: usize) -> Vec<String> {
    page.body(TABLE_ID).unwrap().column_texts(index)
}

fn sorted_ids(page: &Page) -> Vec<NodeId> {
    let mut ids = page.body(TABLE_ID).unwrap().row_ids();
    ids.sort();
    ids
}

#[test]
fn test_click_cycle_ascending_descending_ascending() {
    let (mut page, mut controller) =
        registered(&[("1", "c", "5"), ("2", "a", "9"), ("3", "b", "1")]);

    assert_eq!(
        controller.click_header(&mut page, TABLE_ID, 2),
        Some(SortOrder::Ascending)
    );
    assert_eq!(column(&page, 2), vec!["1", "5", "9"]);

    assert_eq!(
        controller.click_header(&mut page, TABLE_ID, 2),
        Some(SortOrder::Descending)
    );
    assert_eq!(column(&page, 2), vec!["9", "5", "1"]);

    assert_eq!(
        controller.click_header(&mut page, TABLE_ID, 2),
        Some(SortOrder::Ascending)
    );
    assert_eq!(column(&page, 2), vec!["1", "5", "9"]);
}

#[test]
fn test_numeric_sort_is_not_lexicographic() {
    let (mut page, mut controller) =
        registered(&[("10", "x", "0"), ("2", "y", "0"), ("1", "z", "0")]);
    controller.click_header_by_key(&mut page, TABLE_ID, "id");
    assert_eq!(column(&page, 0), vec!["1", "2", "10"]);
}

#[test]
fn test_unparsable_numbers_sort_as_zero() {
    let (mut page, mut controller) =
        registered(&[("1", "a", "3"), ("2", "b", ""), ("3", "c", "-2"), ("4", "d", "n/a")]);
    controller.click_header_by_key(&mut page, TABLE_ID, "total");
    // "" and "n/a" both read as 0 and keep their relative order
    assert_eq!(column(&page, 2), vec!["-2", "", "n/a", "3"]);
}

#[test]
fn test_text_sort_ignores_case() {
    let (mut page, mut controller) =
        registered(&[("1", "Bob", "0"), ("2", "alice", "0"), ("3", "Charlie", "0")]);
    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(column(&page, 1), vec!["alice", "Bob", "Charlie"]);
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let (mut page, mut controller) = registered(&[
        ("1", "a", "5"),
        ("2", "b", "7"),
        ("3", "c", "5"),
        ("4", "d", "7"),
        ("5", "e", "5"),
    ]);

    controller.click_header_by_key(&mut page, TABLE_ID, "total");
    assert_eq!(column(&page, 0), vec!["1", "3", "5", "2", "4"]);

    controller.click_header_by_key(&mut page, TABLE_ID, "total");
    // ties are not inverted
    assert_eq!(column(&page, 0), vec!["2", "4", "1", "3", "5"]);
}

#[test]
fn test_sort_is_a_permutation_of_the_same_rows() {
    let (mut page, mut controller) = registered(&[
        ("4", "d", "1"),
        ("1", "a", "4"),
        ("3", "c", "2"),
        ("2", "b", "3"),
    ]);
    let before = sorted_ids(&page);

    for key in ["id", "name", "total", "total", "id"] {
        controller.click_header_by_key(&mut page, TABLE_ID, key);
        assert_eq!(sorted_ids(&page), before);
    }
}

#[test]
fn test_short_rows_read_missing_cells_as_empty() {
    let mut page = scores_page(&[("2", "b", "4")]);
    page.body_mut(TABLE_ID)
        .unwrap()
        .append(TableRow::new(vec![TableCell::text("1")]));
    let mut controller = SortableTableController::default();
    register_sortable_table(&mut controller, &mut page, TABLE_ID, scores_mapping(), None);

    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(column(&page, 0), vec!["1", "2"]);
}

#[test]
fn test_empty_state_row_is_left_untouched() {
    let mut page = scores_page(&[]);
    let placeholder = TableRow::placeholder("No results yet.", 4);
    let placeholder_id = placeholder.id();
    page.body_mut(TABLE_ID).unwrap().append(placeholder);

    let mut controller = SortableTableController::default();
    register_sortable_table(&mut controller, &mut page, TABLE_ID, scores_mapping(), None);

    assert_eq!(
        controller.click_header(&mut page, TABLE_ID, 0),
        Some(SortOrder::Ascending)
    );
    let body = page.body(TABLE_ID).unwrap();
    assert_eq!(body.row_ids(), vec![placeholder_id]);
    assert_eq!(body.rows[0].cell_text(0), Some("No results yet."));
}

#[test]
fn test_empty_state_span_is_configured_per_table() {
    // A single one-cell row spanning 2 columns is not this table's placeholder
    // when the table declares 4, so it is treated as data and sorted normally.
    let mut page = scores_page(&[]);
    let row = TableRow::new(vec![TableCell::text("only").spanning(2)]);
    page.body_mut(TABLE_ID).unwrap().append(row);

    let mut controller = SortableTableController::default();
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = calls.clone();
    controller.register(
        &mut page,
        TableRegistration::new(TABLE_ID, scores_mapping())
            .empty_state_colspan(4)
            .rebind_with(move |_: &mut quizdesk::table::TableBody| counter.set(counter.get() + 1)),
    );
    controller.click_header(&mut page, TABLE_ID, 0);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_indicators_follow_active_column() {
    let (mut page, mut controller) = registered(&[("1", "a", "1"), ("2", "b", "2")]);
    let indicators = |page: &Page| -> Vec<Option<String>> {
        page.table(TABLE_ID)
            .unwrap()
            .headers
            .iter()
            .map(|h| h.indicator.clone())
            .collect()
    };

    assert_eq!(
        indicators(&page),
        vec![Some("↕".into()), Some("↕".into()), Some("↕".into()), None]
    );

    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(
        indicators(&page),
        vec![Some("↕".into()), Some("↑".into()), Some("↕".into()), None]
    );

    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(indicators(&page)[1], Some("↓".into()));

    controller.click_header_by_key(&mut page, TABLE_ID, "total");
    assert_eq!(
        indicators(&page),
        vec![Some("↕".into()), Some("↕".into()), Some("↑".into()), None]
    );
}

#[test]
fn test_default_sort_column_toggles_on_first_click() {
    let mut page = scores_page(&[("2", "b", "1"), ("1", "a", "2")]);
    let mut controller = SortableTableController::default();
    register_sortable_table(&mut controller, &mut page, TABLE_ID, scores_mapping(), Some("id"));

    assert_eq!(page.table(TABLE_ID).unwrap().headers[0].indicator.as_deref(), Some("↑"));
    assert_eq!(
        controller.click_header_by_key(&mut page, TABLE_ID, "id"),
        Some(SortOrder::Descending)
    );
    assert_eq!(column(&page, 0), vec!["2", "1"]);
}

#[test]
fn test_tables_keep_independent_state() {
    let mut page = scores_page(&[("2", "b", "1"), ("1", "a", "2")]);
    let mut other = HtmlTable::new("other", vec![HeaderCell::sortable("Name", "name", "string")]);
    other
        .body
        .as_mut()
        .unwrap()
        .append(TableRow::new(vec![TableCell::text("z")]));
    page.insert_table(other);

    let mut controller = SortableTableController::default();
    register_sortable_table(&mut controller, &mut page, TABLE_ID, scores_mapping(), None);
    register_sortable_table(
        &mut controller,
        &mut page,
        "other",
        ColumnMapping::new().text("name", 0),
        None,
    );

    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    controller.click_header_by_key(&mut page, "other", "name");
    controller.click_header_by_key(&mut page, "other", "name");

    assert_eq!(
        controller.state(TABLE_ID).unwrap().direction,
        SortOrder::Ascending
    );
    assert_eq!(
        controller.state("other").unwrap().direction,
        SortOrder::Descending
    );
}

#[test]
fn test_edit_inputs_travel_with_their_row() {
    let (mut page, mut controller) = registered(&[("2", "b", "1"), ("1", "a", "2")]);
    let editing = page.body(TABLE_ID).unwrap().rows[0].id();
    page.body_mut(TABLE_ID).unwrap().rows[0].cells[1].content =
        quizdesk::table::CellContent::Input("bee".to_string());

    controller.click_header_by_key(&mut page, TABLE_ID, "id");

    let body = page.body(TABLE_ID).unwrap();
    assert_eq!(body.rows[1].id(), editing);
    assert_eq!(body.rows[1].cells[1].input_value(), Some("bee"));
}

#[test]
fn test_header_without_indicator_child_still_sorts() {
    let mut table = HtmlTable::new(
        TABLE_ID,
        vec![
            HeaderCell::sortable("ID", "id", "number"),
            HeaderCell {
                indicator: None,
                ..HeaderCell::sortable("Name", "name", "string")
            },
        ],
    );
    let body = table.body.as_mut().unwrap();
    for (id, name) in [("1", "carla"), ("2", "Ana"), ("3", "bruno")] {
        body.append(TableRow::new(vec![TableCell::text(id), TableCell::text(name)]));
    }
    let mut page = Page::new();
    page.insert_table(table);
    let mut controller = SortableTableController::default();
    controller.register(&mut page, TableRegistration::new(TABLE_ID, scores_mapping()));

    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(column(&page, 1), vec!["Ana", "bruno", "carla"]);
    controller.click_header_by_key(&mut page, TABLE_ID, "name");
    assert_eq!(column(&page, 1), vec!["carla", "bruno", "Ana"]);

    let headers = &page.table(TABLE_ID).unwrap().headers;
    assert_eq!(headers[0].indicator.as_deref(), Some("↕"));
    assert_eq!(headers[1].indicator, None);
}

#[test]
fn test_header_without_type_uses_mapping_type() {
    let mut page = scores_page(&[("1", "a", "9"), ("2", "b", "10"), ("3", "c", "100")]);
    page.table_mut(TABLE_ID).unwrap().headers[2].column_type = None;
    let mut controller = SortableTableController::default();
    controller.register(&mut page, TableRegistration::new(TABLE_ID, scores_mapping()));

    controller.click_header_by_key(&mut page, TABLE_ID, "total");
    assert_eq!(column(&page, 2), vec!["9", "10", "100"]);
}
