use quizdesk::actions::roster::{
    begin_edit, build_roster_table, render_students, roster_columns, ROSTER_TABLE_ID,
    STUDENT_ID_ATTR,
};
use quizdesk::actions::statistics::{
    build_statistics_table, parse_results, render_results, statistics_columns,
    STATISTICS_TABLE_ID,
};
use quizdesk::actions::{
    RosterBinder, RowAction, RowCommand, StatisticsBinder, Student, StudentResult,
};
use quizdesk::table::{Page, RowBinder, SortableTableController, TableRegistration};

fn students() -> Vec<Student> {
    vec![
        Student {
            id: 10,
            name: "Bob".to_string(),
            group: "2A".to_string(),
            username: "e110".to_string(),
        },
        Student {
            id: 2,
            name: "alice".to_string(),
            group: "1B".to_string(),
            username: "e102".to_string(),
        },
        Student {
            id: 7,
            name: "Charlie".to_string(),
            group: "1A".to_string(),
            username: "e107".to_string(),
        },
    ]
}

fn roster_page() -> (Page, SortableTableController) {
    let mut page = Page::new();
    let mut table = build_roster_table();
    render_students(table.body.as_mut().unwrap(), &students());
    page.insert_table(table);

    let mut controller = SortableTableController::default();
    assert!(controller.register(
        &mut page,
        TableRegistration::new(ROSTER_TABLE_ID, roster_columns())
            .empty_state_colspan(6)
            .rebind_with(RosterBinder),
    ));
    controller.rebind(&mut page, ROSTER_TABLE_ID);
    (page, controller)
}

#[test]
fn test_controls_target_their_own_row_after_sorting() {
    let (mut page, mut controller) = roster_page();

    controller.click_header_by_key(&mut page, ROSTER_TABLE_ID, "name");
    let body = page.body(ROSTER_TABLE_ID).unwrap();
    assert_eq!(body.column_texts(1), vec!["alice", "Bob", "Charlie"]);

    for row in &body.rows {
        let own_id = row.attribute(STUDENT_ID_ATTR).unwrap();
        for action in [RowAction::Edit, RowAction::Delete, RowAction::ResetPassword] {
            let command = page
                .click_control(ROSTER_TABLE_ID, row.id(), action)
                .unwrap();
            assert_eq!(command.student_id, own_id);
            assert_eq!(command.action, action);
        }
    }
}

#[test]
fn test_numeric_id_sort_on_roster() {
    let (mut page, mut controller) = roster_page();
    controller.click_header(&mut page, ROSTER_TABLE_ID, 0);
    assert_eq!(
        page.body(ROSTER_TABLE_ID).unwrap().column_texts(0),
        vec!["2", "7", "10"]
    );

    let first = page.body(ROSTER_TABLE_ID).unwrap().rows[0].id();
    assert_eq!(
        page.click_control(ROSTER_TABLE_ID, first, RowAction::Delete),
        Some(RowCommand::new(RowAction::Delete, "2"))
    );
}

#[test]
fn test_rebinding_is_idempotent() {
    let (mut page, controller) = roster_page();
    for _ in 0..5 {
        controller.rebind(&mut page, ROSTER_TABLE_ID);
    }
    let body = page.body(ROSTER_TABLE_ID).unwrap();
    for row in &body.rows {
        assert_eq!(row.controls.len(), 3);
        assert!(row.controls.iter().all(|c| c.is_bound()));
    }
}

#[test]
fn test_row_being_edited_keeps_save_binding_through_sort() {
    let (mut page, mut controller) = roster_page();
    let bob = page.body(ROSTER_TABLE_ID).unwrap().rows[0].id();
    begin_edit(page.body_mut(ROSTER_TABLE_ID).unwrap().row_mut(bob).unwrap());

    controller.click_header_by_key(&mut page, ROSTER_TABLE_ID, "id");

    let body = page.body(ROSTER_TABLE_ID).unwrap();
    assert_eq!(body.rows[2].id(), bob);
    assert_eq!(
        page.click_control(ROSTER_TABLE_ID, bob, RowAction::Edit),
        Some(RowCommand::new(RowAction::Save, "10"))
    );
}

#[test]
fn test_roster_empty_state_is_not_sorted() {
    let mut page = Page::new();
    let mut table = build_roster_table();
    render_students(table.body.as_mut().unwrap(), &[]);
    page.insert_table(table);

    let mut controller = SortableTableController::default();
    controller.register(
        &mut page,
        TableRegistration::new(ROSTER_TABLE_ID, roster_columns()).rebind_with(RosterBinder),
    );
    controller.click_header_by_key(&mut page, ROSTER_TABLE_ID, "name");

    let body = page.body(ROSTER_TABLE_ID).unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body.rows[0].cell_text(0), Some("No students yet."));
}

#[test]
fn test_statistics_retry_targets_sorted_row() {
    let results = vec![
        StudentResult {
            student_id: Some(1),
            name: "Ana".to_string(),
            group: "1A".to_string(),
            mathematics: "2/4".to_string(),
            total: "3/18".to_string(),
            ..Default::default()
        },
        StudentResult {
            student_id: Some(2),
            name: "Luis".to_string(),
            group: "1A".to_string(),
            mathematics: "5/5".to_string(),
            total: "15/18".to_string(),
            ..Default::default()
        },
    ];
    let mut page = Page::new();
    let mut table = build_statistics_table();
    render_results(table.body.as_mut().unwrap(), &results);
    page.insert_table(table);

    let mut controller = SortableTableController::default();
    controller.register(
        &mut page,
        TableRegistration::new(STATISTICS_TABLE_ID, statistics_columns())
            .empty_state_colspan(10)
            .rebind_with(StatisticsBinder),
    );

    controller.click_header_by_key(&mut page, STATISTICS_TABLE_ID, "total");
    controller.click_header_by_key(&mut page, STATISTICS_TABLE_ID, "total");

    let body = page.body(STATISTICS_TABLE_ID).unwrap();
    assert_eq!(body.column_texts(8), vec!["15/18", "3/18"]);
    let top = body.rows[0].id();
    assert_eq!(
        page.click_control(STATISTICS_TABLE_ID, top, RowAction::RetryQuiz),
        Some(RowCommand::new(RowAction::RetryQuiz, "2"))
    );
}

#[test]
fn test_binder_can_be_used_directly() {
    let mut table = build_roster_table();
    let body = table.body.as_mut().unwrap();
    render_students(body, &students());
    RosterBinder.rebind(body);
    assert!(body.rows.iter().all(|r| r.control(RowAction::Delete).unwrap().is_bound()));
}

#[test]
fn test_submitted_results_sort_by_total_score() {
    let results = parse_results(
        r#"[
            {"id": 12, "student_id": 12, "name": "Eva", "group": "2C",
             "mathematics": "3/5", "physics": "4/4", "chemistry": "0/3",
             "biology": "2/2", "computer_science": "1/4", "total": "10/18"},
            {"id": 4, "student_id": 4, "name": "Hugo", "group": "2A",
             "mathematics": "1/5", "physics": "0/4", "chemistry": "1/3",
             "biology": "1/2", "computer_science": "0/4", "total": "3/18"},
            {"id": 9, "student_id": 9, "name": "Irene", "group": "2B",
             "mathematics": "4/5", "physics": "3/4", "chemistry": "2/3",
             "biology": "2/2", "computer_science": "1/4", "total": "12/18"}
        ]"#,
    )
    .unwrap();
    let mut page = Page::new();
    let mut table = build_statistics_table();
    render_results(table.body.as_mut().unwrap(), &results);
    page.insert_table(table);

    let mut controller = SortableTableController::default();
    controller.register(
        &mut page,
        TableRegistration::new(STATISTICS_TABLE_ID, statistics_columns())
            .rebind_with(StatisticsBinder),
    );
    controller.click_header_by_key(&mut page, STATISTICS_TABLE_ID, "total");

    let body = page.body(STATISTICS_TABLE_ID).unwrap();
    assert_eq!(body.column_texts(8), vec!["3/18", "10/18", "12/18"]);
    let top = body.rows[0].id();
    assert_eq!(
        page.click_control(STATISTICS_TABLE_ID, top, RowAction::RetryQuiz),
        Some(RowCommand::new(RowAction::RetryQuiz, "4"))
    );
}
