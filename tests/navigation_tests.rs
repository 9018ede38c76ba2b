use gridbase::state::data_model::{
    BaseId, Column, ColumnId, ColumnType, Row, RowId, Table, TableId, TableSnapshot,
};
use gridbase::state::edit_session::{CellPosition, EditSession};
use gridbase::state::navigation::{
    self, handle_key, GridKey, KeyEvent, KeyModifiers, KeyOutcome,
};
use gridbase::state::table_state::TableState;

fn grid_of(columns: usize, rows: usize) -> TableState {
    let table_id = TableId::generate();
    TableState::from_snapshot(TableSnapshot {
        table: Table {
            id: table_id,
            base_id: BaseId::generate(),
            name: "Grid".to_string(),
        },
        columns: (0..columns)
            .map(|idx| Column {
                id: ColumnId::generate(),
                table_id,
                name: format!("C{idx}"),
                column_type: ColumnType::Text,
                order: idx as i64,
            })
            .collect(),
        rows: (0..rows)
            .map(|idx| Row {
                id: RowId::generate(),
                table_id,
                row_index: idx as i64,
            })
            .collect(),
        cells: Vec::new(),
        total_rows: rows,
    })
}

fn selected_at(row: usize, col: usize) -> EditSession {
    let mut session = EditSession::new();
    session.select(CellPosition::new(row, col));
    session
}

#[test]
fn test_arrows_move_and_clamp() {
    let grid = grid_of(3, 4);
    let mut session = selected_at(0, 1);

    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowUp));
    assert_eq!(session.selection(), Some(CellPosition::new(0, 1)));
    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowLeft));
    assert_eq!(session.selection(), Some(CellPosition::new(0, 1)));

    for _ in 0..10 {
        handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowDown));
        handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowRight));
    }
    assert_eq!(session.selection(), Some(CellPosition::new(3, 3)));
}

#[test]
fn test_tab_and_shift_tab_skip_index_column() {
    let grid = grid_of(2, 1);
    let mut session = selected_at(0, 1);

    let outcome = handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Tab));
    assert_eq!(outcome, KeyOutcome::Handled);
    assert_eq!(session.selection(), Some(CellPosition::new(0, 2)));

    handle_key(&mut session, &grid, KeyEvent::shifted(GridKey::Tab));
    assert_eq!(session.selection(), Some(CellPosition::new(0, 1)));
    handle_key(&mut session, &grid, KeyEvent::shifted(GridKey::Tab));
    assert_eq!(session.selection(), Some(CellPosition::new(0, 1)));
}

#[test]
fn test_enter_opens_append_edit_and_escape_clears() {
    let grid = grid_of(2, 2);
    let mut session = selected_at(1, 2);

    assert_eq!(
        handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Enter)),
        KeyOutcome::Handled
    );
    assert!(session.is_editing());

    // First Escape leaves the editor, the second drops the selection.
    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Escape));
    assert_eq!(session.selection(), Some(CellPosition::new(1, 2)));
    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Escape));
    assert_eq!(session.selection(), None);
}

#[test]
fn test_arrows_do_not_move_while_editing() {
    let grid = grid_of(2, 3);
    let mut session = selected_at(1, 1);
    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Char('a')));

    let outcome = handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowDown));
    assert_eq!(outcome, KeyOutcome::Ignored);
    assert!(session.is_editing());
    assert_eq!(session.selection(), Some(CellPosition::new(1, 1)));
}

#[test]
fn test_tab_while_editing_commits_then_moves() {
    let grid = grid_of(2, 1);
    let mut session = selected_at(0, 1);
    handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Char('x')));

    let outcome = handle_key(&mut session, &grid, KeyEvent::plain(GridKey::Tab));
    let KeyOutcome::Commit(commit) = outcome else {
        panic!("expected commit, got {outcome:?}");
    };
    assert_eq!(commit.raw, "x");
    assert_eq!(commit.key, grid.key_at(CellPosition::new(0, 1)).unwrap());
    assert!(!session.is_editing());
    assert_eq!(session.selection(), Some(CellPosition::new(0, 2)));
}

#[test]
fn test_command_chars_are_left_alone() {
    let grid = grid_of(1, 1);
    let mut session = selected_at(0, 1);
    let event = KeyEvent {
        key: GridKey::Char('c'),
        modifiers: KeyModifiers {
            ctrl: true,
            ..KeyModifiers::default()
        },
    };
    assert_eq!(handle_key(&mut session, &grid, event), KeyOutcome::Ignored);
    assert!(!session.is_editing());
}

#[test]
fn test_no_selection_ignores_keys() {
    let grid = grid_of(2, 2);
    let mut session = EditSession::new();
    assert_eq!(
        handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowDown)),
        KeyOutcome::Ignored
    );
    assert_eq!(session.selection(), None);
}

#[test]
fn test_empty_grid_ignores_keys() {
    let grid = grid_of(2, 0);
    let mut session = selected_at(0, 1);
    assert_eq!(
        handle_key(&mut session, &grid, KeyEvent::plain(GridKey::ArrowDown)),
        KeyOutcome::Ignored
    );
}

#[test]
fn test_data_column_helpers() {
    let grid = grid_of(3, 1);
    assert_eq!(navigation::first_data_column(&grid), Some(1));
    assert_eq!(navigation::last_data_column(&grid), Some(3));
    assert_eq!(navigation::next_data_column(&grid, 0), Some(1));
    assert_eq!(navigation::next_data_column(&grid, 3), Some(3));
    assert_eq!(navigation::previous_data_column(&grid, 1), Some(1));
    assert_eq!(navigation::previous_data_column(&grid, 2), Some(1));

    let bare = grid_of(0, 1);
    assert_eq!(navigation::first_data_column(&bare), None);
}
