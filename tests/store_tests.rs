use gridbase::error::ErrorKind;
use gridbase::io::{Store, TableTemplate};
use gridbase::state::data_model::{
    CellValue, ColumnId, ColumnType, InsertPosition, OwnerId, RowId, Table, TableSnapshot,
};
use gridbase::state::ordering;

fn owner() -> OwnerId {
    OwnerId::new("user-1")
}

fn setup(seed_rows: usize) -> (Store, Table) {
    let store = Store::open_in_memory().unwrap();
    let base = store.create_base(&owner(), "Base").unwrap();
    let table = store
        .create_table(
            &owner(),
            base.id,
            "Tasks",
            &TableTemplate {
                columns: vec![
                    ("Name".to_string(), ColumnType::Text),
                    ("Count".to_string(), ColumnType::Number),
                ],
                seed_rows,
            },
        )
        .unwrap();
    (store, table)
}

fn snapshot(store: &Store, table: &Table) -> TableSnapshot {
    store.get_snapshot(&owner(), table.id, 1000).unwrap()
}

fn column_names(snapshot: &TableSnapshot) -> Vec<&str> {
    snapshot.columns.iter().map(|c| c.name.as_str()).collect()
}

fn column_id(snapshot: &TableSnapshot, name: &str) -> ColumnId {
    snapshot.column_named(name).unwrap().id
}

#[test]
fn test_create_table_uses_template() {
    let (store, table) = setup(3);
    let snap = snapshot(&store, &table);
    assert_eq!(column_names(&snap), vec!["Name", "Count"]);
    assert_eq!(snap.rows.len(), 3);
    assert_eq!(snap.total_rows, 3);
    assert_eq!(snap.cells.len(), 6);
    assert!(snap.cells.iter().all(|cell| cell.value == CellValue::Empty));
}

#[test]
fn test_default_template_columns() {
    let template = TableTemplate::default();
    let names: Vec<&str> = template.columns.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Name", "Notes"]);
    assert_eq!(template.seed_rows, 3);
}

#[test]
fn test_create_column_appends_and_stamps_cells() {
    let (store, table) = setup(3);
    let column = store
        .create_column(&owner(), table.id, "Status", ColumnType::Text)
        .unwrap();
    assert_eq!(column.order, 2);

    let snap = snapshot(&store, &table);
    assert_eq!(column_names(&snap), vec!["Name", "Count", "Status"]);
    for row in &snap.rows {
        let cell = snap.cell(row.id, column.id).unwrap();
        assert_eq!(cell.value, CellValue::Empty);
    }
}

#[test]
fn test_insert_column_after_name() {
    let (store, table) = setup(3);
    let before = snapshot(&store, &table);
    let name_id = column_id(&before, "Name");
    let count_id = column_id(&before, "Count");
    store
        .upsert_cell(&owner(), before.rows[1].id, count_id, "5")
        .unwrap();

    let notes = store
        .insert_column(
            &owner(),
            table.id,
            name_id,
            InsertPosition::After,
            "Notes",
            ColumnType::Text,
        )
        .unwrap();

    let after = snapshot(&store, &table);
    assert_eq!(column_names(&after), vec!["Name", "Notes", "Count"]);
    let orders: Vec<i64> = after.columns.iter().map(|c| c.order).collect();
    assert!(ordering::is_strictly_increasing(&orders));
    for row in &after.rows {
        assert_eq!(after.cell(row.id, notes.id).unwrap().value, CellValue::Empty);
    }
    assert_eq!(
        after.cell(before.rows[1].id, count_id).unwrap().value,
        CellValue::Number(5.0)
    );
}

#[test]
fn test_insert_column_before_first() {
    let (store, table) = setup(1);
    let snap = snapshot(&store, &table);
    let name_id = column_id(&snap, "Name");
    store
        .insert_column(
            &owner(),
            table.id,
            name_id,
            InsertPosition::Before,
            "Id",
            ColumnType::Number,
        )
        .unwrap();
    assert_eq!(
        column_names(&snapshot(&store, &table)),
        vec!["Id", "Name", "Count"]
    );
}

#[test]
fn test_insert_column_unknown_anchor_writes_nothing() {
    let (store, table) = setup(2);
    let err = store
        .insert_column(
            &owner(),
            table.id,
            ColumnId::generate(),
            InsertPosition::Before,
            "Ghost",
            ColumnType::Text,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let snap = snapshot(&store, &table);
    assert_eq!(column_names(&snap), vec!["Name", "Count"]);
    assert_eq!(snap.cells.len(), 4);
}

#[test]
fn test_anchor_from_other_table_is_not_found() {
    let (store, table) = setup(1);
    let base = store.list_bases(&owner()).unwrap()[0].clone();
    let other = store
        .create_table(&owner(), base.id, "Other", &TableTemplate::default())
        .unwrap();
    let foreign = column_id(&snapshot(&store, &other), "Name");

    let err = store
        .insert_column(
            &owner(),
            table.id,
            foreign,
            InsertPosition::After,
            "X",
            ColumnType::Text,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_duplicate_column_name_is_conflict() {
    let (store, table) = setup(0);
    let err = store
        .create_column(&owner(), table.id, "name", ColumnType::Text)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_blank_column_name_is_validation() {
    let (store, table) = setup(0);
    let err = store
        .create_column(&owner(), table.id, "  ", ColumnType::Text)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_rename_column() {
    let (store, table) = setup(0);
    let snap = snapshot(&store, &table);
    let name_id = column_id(&snap, "Name");

    let renamed = store.rename_column(&owner(), name_id, " Title ").unwrap();
    assert_eq!(renamed.name, "Title");
    // Renaming to its own name with a different case is allowed.
    store.rename_column(&owner(), name_id, "TITLE").unwrap();

    let err = store.rename_column(&owner(), name_id, "count").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_delete_column_removes_only_its_cells() {
    let (store, table) = setup(2);
    let snap = snapshot(&store, &table);
    let name_id = column_id(&snap, "Name");
    let count_id = column_id(&snap, "Count");
    store
        .upsert_cell(&owner(), snap.rows[0].id, count_id, "12")
        .unwrap();
    let extra = store
        .create_column(&owner(), table.id, "Extra", ColumnType::Text)
        .unwrap();

    store.delete_column(&owner(), name_id).unwrap();

    let after = snapshot(&store, &table);
    assert_eq!(column_names(&after), vec!["Count", "Extra"]);
    assert!(after.cells.iter().all(|c| c.column_id != name_id));
    assert_eq!(after.cells.len(), 4);
    assert_eq!(
        after.column_named("Count").unwrap().order,
        snap.column_named("Count").unwrap().order
    );
    assert_eq!(after.column_named("Extra").unwrap().order, extra.order);
    assert_eq!(
        after.cell(snap.rows[0].id, count_id).unwrap().value,
        CellValue::Number(12.0)
    );
}

#[test]
fn test_append_after_delete_keeps_order() {
    let (store, table) = setup(0);
    let snap = snapshot(&store, &table);
    store
        .delete_column(&owner(), column_id(&snap, "Name"))
        .unwrap();
    let late = store
        .create_column(&owner(), table.id, "Late", ColumnType::Text)
        .unwrap();
    let after = snapshot(&store, &table);
    assert_eq!(column_names(&after), vec!["Count", "Late"]);
    assert_eq!(late.order, 2);
}

#[test]
fn test_rows_append_insert_delete() {
    let (store, table) = setup(2);
    let snap = snapshot(&store, &table);
    let first = snap.rows[0].id;
    let second = snap.rows[1].id;

    let appended = store.create_row(&owner(), table.id).unwrap();
    assert_eq!(appended.row_index, 2);

    let inserted = store
        .insert_row(&owner(), table.id, second, InsertPosition::Before)
        .unwrap();
    let after = snapshot(&store, &table);
    let order: Vec<RowId> = after.rows.iter().map(|r| r.id).collect();
    assert_eq!(order, vec![first, inserted.id, second, appended.id]);
    let indices: Vec<i64> = after.rows.iter().map(|r| r.row_index).collect();
    assert!(ordering::is_strictly_increasing(&indices));
    for column in &after.columns {
        assert_eq!(
            after.cell(inserted.id, column.id).unwrap().value,
            CellValue::Empty
        );
    }

    store.delete_row(&owner(), inserted.id).unwrap();
    let after_delete = snapshot(&store, &table);
    assert_eq!(after_delete.rows.len(), 3);
    assert!(after_delete.cells.iter().all(|c| c.row_id != inserted.id));
    assert_eq!(
        after_delete.rows.iter().find(|r| r.id == second).unwrap().row_index,
        after.rows.iter().find(|r| r.id == second).unwrap().row_index
    );
}

#[test]
fn test_insert_row_unknown_anchor() {
    let (store, table) = setup(1);
    let err = store
        .insert_row(&owner(), table.id, RowId::generate(), InsertPosition::After)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(snapshot(&store, &table).rows.len(), 1);
}

#[test]
fn test_reorder_columns() {
    let (store, table) = setup(1);
    let snap = snapshot(&store, &table);
    let name_id = column_id(&snap, "Name");
    let count_id = column_id(&snap, "Count");

    let columns = store
        .reorder_columns(&owner(), table.id, &[(name_id, 1), (count_id, 0)])
        .unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Count", "Name"]);
    assert_eq!(column_names(&snapshot(&store, &table)), vec!["Count", "Name"]);
}

#[test]
fn test_reorder_rows_rejects_partial_list() {
    let (store, table) = setup(3);
    let snap = snapshot(&store, &table);
    let err = store
        .reorder_rows(&owner(), table.id, &[(snap.rows[0].id, 2)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let rows = store
        .reorder_rows(
            &owner(),
            table.id,
            &[
                (snap.rows[0].id, 2),
                (snap.rows[1].id, 1),
                (snap.rows[2].id, 0),
            ],
        )
        .unwrap();
    let ids: Vec<RowId> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![snap.rows[2].id, snap.rows[1].id, snap.rows[0].id]);
}

#[test]
fn test_other_owner_is_unauthorized() {
    let (store, table) = setup(1);
    let stranger = OwnerId::new("user-2");
    let snap = snapshot(&store, &table);

    let err = store.get_snapshot(&stranger, table.id, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = store
        .create_column(&stranger, table.id, "Spy", ColumnType::Text)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = store.delete_row(&stranger, snap.rows[0].id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_missing_table_is_not_found() {
    let store = Store::open_in_memory().unwrap();
    let err = store
        .get_snapshot(&owner(), gridbase::state::data_model::TableId::generate(), 10)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_tables_lifecycle() {
    let (store, table) = setup(2);
    let renamed = store.rename_table(&owner(), table.id, "Renamed").unwrap();
    assert_eq!(renamed.name, "Renamed");
    let tables = store.list_tables(&owner(), table.base_id).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "Renamed");

    store.delete_table(&owner(), table.id).unwrap();
    assert!(store.list_tables(&owner(), table.base_id).unwrap().is_empty());
    let err = store.get_snapshot(&owner(), table.id, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_ensure_workspace_is_idempotent() {
    let store = Store::open_in_memory().unwrap();
    let template = TableTemplate::with_seed_rows(2);
    let (base, table) = store
        .ensure_workspace(&owner(), "My base", "Table 1", &template)
        .unwrap();
    let (base_again, table_again) = store
        .ensure_workspace(&owner(), "My base", "Table 1", &template)
        .unwrap();
    assert_eq!(base.id, base_again.id);
    assert_eq!(table.id, table_again.id);
    assert_eq!(store.list_bases(&owner()).unwrap().len(), 1);

    let snap = store.get_snapshot(&owner(), table.id, 10).unwrap();
    assert_eq!(column_names(&snap), vec!["Name", "Notes"]);
    assert_eq!(snap.rows.len(), 2);
}

#[test]
fn test_open_path_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("grid.db");
    let table_id = {
        let store = Store::open_path(&path).unwrap();
        let (_, table) = store
            .ensure_workspace(&owner(), "Base", "Table", &TableTemplate::default())
            .unwrap();
        table.id
    };

    let store = Store::open_path(&path).unwrap();
    let snap = store.get_snapshot(&owner(), table_id, 10).unwrap();
    assert_eq!(snap.rows.len(), 3);
}

#[test]
fn test_concurrent_inserts_on_same_anchor_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.db");
    let store = Store::open_path(&path).unwrap();
    let base = store.create_base(&owner(), "Base").unwrap();
    let table = store
        .create_table(
            &owner(),
            base.id,
            "Tasks",
            &TableTemplate {
                columns: vec![
                    ("Name".to_string(), ColumnType::Text),
                    ("Count".to_string(), ColumnType::Number),
                ],
                seed_rows: 2,
            },
        )
        .unwrap();
    let name_id = column_id(&snapshot(&store, &table), "Name");

    // One handle shares the connection, the other opens its own.
    let shared = store.clone();
    let separate = Store::open_path(&path).unwrap();

    let insert_many = |handle: &Store, prefix: &str| -> Vec<String> {
        (0..25)
            .filter_map(|i| {
                handle
                    .insert_column(
                        &owner(),
                        table.id,
                        name_id,
                        InsertPosition::After,
                        &format!("{prefix}{i}"),
                        ColumnType::Text,
                    )
                    .err()
                    .map(|err| err.to_string())
            })
            .collect()
    };
    let errors: Vec<String> = std::thread::scope(|scope| {
        let first = scope.spawn(|| insert_many(&shared, "A"));
        let second = scope.spawn(|| insert_many(&separate, "B"));
        let mut errors = first.join().unwrap();
        errors.extend(second.join().unwrap());
        errors
    });
    assert!(errors.is_empty(), "inserts failed: {errors:?}");

    let after = snapshot(&store, &table);
    assert_eq!(after.columns.len(), 52);
    let orders: Vec<i64> = after.columns.iter().map(|c| c.order).collect();
    assert!(ordering::is_strictly_increasing(&orders));
    assert_eq!(after.columns[0].name, "Name");
    assert_eq!(after.columns[51].name, "Count");
    for row in &after.rows {
        for column in &after.columns {
            assert!(after.cell(row.id, column.id).is_some());
        }
    }
}
