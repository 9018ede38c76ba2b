use gridbase::error::ErrorKind;
use gridbase::state::data_model::{
    self, CellKey, CellValue, ColumnId, ColumnType, RowId, INVALID_NUMBER_MESSAGE,
};

#[test]
fn test_parse_number_input() {
    let value = data_model::parse_cell_input(ColumnType::Number, " 42 ").unwrap();
    assert_eq!(value, CellValue::Number(42.0));
    assert_eq!(value.number_value(), Some(42.0));
    assert_eq!(value.text_value(), None);
}

#[test]
fn test_parse_empty_input_is_empty_for_both_types() {
    assert_eq!(
        data_model::parse_cell_input(ColumnType::Number, "   ").unwrap(),
        CellValue::Empty
    );
    assert_eq!(
        data_model::parse_cell_input(ColumnType::Text, "").unwrap(),
        CellValue::Empty
    );
}

#[test]
fn test_parse_invalid_number_is_validation_error() {
    let err = data_model::parse_cell_input(ColumnType::Number, "abc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), INVALID_NUMBER_MESSAGE);

    let err = data_model::parse_cell_input(ColumnType::Number, "inf").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_parse_text_is_trimmed() {
    assert_eq!(
        data_model::parse_cell_input(ColumnType::Text, "  hello world ").unwrap(),
        CellValue::Text("hello world".to_string())
    );
}

#[test]
fn test_storage_columns_are_exclusive() {
    assert_eq!(CellValue::Text("a".into()).into_columns(), (Some("a".into()), None));
    assert_eq!(CellValue::Number(1.5).into_columns(), (None, Some(1.5)));
    assert_eq!(CellValue::Empty.into_columns(), (None, None));
}

#[test]
fn test_from_columns_follows_column_type() {
    let value = CellValue::from_columns(ColumnType::Number, Some("stale".into()), Some(3.0));
    assert_eq!(value, CellValue::Number(3.0));
    let value = CellValue::from_columns(ColumnType::Text, None, None);
    assert_eq!(value, CellValue::Empty);
}

#[test]
fn test_accepts_draft_only_filters_numbers() {
    assert!(data_model::accepts_draft(ColumnType::Text, "anything at all"));
    assert!(data_model::accepts_draft(ColumnType::Number, "-3.5"));
    assert!(!data_model::accepts_draft(ColumnType::Number, "3x"));
}

#[test]
fn test_accepts_char_ignores_caret_position() {
    // Typed in front of "12" these are fine even though "12-" is not.
    assert!(data_model::accepts_char(ColumnType::Number, '-'));
    assert!(!data_model::accepts_draft(ColumnType::Number, "12-"));
    assert!(data_model::accepts_draft(ColumnType::Number, "-12"));

    assert!(data_model::accepts_char(ColumnType::Number, '.'));
    assert!(data_model::accepts_char(ColumnType::Number, '7'));
    assert!(!data_model::accepts_char(ColumnType::Number, 'e'));
    assert!(!data_model::accepts_char(ColumnType::Number, ' '));
    assert!(data_model::accepts_char(ColumnType::Text, 'e'));
}

#[test]
fn test_normalize_name() {
    assert_eq!(data_model::normalize_name("  Notes ").unwrap(), "Notes");
    assert_eq!(
        data_model::normalize_name("   ").unwrap_err().kind(),
        ErrorKind::Validation
    );
    let long = "x".repeat(data_model::MAX_NAME_LEN + 1);
    assert_eq!(
        data_model::normalize_name(&long).unwrap_err().kind(),
        ErrorKind::Validation
    );
    let exact = "y".repeat(data_model::MAX_NAME_LEN);
    assert!(data_model::normalize_name(&exact).is_ok());
}

#[test]
fn test_cell_key_display_and_ids() {
    let row_id = RowId::generate();
    let column_id = ColumnId::generate();
    let key = CellKey::new(row_id, column_id);
    assert_eq!(key.to_string(), format!("{row_id}:{column_id}"));
    assert_eq!(RowId::parse(&row_id.to_string()), Some(row_id));
    assert_eq!(RowId::parse("not-a-uuid"), None);
    assert_ne!(RowId::generate(), RowId::generate());
}

#[test]
fn test_column_type_codes() {
    for kind in ColumnType::all() {
        assert_eq!(ColumnType::from_code(kind.as_str()), Some(*kind));
    }
    assert_eq!(ColumnType::from_code("DATE"), None);
    assert_eq!(
        serde_json::to_string(&ColumnType::Number).unwrap(),
        "\"NUMBER\""
    );
}
