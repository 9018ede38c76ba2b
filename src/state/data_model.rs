use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GridError, GridResult};

pub const MAX_NAME_LEN: usize = 80;
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number";

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(value: &str) -> Option<Self> {
                Uuid::parse_str(value.trim()).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Owning container of tables.
    BaseId
);
entity_id!(TableId);
entity_id!(ColumnId);
entity_id!(RowId);
entity_id!(CellId);

/// Identity of the caller, as handed over by the session layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
}

impl ColumnType {
    pub fn all() -> &'static [Self] {
        &[Self::Text, Self::Number]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Number => "NUMBER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TEXT" => Some(Self::Text),
            "NUMBER" => Some(Self::Number),
            _ => None,
        }
    }
}

/// Typed content of a cell. An absent cell reads as `Empty`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn number_value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Splits the value into the `(text, number)` storage pair. At most one side is set.
    pub fn into_columns(self) -> (Option<String>, Option<f64>) {
        match self {
            Self::Empty => (None, None),
            Self::Text(text) => (Some(text), None),
            Self::Number(n) => (None, Some(n)),
        }
    }

    pub fn from_columns(
        column_type: ColumnType,
        text: Option<String>,
        number: Option<f64>,
    ) -> Self {
        match column_type {
            ColumnType::Text => text.map(Self::Text).unwrap_or_default(),
            ColumnType::Number => number.map(Self::Number).unwrap_or_default(),
        }
    }
}

/// Formats a cell value for display in the grid and for seeding an editor.
pub fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Number(n) => n.to_string(),
    }
}

/// Interprets raw user input for a column of the given type.
///
/// Input is trimmed and an empty string maps to `Empty`. For NUMBER columns a
/// non-empty string must parse as a finite number.
pub fn parse_cell_input(column_type: ColumnType, raw: &str) -> GridResult<CellValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(CellValue::Empty);
    }

    match column_type {
        ColumnType::Text => Ok(CellValue::Text(trimmed.to_string())),
        ColumnType::Number => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(CellValue::Number(n)),
            _ => Err(GridError::Validation(INVALID_NUMBER_MESSAGE.to_string())),
        },
    }
}

/// Whether `draft` is an acceptable in-progress number: `^-?\d*\.?\d*$`.
pub fn is_numeric_draft(draft: &str) -> bool {
    let rest = draft.strip_prefix('-').unwrap_or(draft);
    let mut seen_dot = false;
    rest.chars().all(|ch| match ch {
        '0'..='9' => true,
        '.' if !seen_dot => {
            seen_dot = true;
            true
        }
        _ => false,
    })
}

/// Whether `ch` can appear anywhere in a draft for this column type. Where
/// it lands is up to the caret, so the whole draft still goes through
/// [`accepts_draft`].
pub fn accepts_char(column_type: ColumnType, ch: char) -> bool {
    match column_type {
        ColumnType::Text => true,
        ColumnType::Number => ch.is_ascii_digit() || ch == '-' || ch == '.',
    }
}

/// Whether `draft` may be held by an editor on a column of this type.
pub fn accepts_draft(column_type: ColumnType, draft: &str) -> bool {
    match column_type {
        ColumnType::Text => true,
        ColumnType::Number => is_numeric_draft(draft),
    }
}

/// Trims a display name and checks it is neither blank nor too long.
pub fn normalize_name(name: &str) -> GridResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GridError::Validation("name must not be blank".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(GridError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub row_id: RowId,
    pub column_id: ColumnId,
}

impl CellKey {
    pub fn new(row_id: RowId, column_id: ColumnId) -> Self {
        Self { row_id, column_id }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row_id, self.column_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiblingKind {
    Column,
    Row,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub id: BaseId,
    pub name: String,
    pub owner_id: OwnerId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub base_id: BaseId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub table_id: TableId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub order: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub table_id: TableId,
    pub row_index: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub row_id: RowId,
    pub column_id: ColumnId,
    pub value: CellValue,
}

impl Cell {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row_id, self.column_id)
    }
}

/// One consistent read of a table: ordered columns, a window of ordered rows
/// and every cell of the rows in that window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table: Table,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub cells: Vec<Cell>,
    pub total_rows: usize,
}

impl TableSnapshot {
    pub fn cell(&self, row_id: RowId, column_id: ColumnId) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|cell| cell.row_id == row_id && cell.column_id == column_id)
    }

    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}
