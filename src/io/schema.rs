//! SQLite schema and column conversions for the grid store.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use uuid::Uuid;

use crate::state::data_model::{BaseId, CellId, ColumnId, ColumnType, OwnerId, RowId, TableId};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bases (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_bases_owner ON bases(owner_id);

CREATE TABLE IF NOT EXISTS grid_tables (
    id TEXT PRIMARY KEY,
    base_id TEXT NOT NULL REFERENCES bases(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_grid_tables_base ON grid_tables(base_id);

CREATE TABLE IF NOT EXISTS grid_columns (
    id TEXT PRIMARY KEY,
    table_id TEXT NOT NULL REFERENCES grid_tables(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    column_type TEXT NOT NULL CHECK (column_type IN ('TEXT', 'NUMBER')),
    sort_order INTEGER NOT NULL,
    UNIQUE (table_id, sort_order)
);

CREATE TABLE IF NOT EXISTS grid_rows (
    id TEXT PRIMARY KEY,
    table_id TEXT NOT NULL REFERENCES grid_tables(id) ON DELETE CASCADE,
    row_index INTEGER NOT NULL,
    UNIQUE (table_id, row_index)
);

CREATE TABLE IF NOT EXISTS grid_cells (
    id TEXT PRIMARY KEY,
    row_id TEXT NOT NULL REFERENCES grid_rows(id) ON DELETE CASCADE,
    column_id TEXT NOT NULL REFERENCES grid_columns(id) ON DELETE CASCADE,
    text_value TEXT,
    number_value REAL,
    UNIQUE (row_id, column_id),
    CHECK (text_value IS NULL OR number_value IS NULL)
);
CREATE INDEX IF NOT EXISTS idx_grid_cells_column ON grid_cells(column_id);
"#;

/// Creates any missing tables. Safe to run on every open.
pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
}

fn uuid_from_sql(value: ValueRef<'_>) -> FromSqlResult<Uuid> {
    let text = value.as_str()?;
    Uuid::parse_str(text).map_err(|err| FromSqlError::Other(Box::new(err)))
}

macro_rules! sql_id {
    ($($name:ident),* $(,)?) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.0.to_string()))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    uuid_from_sql(value).map($name)
                }
            }
        )*
    };
}

sql_id!(BaseId, TableId, ColumnId, RowId, CellId);

impl ToSql for OwnerId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OwnerId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(OwnerId::new)
    }
}

impl ToSql for ColumnType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ColumnType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        ColumnType::from_code(code).ok_or(FromSqlError::InvalidType)
    }
}
