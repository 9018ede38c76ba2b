//! SQLite-backed persistence for bases, tables, columns, rows and cells.
//!
//! Every mutation runs inside one `BEGIN IMMEDIATE` transaction on a single
//! guarded connection, so writes that shift sibling indices are serialized
//! and either land completely or not at all.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{GridError, GridResult};
use crate::io::schema;
use crate::state::data_model::{
    self, Base, BaseId, Column, ColumnId, ColumnType, OwnerId, Row, RowId, Table, TableId,
};

/// Columns and seed rows given to a freshly created table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableTemplate {
    pub columns: Vec<(String, ColumnType)>,
    pub seed_rows: usize,
}

impl Default for TableTemplate {
    fn default() -> Self {
        Self {
            columns: vec![
                ("Name".to_string(), ColumnType::Text),
                ("Notes".to_string(), ColumnType::Text),
            ],
            seed_rows: 3,
        }
    }
}

impl TableTemplate {
    pub fn with_seed_rows(seed_rows: usize) -> Self {
        Self {
            seed_rows,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open_path(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            tracing::warn!(
                "Could not enable WAL on {}; journal mode is {}",
                path.display(),
                journal_mode
            );
        }
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        tracing::info!("Opened grid store at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> GridResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> GridResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| GridError::Internal("store connection mutex poisoned".to_string()))
    }

    /// Runs `f` in an immediate transaction. Any error rolls everything back.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> GridResult<T>,
    ) -> GridResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Runs `f` in a read transaction so all its queries see one state.
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> GridResult<T>,
    ) -> GridResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    pub fn create_base(&self, owner: &OwnerId, name: &str) -> GridResult<Base> {
        let name = data_model::normalize_name(name)?;
        check_owner(owner)?;
        self.write(|tx| {
            let base = Base {
                id: BaseId::generate(),
                name,
                owner_id: owner.clone(),
            };
            tx.execute(
                "INSERT INTO bases (id, name, owner_id) VALUES (?1, ?2, ?3)",
                params![base.id, base.name, base.owner_id],
            )?;
            tracing::debug!("Created base {} for {}", base.id, owner);
            Ok(base)
        })
    }

    pub fn list_bases(&self, owner: &OwnerId) -> GridResult<Vec<Base>> {
        self.read(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id, name, owner_id FROM bases WHERE owner_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let bases = stmt
                .query_map(params![owner], |row| {
                    Ok(Base {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        owner_id: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(bases)
        })
    }

    /// Creates a table with the template's columns and empty seed rows.
    pub fn create_table(
        &self,
        owner: &OwnerId,
        base_id: BaseId,
        name: &str,
        template: &TableTemplate,
    ) -> GridResult<Table> {
        let name = data_model::normalize_name(name)?;
        self.write(|tx| create_table_in(tx, owner, base_id, name, template))
    }

    pub fn list_tables(&self, owner: &OwnerId, base_id: BaseId) -> GridResult<Vec<Table>> {
        self.read(|tx| {
            authorize_base(tx, owner, base_id)?;
            let mut stmt = tx.prepare(
                "SELECT id, base_id, name FROM grid_tables WHERE base_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let tables = stmt
                .query_map(params![base_id], table_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tables)
        })
    }

    pub fn rename_table(&self, owner: &OwnerId, table_id: TableId, name: &str) -> GridResult<Table> {
        let name = data_model::normalize_name(name)?;
        self.write(|tx| {
            let mut table = authorize_table(tx, owner, table_id)?;
            tx.execute(
                "UPDATE grid_tables SET name = ?1 WHERE id = ?2",
                params![name, table_id],
            )?;
            table.name = name;
            Ok(table)
        })
    }

    /// Deletes a table together with its columns, rows and cells.
    pub fn delete_table(&self, owner: &OwnerId, table_id: TableId) -> GridResult<()> {
        self.write(|tx| {
            authorize_table(tx, owner, table_id)?;
            tx.execute(
                "DELETE FROM grid_cells WHERE row_id IN (SELECT id FROM grid_rows WHERE table_id = ?1)",
                params![table_id],
            )?;
            tx.execute("DELETE FROM grid_rows WHERE table_id = ?1", params![table_id])?;
            tx.execute("DELETE FROM grid_columns WHERE table_id = ?1", params![table_id])?;
            tx.execute("DELETE FROM grid_tables WHERE id = ?1", params![table_id])?;
            tracing::debug!("Deleted table {}", table_id);
            Ok(())
        })
    }

    /// First base and table of `owner`, created on first use.
    pub fn ensure_workspace(
        &self,
        owner: &OwnerId,
        base_name: &str,
        table_name: &str,
        template: &TableTemplate,
    ) -> GridResult<(Base, Table)> {
        let base_name = data_model::normalize_name(base_name)?;
        let table_name = data_model::normalize_name(table_name)?;
        check_owner(owner)?;
        self.write(|tx| {
            let existing = tx
                .query_row(
                    "SELECT id, name, owner_id FROM bases WHERE owner_id = ?1
                     ORDER BY created_at, rowid LIMIT 1",
                    params![owner],
                    |row| {
                        Ok(Base {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            owner_id: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            let base = match existing {
                Some(base) => base,
                None => {
                    let base = Base {
                        id: BaseId::generate(),
                        name: base_name,
                        owner_id: owner.clone(),
                    };
                    tx.execute(
                        "INSERT INTO bases (id, name, owner_id) VALUES (?1, ?2, ?3)",
                        params![base.id, base.name, base.owner_id],
                    )?;
                    tracing::info!("Created workspace base {} for {}", base.id, owner);
                    base
                }
            };

            let table = tx
                .query_row(
                    "SELECT id, base_id, name FROM grid_tables WHERE base_id = ?1
                     ORDER BY created_at, rowid LIMIT 1",
                    params![base.id],
                    table_from_row,
                )
                .optional()?;
            let table = match table {
                Some(table) => table,
                None => create_table_in(tx, owner, base.id, table_name, template)?,
            };
            Ok((base, table))
        })
    }
}

fn check_owner(owner: &OwnerId) -> GridResult<()> {
    if owner.as_str().trim().is_empty() {
        return Err(GridError::Unauthorized("anonymous caller".to_string()));
    }
    Ok(())
}

fn create_table_in(
    tx: &Transaction<'_>,
    owner: &OwnerId,
    base_id: BaseId,
    name: String,
    template: &TableTemplate,
) -> GridResult<Table> {
    authorize_base(tx, owner, base_id)?;
    let table = Table {
        id: TableId::generate(),
        base_id,
        name,
    };
    tx.execute(
        "INSERT INTO grid_tables (id, base_id, name) VALUES (?1, ?2, ?3)",
        params![table.id, table.base_id, table.name],
    )?;

    let mut column_ids = Vec::with_capacity(template.columns.len());
    for (order, (column_name, column_type)) in template.columns.iter().enumerate() {
        let column_name = data_model::normalize_name(column_name)?;
        let id = ColumnId::generate();
        tx.execute(
            "INSERT INTO grid_columns (id, table_id, name, column_type, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, table.id, column_name, column_type, order as i64],
        )?;
        column_ids.push(id);
    }

    for row_index in 0..template.seed_rows {
        let row_id = RowId::generate();
        tx.execute(
            "INSERT INTO grid_rows (id, table_id, row_index) VALUES (?1, ?2, ?3)",
            params![row_id, table.id, row_index as i64],
        )?;
        for column_id in &column_ids {
            insert_empty_cell(tx, row_id, *column_id)?;
        }
    }

    tracing::debug!(
        "Created table {} with {} columns and {} rows",
        table.id,
        column_ids.len(),
        template.seed_rows
    );
    Ok(table)
}

pub(crate) fn insert_empty_cell(
    conn: &Connection,
    row_id: RowId,
    column_id: ColumnId,
) -> GridResult<()> {
    conn.execute(
        "INSERT INTO grid_cells (id, row_id, column_id, text_value, number_value)
         VALUES (?1, ?2, ?3, NULL, NULL)",
        params![data_model::CellId::generate(), row_id, column_id],
    )?;
    Ok(())
}

fn table_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Table> {
    Ok(Table {
        id: row.get(0)?,
        base_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn ensure_owner(owner: &OwnerId, actual: &OwnerId, what: &str) -> GridResult<()> {
    if owner != actual {
        return Err(GridError::Unauthorized(what.to_string()));
    }
    Ok(())
}

pub(crate) fn authorize_base(conn: &Connection, owner: &OwnerId, base_id: BaseId) -> GridResult<Base> {
    let base = conn
        .query_row(
            "SELECT id, name, owner_id FROM bases WHERE id = ?1",
            params![base_id],
            |row| {
                Ok(Base {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner_id: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| GridError::not_found("base", base_id))?;
    ensure_owner(owner, &base.owner_id, &format!("base {base_id}"))?;
    Ok(base)
}

pub(crate) fn authorize_table(
    conn: &Connection,
    owner: &OwnerId,
    table_id: TableId,
) -> GridResult<Table> {
    let (table, owner_id) = conn
        .query_row(
            "SELECT t.id, t.base_id, t.name, b.owner_id
             FROM grid_tables t JOIN bases b ON b.id = t.base_id
             WHERE t.id = ?1",
            params![table_id],
            |row| Ok((table_from_row(row)?, row.get::<_, OwnerId>(3)?)),
        )
        .optional()?
        .ok_or_else(|| GridError::not_found("table", table_id))?;
    ensure_owner(owner, &owner_id, &format!("table {table_id}"))?;
    Ok(table)
}

pub(crate) fn column_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get(0)?,
        table_id: row.get(1)?,
        name: row.get(2)?,
        column_type: row.get(3)?,
        order: row.get(4)?,
    })
}

pub(crate) fn row_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok(Row {
        id: row.get(0)?,
        table_id: row.get(1)?,
        row_index: row.get(2)?,
    })
}

pub(crate) fn authorize_column(
    conn: &Connection,
    owner: &OwnerId,
    column_id: ColumnId,
) -> GridResult<Column> {
    let (column, owner_id) = conn
        .query_row(
            "SELECT c.id, c.table_id, c.name, c.column_type, c.sort_order, b.owner_id
             FROM grid_columns c
             JOIN grid_tables t ON t.id = c.table_id
             JOIN bases b ON b.id = t.base_id
             WHERE c.id = ?1",
            params![column_id],
            |row| Ok((column_from_row(row)?, row.get::<_, OwnerId>(5)?)),
        )
        .optional()?
        .ok_or_else(|| GridError::not_found("column", column_id))?;
    ensure_owner(owner, &owner_id, &format!("column {column_id}"))?;
    Ok(column)
}

pub(crate) fn authorize_row(conn: &Connection, owner: &OwnerId, row_id: RowId) -> GridResult<Row> {
    let (row, owner_id) = conn
        .query_row(
            "SELECT r.id, r.table_id, r.row_index, b.owner_id
             FROM grid_rows r
             JOIN grid_tables t ON t.id = r.table_id
             JOIN bases b ON b.id = t.base_id
             WHERE r.id = ?1",
            params![row_id],
            |row| Ok((row_from_row(row)?, row.get::<_, OwnerId>(3)?)),
        )
        .optional()?
        .ok_or_else(|| GridError::not_found("row", row_id))?;
    ensure_owner(owner, &owner_id, &format!("row {row_id}"))?;
    Ok(row)
}
