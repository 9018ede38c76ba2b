use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{GridError, GridResult};
use crate::io::siblings;
use crate::io::store::{self, Store};
use crate::state::data_model::{
    self, Column, ColumnId, ColumnType, InsertPosition, OwnerId, RowId, SiblingKind, TableId,
};
use crate::state::ordering;

impl Store {
    /// Appends a column after every existing one.
    pub fn create_column(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        name: &str,
        column_type: ColumnType,
    ) -> GridResult<Column> {
        let name = data_model::normalize_name(name)?;
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            ensure_unique_name(tx, table_id, &name, None)?;
            let siblings = siblings::load::<ColumnId>(tx, SiblingKind::Column, table_id)?;
            let column = Column {
                id: ColumnId::generate(),
                table_id,
                name,
                column_type,
                order: ordering::append_index(&siblings),
            };
            insert_with_cells(tx, &column)?;
            tracing::debug!(
                "Appended column {} to table {} at {}",
                column.id,
                table_id,
                column.order
            );
            Ok(column)
        })
    }

    /// Inserts a column directly before or after `anchor`, shifting the rest right.
    pub fn insert_column(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        anchor: ColumnId,
        position: InsertPosition,
        name: &str,
        column_type: ColumnType,
    ) -> GridResult<Column> {
        let name = data_model::normalize_name(name)?;
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            let siblings = siblings::load::<ColumnId>(tx, SiblingKind::Column, table_id)?;
            let plan = ordering::plan_insert(&siblings, anchor, position)
                .ok_or_else(|| GridError::not_found("column", anchor))?;
            ensure_unique_name(tx, table_id, &name, None)?;

            siblings::apply_shifts(tx, SiblingKind::Column, &plan.shifts)?;
            let column = Column {
                id: ColumnId::generate(),
                table_id,
                name,
                column_type,
                order: plan.new_index,
            };
            insert_with_cells(tx, &column)?;
            tracing::debug!(
                "Inserted column {} into table {} at {} ({} shifted)",
                column.id,
                table_id,
                column.order,
                plan.shifts.len()
            );
            Ok(column)
        })
    }

    pub fn rename_column(
        &self,
        owner: &OwnerId,
        column_id: ColumnId,
        name: &str,
    ) -> GridResult<Column> {
        let name = data_model::normalize_name(name)?;
        self.write(|tx| {
            let mut column = store::authorize_column(tx, owner, column_id)?;
            ensure_unique_name(tx, column.table_id, &name, Some(column_id))?;
            tx.execute(
                "UPDATE grid_columns SET name = ?1 WHERE id = ?2",
                params![name, column_id],
            )?;
            column.name = name;
            Ok(column)
        })
    }

    /// Removes a column and its cells. Other columns keep their indices.
    pub fn delete_column(&self, owner: &OwnerId, column_id: ColumnId) -> GridResult<()> {
        self.write(|tx| {
            let column = store::authorize_column(tx, owner, column_id)?;
            let removed = tx.execute(
                "DELETE FROM grid_cells WHERE column_id = ?1",
                params![column_id],
            )?;
            tx.execute("DELETE FROM grid_columns WHERE id = ?1", params![column_id])?;
            tracing::debug!(
                "Deleted column {} from table {} with {} cells",
                column_id,
                column.table_id,
                removed
            );
            Ok(())
        })
    }

    /// Assigns new indices to every column of a table in one write.
    pub fn reorder_columns(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        assignments: &[(ColumnId, i64)],
    ) -> GridResult<Vec<Column>> {
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            siblings::reorder(tx, SiblingKind::Column, table_id, assignments)?;
            load_columns(tx, table_id)
        })
    }

    pub fn list_columns(&self, owner: &OwnerId, table_id: TableId) -> GridResult<Vec<Column>> {
        self.read(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            load_columns(tx, table_id)
        })
    }
}

pub(crate) fn load_columns(conn: &Connection, table_id: TableId) -> GridResult<Vec<Column>> {
    let mut stmt = conn.prepare(
        "SELECT id, table_id, name, column_type, sort_order FROM grid_columns
         WHERE table_id = ?1 ORDER BY sort_order",
    )?;
    let columns = stmt
        .query_map(params![table_id], store::column_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn ensure_unique_name(
    conn: &Connection,
    table_id: TableId,
    name: &str,
    except: Option<ColumnId>,
) -> GridResult<()> {
    let clash: Option<ColumnId> = conn
        .query_row(
            "SELECT id FROM grid_columns
             WHERE table_id = ?1 AND lower(name) = lower(?2)
             LIMIT 1",
            params![table_id, name],
            |row| row.get(0),
        )
        .optional()?;
    match clash {
        Some(id) if Some(id) != except => Err(GridError::Conflict(format!(
            "a column named \"{name}\" already exists"
        ))),
        _ => Ok(()),
    }
}

/// Inserts the column and an empty cell for every row of its table.
fn insert_with_cells(conn: &Connection, column: &Column) -> GridResult<()> {
    conn.execute(
        "INSERT INTO grid_columns (id, table_id, name, column_type, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            column.id,
            column.table_id,
            column.name,
            column.column_type,
            column.order
        ],
    )?;

    let mut stmt = conn.prepare("SELECT id FROM grid_rows WHERE table_id = ?1")?;
    let row_ids = stmt
        .query_map(params![column.table_id], |row| row.get::<_, RowId>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for row_id in row_ids {
        store::insert_empty_cell(conn, row_id, column.id)?;
    }
    Ok(())
}
