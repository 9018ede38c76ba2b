use rusqlite::{params, Connection};

use crate::error::{GridError, GridResult};
use crate::io::siblings;
use crate::io::store::{self, Store};
use crate::state::data_model::{ColumnId, InsertPosition, OwnerId, Row, RowId, SiblingKind, TableId};
use crate::state::ordering;

impl Store {
    /// Appends an empty row at the bottom of the table.
    pub fn create_row(&self, owner: &OwnerId, table_id: TableId) -> GridResult<Row> {
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            let siblings = siblings::load::<RowId>(tx, SiblingKind::Row, table_id)?;
            let row = Row {
                id: RowId::generate(),
                table_id,
                row_index: ordering::append_index(&siblings),
            };
            insert_with_cells(tx, &row)?;
            tracing::debug!(
                "Appended row {} to table {} at {}",
                row.id,
                table_id,
                row.row_index
            );
            Ok(row)
        })
    }

    /// Inserts an empty row directly above or below `anchor`.
    pub fn insert_row(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        anchor: RowId,
        position: InsertPosition,
    ) -> GridResult<Row> {
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            let siblings = siblings::load::<RowId>(tx, SiblingKind::Row, table_id)?;
            let plan = ordering::plan_insert(&siblings, anchor, position)
                .ok_or_else(|| GridError::not_found("row", anchor))?;

            siblings::apply_shifts(tx, SiblingKind::Row, &plan.shifts)?;
            let row = Row {
                id: RowId::generate(),
                table_id,
                row_index: plan.new_index,
            };
            insert_with_cells(tx, &row)?;
            tracing::debug!(
                "Inserted row {} into table {} at {} ({} shifted)",
                row.id,
                table_id,
                row.row_index,
                plan.shifts.len()
            );
            Ok(row)
        })
    }

    /// Removes a row and its cells. Remaining rows keep their indices.
    pub fn delete_row(&self, owner: &OwnerId, row_id: RowId) -> GridResult<()> {
        self.write(|tx| {
            let row = store::authorize_row(tx, owner, row_id)?;
            tx.execute("DELETE FROM grid_cells WHERE row_id = ?1", params![row_id])?;
            tx.execute("DELETE FROM grid_rows WHERE id = ?1", params![row_id])?;
            tracing::debug!("Deleted row {} from table {}", row_id, row.table_id);
            Ok(())
        })
    }

    pub fn reorder_rows(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        assignments: &[(RowId, i64)],
    ) -> GridResult<Vec<Row>> {
        self.write(|tx| {
            store::authorize_table(tx, owner, table_id)?;
            siblings::reorder(tx, SiblingKind::Row, table_id, assignments)?;
            load_rows(tx, table_id, None)
        })
    }
}

/// Rows of a table in display order, optionally only the first `limit`.
pub(crate) fn load_rows(
    conn: &Connection,
    table_id: TableId,
    limit: Option<usize>,
) -> GridResult<Vec<Row>> {
    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT id, table_id, row_index FROM grid_rows
         WHERE table_id = ?1 ORDER BY row_index LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![table_id, limit], store::row_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn insert_with_cells(conn: &Connection, row: &Row) -> GridResult<()> {
    conn.execute(
        "INSERT INTO grid_rows (id, table_id, row_index) VALUES (?1, ?2, ?3)",
        params![row.id, row.table_id, row.row_index],
    )?;

    let mut stmt = conn.prepare("SELECT id FROM grid_columns WHERE table_id = ?1")?;
    let column_ids = stmt
        .query_map(params![row.table_id], |r| r.get::<_, ColumnId>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for column_id in column_ids {
        store::insert_empty_cell(conn, row.id, column_id)?;
    }
    Ok(())
}
