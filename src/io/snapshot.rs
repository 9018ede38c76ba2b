use rusqlite::params;

use crate::error::GridResult;
use crate::io::columns::load_columns;
use crate::io::rows::load_rows;
use crate::io::store::{self, Store};
use crate::state::data_model::{Cell, CellValue, ColumnType, OwnerId, TableId, TableSnapshot};

impl Store {
    /// Reads a table, its ordered columns, the first `limit` rows and their cells
    /// as one consistent view.
    pub fn get_snapshot(
        &self,
        owner: &OwnerId,
        table_id: TableId,
        limit: usize,
    ) -> GridResult<TableSnapshot> {
        self.read(|tx| {
            let table = store::authorize_table(tx, owner, table_id)?;
            let columns = load_columns(tx, table_id)?;
            let rows = load_rows(tx, table_id, Some(limit))?;
            let total_rows: i64 = tx.query_row(
                "SELECT COUNT(*) FROM grid_rows WHERE table_id = ?1",
                params![table_id],
                |row| row.get(0),
            )?;

            let mut stmt = tx.prepare(
                "SELECT c.id, c.row_id, c.column_id, c.text_value, c.number_value, col.column_type
                 FROM grid_cells c
                 JOIN grid_columns col ON col.id = c.column_id
                 WHERE c.row_id IN (
                     SELECT id FROM grid_rows WHERE table_id = ?1
                     ORDER BY row_index LIMIT ?2
                 )",
            )?;
            let cells = stmt
                .query_map(params![table_id, limit as i64], |row| {
                    let column_type: ColumnType = row.get(5)?;
                    Ok(Cell {
                        id: row.get(0)?,
                        row_id: row.get(1)?,
                        column_id: row.get(2)?,
                        value: CellValue::from_columns(column_type, row.get(3)?, row.get(4)?),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(TableSnapshot {
                table,
                columns,
                rows,
                cells,
                total_rows: total_rows.max(0) as usize,
            })
        })
    }
}
