use rusqlite::params;

use crate::error::{GridError, GridResult};
use crate::io::store::{self, Store};
use crate::state::data_model::{self, Cell, CellId, ColumnId, OwnerId, RowId};

impl Store {
    /// Writes a raw input string into the cell at (`row_id`, `column_id`).
    ///
    /// The value is interpreted by the column's type before anything is
    /// written. Exactly one typed field is set; the other is cleared.
    pub fn upsert_cell(
        &self,
        owner: &OwnerId,
        row_id: RowId,
        column_id: ColumnId,
        raw: &str,
    ) -> GridResult<Cell> {
        self.write(|tx| {
            let row = store::authorize_row(tx, owner, row_id)?;
            let column = store::authorize_column(tx, owner, column_id)?;
            if column.table_id != row.table_id {
                return Err(GridError::BadRequest(format!(
                    "column {column_id} does not belong to the table of row {row_id}"
                )));
            }

            let value = data_model::parse_cell_input(column.column_type, raw)?;
            let (text_value, number_value) = value.clone().into_columns();
            tx.execute(
                "INSERT INTO grid_cells (id, row_id, column_id, text_value, number_value)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(row_id, column_id) DO UPDATE SET
                     text_value = excluded.text_value,
                     number_value = excluded.number_value",
                params![CellId::generate(), row_id, column_id, text_value, number_value],
            )?;
            let id: CellId = tx.query_row(
                "SELECT id FROM grid_cells WHERE row_id = ?1 AND column_id = ?2",
                params![row_id, column_id],
                |r| r.get(0),
            )?;

            tracing::debug!("Upserted cell {}:{}", row_id, column_id);
            Ok(Cell {
                id,
                row_id,
                column_id,
                value,
            })
        })
    }
}
