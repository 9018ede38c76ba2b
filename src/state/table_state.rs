use std::collections::HashMap;

use crate::state::data_model::{
    self, CellKey, CellValue, Column, ColumnId, ColumnType, Row, RowId, Table, TableSnapshot,
};
use crate::state::edit_session::CellPosition;
use crate::state::overlay::{self, ConfirmedRow, PendingOverlay, RenderedRow};

/// A column as laid out in the grid, including the leading row-number column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafColumn {
    Index,
    Data(ColumnId),
}

impl LeafColumn {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

/// Client-side view of the last confirmed snapshot.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TableState {
    table: Option<Table>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    cells: HashMap<CellKey, CellValue>,
    total_rows: usize,
    version: u64,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: TableSnapshot) -> Self {
        let mut state = Self::new();
        state.replace_snapshot(snapshot);
        state
    }

    pub fn replace_snapshot(&mut self, snapshot: TableSnapshot) {
        self.cells = snapshot
            .cells
            .into_iter()
            .map(|cell| (cell.key(), cell.value))
            .collect();
        self.table = Some(snapshot.table);
        self.columns = snapshot.columns;
        self.rows = snapshot.rows;
        self.total_rows = snapshot.total_rows;
    }

    /// Applies `snapshot` unless the grid already holds one from a later
    /// fetch. Returns whether it was applied.
    pub fn replace_if_newer(&mut self, snapshot: TableSnapshot, version: u64) -> bool {
        if version <= self.version {
            return false;
        }
        self.replace_snapshot(snapshot);
        self.version = version;
        true
    }

    /// Fetch version of the snapshot on display, 0 before any versioned load.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn has_more_rows(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn column_type(&self, column_id: ColumnId) -> Option<ColumnType> {
        self.column(column_id).map(|column| column.column_type)
    }

    pub fn row_position(&self, row_id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == row_id)
    }

    /// `#` followed by the data columns in display order.
    pub fn leaf_columns(&self) -> Vec<LeafColumn> {
        std::iter::once(LeafColumn::Index)
            .chain(self.columns.iter().map(|column| LeafColumn::Data(column.id)))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.columns.len() + 1
    }

    pub fn leaf_column(&self, col: usize) -> Option<LeafColumn> {
        match col {
            0 => Some(LeafColumn::Index),
            _ => self
                .columns
                .get(col - 1)
                .map(|column| LeafColumn::Data(column.id)),
        }
    }

    pub fn is_data_column(&self, col: usize) -> bool {
        self.leaf_column(col).is_some_and(|leaf| leaf.is_data())
    }

    /// Leaf index of a data column.
    pub fn leaf_index_of(&self, column_id: ColumnId) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.id == column_id)
            .map(|idx| idx + 1)
    }

    pub fn key_at(&self, position: CellPosition) -> Option<CellKey> {
        let row = self.rows.get(position.row)?;
        match self.leaf_column(position.col)? {
            LeafColumn::Index => None,
            LeafColumn::Data(column_id) => Some(CellKey::new(row.id, column_id)),
        }
    }

    pub fn position_of(&self, key: &CellKey) -> Option<CellPosition> {
        Some(CellPosition::new(
            self.row_position(key.row_id)?,
            self.leaf_index_of(key.column_id)?,
        ))
    }

    pub fn confirmed_value(&self, key: &CellKey) -> CellValue {
        self.cells.get(key).cloned().unwrap_or_default()
    }

    /// The value the grid shows: a pending edit if one exists, else the confirmed value.
    pub fn rendered_value(&self, key: &CellKey, pending: &PendingOverlay) -> CellValue {
        pending
            .value(key)
            .cloned()
            .unwrap_or_else(|| self.confirmed_value(key))
    }

    pub fn cell_display_value(&self, key: &CellKey, pending: &PendingOverlay) -> String {
        data_model::display_value(&self.rendered_value(key, pending))
    }

    pub fn confirmed_rows(&self) -> Vec<ConfirmedRow> {
        self.rows
            .iter()
            .map(|row| ConfirmedRow {
                row_id: row.id,
                row_index: row.row_index,
                values: self
                    .columns
                    .iter()
                    .map(|column| self.confirmed_value(&CellKey::new(row.id, column.id)))
                    .collect(),
            })
            .collect()
    }

    pub fn rendered_rows(&self, pending: &PendingOverlay) -> Vec<RenderedRow> {
        let column_ids: Vec<ColumnId> = self.columns.iter().map(|column| column.id).collect();
        overlay::merge_rows(&self.confirmed_rows(), &column_ids, pending)
    }
}
