use std::collections::HashMap;

use crate::state::data_model::{CellKey, CellValue, ColumnId, RowId};

/// Identifies one commit attempt. Later commits get larger tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitTicket(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct PendingValue {
    pub value: CellValue,
    pub ticket: CommitTicket,
}

/// Unconfirmed cell values shown on top of fetched data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingOverlay {
    entries: HashMap<CellKey, PendingValue>,
}

impl PendingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &CellKey) -> Option<&PendingValue> {
        self.entries.get(key)
    }

    pub fn value(&self, key: &CellKey) -> Option<&CellValue> {
        self.entries.get(key).map(|pending| &pending.value)
    }

    /// Records a value for `key`, replacing whatever an earlier commit left there.
    pub fn put(&mut self, key: CellKey, value: CellValue, ticket: CommitTicket) {
        self.entries.insert(key, PendingValue { value, ticket });
    }

    /// Removes the entry for `key` only if it still belongs to `ticket`.
    pub fn settle(&mut self, key: &CellKey, ticket: CommitTicket) -> bool {
        match self.entries.get(key) {
            Some(pending) if pending.ticket == ticket => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A row as confirmed by the store, values aligned with the ordered columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmedRow {
    pub row_id: RowId,
    pub row_index: i64,
    pub values: Vec<CellValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRow {
    pub row_id: RowId,
    pub row_index: i64,
    pub values: Vec<CellValue>,
    pub pending: Vec<bool>,
}

/// Merges pending edits over confirmed rows.
///
/// Pure: the same inputs always give the same rows, so it can be re-run on
/// every render pass.
pub fn merge_rows(
    confirmed: &[ConfirmedRow],
    column_ids: &[ColumnId],
    overlay: &PendingOverlay,
) -> Vec<RenderedRow> {
    confirmed
        .iter()
        .map(|row| {
            let mut values = row.values.clone();
            let mut pending = vec![false; values.len()];
            for (idx, column_id) in column_ids.iter().enumerate() {
                let key = CellKey::new(row.row_id, *column_id);
                if let (Some(value), Some(slot)) = (overlay.value(&key), values.get_mut(idx)) {
                    *slot = value.clone();
                    if let Some(flag) = pending.get_mut(idx) {
                        *flag = true;
                    }
                }
            }
            RenderedRow {
                row_id: row.row_id,
                row_index: row.row_index,
                values,
                pending,
            }
        })
        .collect()
}
