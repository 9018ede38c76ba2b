//! Per-grid selection and cell editing.
//!
//! The session is synchronous. A commit only records the new value in the
//! pending overlay and hands back a [`PendingCommit`]; whoever runs the write
//! reports the outcome through [`EditSession::confirm`] or [`EditSession::fail`].

use crate::state::data_model::{self, CellKey, CellValue, ColumnType};
use crate::state::overlay::{CommitTicket, PendingOverlay};
use crate::state::table_state::TableState;

/// Position in the materialized grid: row within the loaded window, leaf column index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditMode {
    /// Draft starts from the typed key; the old value is discarded.
    Replace,
    /// Draft starts from the value currently shown.
    Append,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEdit {
    pub position: CellPosition,
    pub key: CellKey,
    pub column_type: ColumnType,
    pub mode: EditMode,
    pub draft: String,
    pub original: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Selected(CellPosition),
    Editing(ActiveEdit),
}

/// A write the caller must send to the store.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingCommit {
    pub ticket: CommitTicket,
    pub key: CellKey,
    pub raw: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineError {
    pub key: CellKey,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditSession {
    state: SessionState,
    overlay: PendingOverlay,
    last_ticket: u64,
    error: Option<InlineError>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> Option<CellPosition> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Selected(position) => Some(*position),
            SessionState::Editing(edit) => Some(edit.position),
        }
    }

    pub fn editing(&self) -> Option<&ActiveEdit> {
        match &self.state {
            SessionState::Editing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing().is_some()
    }

    pub fn draft(&self) -> Option<&str> {
        self.editing().map(|edit| edit.draft.as_str())
    }

    pub fn overlay(&self) -> &PendingOverlay {
        &self.overlay
    }

    pub fn error(&self) -> Option<&InlineError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Selects a cell. An open edit is committed first, as when its input loses focus.
    pub fn select(&mut self, position: CellPosition) -> Option<PendingCommit> {
        let commit = self.commit();
        self.state = SessionState::Selected(position);
        commit
    }

    pub fn clear_selection(&mut self) {
        self.state = SessionState::Idle;
    }

    pub fn double_click(
        &mut self,
        grid: &TableState,
        position: CellPosition,
    ) -> Option<PendingCommit> {
        let commit = self.select(position);
        self.begin_edit(grid, EditMode::Append, None);
        commit
    }

    /// Opens an editor on the selected cell.
    ///
    /// Returns `false` when nothing is selected, the selection is not a data
    /// cell, or a replace seed is not acceptable input for the column.
    pub fn begin_edit(&mut self, grid: &TableState, mode: EditMode, seed: Option<char>) -> bool {
        let SessionState::Selected(position) = self.state else {
            return false;
        };
        let Some(key) = grid.key_at(position) else {
            return false;
        };
        let Some(column_type) = grid.column_type(key.column_id) else {
            return false;
        };

        let original = grid.cell_display_value(&key, &self.overlay);
        let draft = match mode {
            EditMode::Append => original.clone(),
            EditMode::Replace => {
                let draft = seed.map(String::from).unwrap_or_default();
                if !data_model::accepts_draft(column_type, &draft) {
                    return false;
                }
                draft
            }
        };

        self.error = None;
        self.state = SessionState::Editing(ActiveEdit {
            position,
            key,
            column_type,
            mode,
            draft,
            original,
        });
        true
    }

    /// Replaces the draft. Input a NUMBER column cannot hold is rejected and
    /// the draft is left as it was.
    pub fn set_draft(&mut self, text: &str) -> bool {
        let SessionState::Editing(edit) = &mut self.state else {
            return false;
        };
        if !data_model::accepts_draft(edit.column_type, text) {
            return false;
        }
        edit.draft = text.to_string();
        true
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        let Some(mut next) = self.draft().map(str::to_string) else {
            return false;
        };
        next.push(ch);
        self.set_draft(&next)
    }

    pub fn backspace(&mut self) -> bool {
        let Some(mut next) = self.draft().map(str::to_string) else {
            return false;
        };
        if next.pop().is_none() {
            return false;
        }
        self.set_draft(&next)
    }

    /// Drops the draft and returns to the selected cell.
    pub fn cancel(&mut self) -> bool {
        let SessionState::Editing(edit) = &self.state else {
            return false;
        };
        self.state = SessionState::Selected(edit.position);
        true
    }

    /// Closes the editor, keeping the cell selected.
    ///
    /// An unchanged draft produces no write. Otherwise the value goes into the
    /// pending overlay right away and the returned commit must be sent.
    pub fn commit(&mut self) -> Option<PendingCommit> {
        let edit = match std::mem::take(&mut self.state) {
            SessionState::Editing(edit) => edit,
            other => {
                self.state = other;
                return None;
            }
        };
        self.state = SessionState::Selected(edit.position);

        if edit.draft == edit.original {
            return None;
        }

        self.last_ticket += 1;
        let ticket = CommitTicket(self.last_ticket);
        let value = data_model::parse_cell_input(edit.column_type, &edit.draft)
            .unwrap_or_else(|_| CellValue::Text(edit.draft.trim().to_string()));
        self.overlay.put(edit.key, value, ticket);

        Some(PendingCommit {
            ticket,
            key: edit.key,
            raw: edit.draft,
        })
    }

    /// The store accepted `commit` and the grid holds a snapshot taken after it.
    pub fn confirm(&mut self, commit: &PendingCommit) -> bool {
        self.overlay.settle(&commit.key, commit.ticket)
    }

    /// The store rejected `commit`. The cell falls back to its confirmed value
    /// unless a later commit to it is still pending.
    pub fn fail(&mut self, commit: &PendingCommit, message: impl Into<String>) {
        self.overlay.settle(&commit.key, commit.ticket);
        self.error = Some(InlineError {
            key: commit.key,
            message: message.into(),
        });
    }

    /// Keeps the selection inside a grid whose window or columns changed.
    ///
    /// An edit follows its cell; if the cell left the window the edit is dropped.
    pub fn reconcile(&mut self, grid: &TableState) {
        let next = match &self.state {
            SessionState::Idle => return,
            SessionState::Selected(position) => clamp_selection(grid, *position),
            SessionState::Editing(edit) => match grid.position_of(&edit.key) {
                Some(position) => {
                    let mut edit = edit.clone();
                    edit.position = position;
                    SessionState::Editing(edit)
                }
                None => clamp_selection(grid, edit.position),
            },
        };
        self.state = next;
    }
}

fn clamp_selection(grid: &TableState, position: CellPosition) -> SessionState {
    if grid.row_count() == 0 || grid.leaf_count() <= 1 {
        return SessionState::Idle;
    }
    let row = position.row.min(grid.row_count() - 1);
    let col = position.col.clamp(1, grid.leaf_count() - 1);
    SessionState::Selected(CellPosition::new(row, col))
}
