//! Keyboard handling for the grid.
//!
//! Works over the rows currently materialized in [`TableState`] and its leaf
//! columns. The leading `#` column is never a navigation target.

use crate::state::edit_session::{CellPosition, EditMode, EditSession, PendingCommit};
use crate::state::table_state::TableState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Escape,
    Backspace,
    Char(char),
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyModifiers {
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: GridKey,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(key: GridKey) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn shifted(key: GridKey) -> Self {
        Self {
            key,
            modifiers: KeyModifiers {
                shift: true,
                ..KeyModifiers::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// The key means nothing here; let the platform have it.
    Ignored,
    /// Session state changed; the default action should be suppressed.
    Handled,
    /// Like `Handled`, and an edit was committed that must be written.
    Commit(PendingCommit),
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    fn from_commit(commit: Option<PendingCommit>) -> Self {
        match commit {
            Some(commit) => Self::Commit(commit),
            None => Self::Handled,
        }
    }
}

pub fn handle_key(session: &mut EditSession, grid: &TableState, event: KeyEvent) -> KeyOutcome {
    if session.is_editing() {
        return handle_editing_key(session, grid, event);
    }

    let Some(selected) = session.selection() else {
        return KeyOutcome::Ignored;
    };
    if grid.row_count() == 0 || grid.leaf_count() <= 1 {
        return KeyOutcome::Ignored;
    }

    match event.key {
        GridKey::Char(ch) if !event.modifiers.is_command() => {
            if session.begin_edit(grid, EditMode::Replace, Some(ch)) {
                KeyOutcome::Handled
            } else {
                KeyOutcome::Ignored
            }
        }
        GridKey::Enter => {
            if session.begin_edit(grid, EditMode::Append, None) {
                KeyOutcome::Handled
            } else {
                KeyOutcome::Ignored
            }
        }
        GridKey::Escape => {
            session.clear_selection();
            KeyOutcome::Handled
        }
        key => match step(grid, selected, key, event.modifiers) {
            Some(next) => {
                session.select(next);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        },
    }
}

fn handle_editing_key(
    session: &mut EditSession,
    grid: &TableState,
    event: KeyEvent,
) -> KeyOutcome {
    match event.key {
        GridKey::Escape => {
            session.cancel();
            KeyOutcome::Handled
        }
        GridKey::Enter => KeyOutcome::from_commit(session.commit()),
        GridKey::Tab => {
            let commit = session.commit();
            if let Some(selected) = session.selection() {
                if let Some(next) = step(grid, selected, GridKey::Tab, event.modifiers) {
                    session.select(next);
                }
            }
            KeyOutcome::from_commit(commit)
        }
        GridKey::Backspace => {
            session.backspace();
            KeyOutcome::Handled
        }
        GridKey::Char(ch) if !event.modifiers.is_command() => {
            session.type_char(ch);
            KeyOutcome::Handled
        }
        _ => KeyOutcome::Ignored,
    }
}

/// Where a movement key takes the selection, clamped to the grid.
pub fn step(
    grid: &TableState,
    from: CellPosition,
    key: GridKey,
    modifiers: KeyModifiers,
) -> Option<CellPosition> {
    let last_row = grid.row_count().checked_sub(1)?;
    match key {
        GridKey::ArrowDown => Some(CellPosition::new((from.row + 1).min(last_row), from.col)),
        GridKey::ArrowUp => Some(CellPosition::new(
            from.row.saturating_sub(1).min(last_row),
            from.col,
        )),
        GridKey::Tab if modifiers.shift => {
            Some(CellPosition::new(from.row, previous_data_column(grid, from.col)?))
        }
        GridKey::ArrowRight | GridKey::Tab => {
            Some(CellPosition::new(from.row, next_data_column(grid, from.col)?))
        }
        GridKey::ArrowLeft => {
            Some(CellPosition::new(from.row, previous_data_column(grid, from.col)?))
        }
        _ => None,
    }
}

/// Next data column to the right, or the last data column when already at the edge.
pub fn next_data_column(grid: &TableState, col: usize) -> Option<usize> {
    let found = (col + 1..grid.leaf_count()).find(|idx| grid.is_data_column(*idx));
    found.or_else(|| stay_or(grid, col, last_data_column(grid)))
}

/// Next data column to the left, or the first data column when already at the edge.
pub fn previous_data_column(grid: &TableState, col: usize) -> Option<usize> {
    let found = (0..col).rev().find(|idx| grid.is_data_column(*idx));
    found.or_else(|| stay_or(grid, col, first_data_column(grid)))
}

fn stay_or(grid: &TableState, col: usize, fallback: Option<usize>) -> Option<usize> {
    if grid.is_data_column(col) {
        Some(col)
    } else {
        fallback
    }
}

pub fn first_data_column(grid: &TableState) -> Option<usize> {
    (0..grid.leaf_count()).find(|idx| grid.is_data_column(*idx))
}

pub fn last_data_column(grid: &TableState) -> Option<usize> {
    (0..grid.leaf_count()).rev().find(|idx| grid.is_data_column(*idx))
}
