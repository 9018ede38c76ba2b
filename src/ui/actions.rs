use std::future::Future;

use dioxus::prelude::*;

use crate::error::GridResult;
use crate::io::commit_queue::{CommitQueue, CommitResult};
use crate::io::json_export;
use crate::state::data_model::{ColumnId, ColumnType, InsertPosition, RowId};
use crate::state::edit_session::PendingCommit;
use crate::state::table_state::LeafColumn;
use crate::ui::app::{AppContext, GridSignals};

/// Fetches the current window and replaces the confirmed grid with it.
pub async fn reload(ctx: &AppContext, signals: GridSignals) {
    let GridSignals {
        mut grid,
        mut session,
        mut error_message,
        mut loading,
    } = signals;

    loading.set(true);
    let (version, limit) = ctx.window.begin_fetch();
    match ctx.service.get_snapshot(ctx.table_id, limit).await {
        Ok(snapshot) => {
            if !grid.with_mut(|state| state.replace_if_newer(snapshot, version)) {
                tracing::debug!("Skipped reload {} behind the grid", version);
            }
            let grid = grid.read();
            session.with_mut(|session| session.reconcile(&grid));
            error_message.set(None);
        }
        Err(err) => {
            tracing::warn!("Loading table {} failed: {}", ctx.table_id, err);
            error_message.set(Some(err.to_string()));
        }
    }
    loading.set(false);
}

pub fn apply_commit_result(signals: GridSignals, result: CommitResult) {
    let GridSignals {
        mut grid,
        mut session,
        ..
    } = signals;
    let CommitResult {
        commit,
        version,
        outcome,
    } = result;

    match outcome {
        Ok(snapshot) => {
            if !grid.with_mut(|state| state.replace_if_newer(snapshot, version)) {
                tracing::debug!("Commit refetch {} is older than the grid", version);
            }
            let grid = grid.read();
            session.with_mut(|session| {
                if !session.confirm(&commit) {
                    tracing::debug!("Commit {:?} was superseded", commit.ticket);
                }
                session.reconcile(&grid);
            });
        }
        Err(err) => {
            session.with_mut(|session| session.fail(&commit, err.to_string()));
        }
    }
}

/// Hands a committed edit to the ordered writer.
pub fn submit_commit(
    queue: &CommitQueue,
    ctx: &AppContext,
    signals: GridSignals,
    commit: Option<PendingCommit>,
) {
    let Some(commit) = commit else {
        return;
    };
    if let Err(err) = queue.submit(commit.clone(), ctx.table_id) {
        let mut session = signals.session;
        session.with_mut(|session| session.fail(&commit, err.to_string()));
    }
}

/// Runs a structural change, reports its error if any, then reloads.
async fn mutate<T, F>(ctx: &AppContext, signals: GridSignals, op: F) -> Option<T>
where
    F: Future<Output = GridResult<T>>,
{
    let mut error_message = signals.error_message;
    let out = match op.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("Table {} update failed: {}", ctx.table_id, err);
            error_message.set(Some(err.to_string()));
            None
        }
    };
    if out.is_some() {
        reload(ctx, signals).await;
    }
    out
}

pub fn selected_row(signals: GridSignals) -> Option<RowId> {
    let position = signals.session.read().selection()?;
    signals.grid.read().rows().get(position.row).map(|row| row.id)
}

pub fn selected_column(signals: GridSignals) -> Option<ColumnId> {
    let position = signals.session.read().selection()?;
    match signals.grid.read().leaf_column(position.col)? {
        LeafColumn::Data(column_id) => Some(column_id),
        LeafColumn::Index => None,
    }
}

pub async fn add_row(ctx: AppContext, signals: GridSignals) {
    let service = ctx.service.clone();
    mutate(&ctx, signals, service.create_row(ctx.table_id)).await;
}

pub async fn insert_row(ctx: AppContext, signals: GridSignals, position: InsertPosition) {
    let Some(anchor) = selected_row(signals) else {
        return;
    };
    let service = ctx.service.clone();
    mutate(&ctx, signals, service.insert_row(ctx.table_id, anchor, position)).await;
}

pub async fn delete_row(ctx: AppContext, signals: GridSignals) {
    let Some(row_id) = selected_row(signals) else {
        return;
    };
    let service = ctx.service.clone();
    mutate(&ctx, signals, service.delete_row(row_id)).await;
}

pub async fn add_column(
    ctx: AppContext,
    signals: GridSignals,
    name: String,
    column_type: ColumnType,
    position: Option<InsertPosition>,
) -> bool {
    let service = ctx.service.clone();
    let anchor = selected_column(signals);
    let created = match (position, anchor) {
        (Some(position), Some(anchor)) => {
            mutate(
                &ctx,
                signals,
                service.insert_column(ctx.table_id, anchor, position, name, column_type),
            )
            .await
        }
        _ => {
            mutate(
                &ctx,
                signals,
                service.create_column(ctx.table_id, name, column_type),
            )
            .await
        }
    };
    created.is_some()
}

pub async fn rename_column(ctx: AppContext, signals: GridSignals, name: String) -> bool {
    let Some(column_id) = selected_column(signals) else {
        return false;
    };
    let service = ctx.service.clone();
    mutate(&ctx, signals, service.rename_column(column_id, name))
        .await
        .is_some()
}

pub async fn delete_column(ctx: AppContext, signals: GridSignals) {
    let Some(column_id) = selected_column(signals) else {
        return;
    };
    let service = ctx.service.clone();
    mutate(&ctx, signals, service.delete_column(column_id)).await;
}

/// Grows the window by one page of rows.
pub async fn load_more(ctx: AppContext, signals: GridSignals) {
    if *signals.loading.peek() || !signals.grid.peek().has_more_rows() {
        return;
    }
    let limit = ctx.window.grow(ctx.settings.row_limit);
    tracing::debug!("Loading up to {} rows", limit);
    reload(&ctx, signals).await;
}

pub async fn export_json(ctx: AppContext, signals: GridSignals) {
    let mut error_message = signals.error_message;
    let file_name = signals
        .grid
        .peek()
        .table()
        .map(|table| format!("{}.json", table.name))
        .unwrap_or_else(|| "table.json".to_string());

    let task = rfd::AsyncFileDialog::new()
        .add_filter("JSON", &["json"])
        .set_file_name(file_name)
        .save_file()
        .await;
    let Some(handle) = task else {
        return;
    };
    let path = handle.path().to_path_buf();

    let result = match ctx.service.get_snapshot(ctx.table_id, ctx.window.limit()).await {
        Ok(snapshot) => json_export::save_snapshot_json(&path, &snapshot),
        Err(err) => Err(err),
    };
    match result {
        Ok(_) => error_message.set(None),
        Err(err) => error_message.set(Some(err.to_string())),
    }
}
