//! Ordered delivery of cell commits to the store.
//!
//! Commits are written one at a time in submission order. After a successful
//! write the worker refetches the snapshot, so the caller only settles the
//! optimistic value once confirmed data that already contains it is in hand.
//! The refetch reads the window as it is when the write lands, not as it was
//! when the edit was queued.

use tokio::sync::mpsc;

use crate::error::{GridError, GridResult};
use crate::io::service::GridService;
use crate::io::window::SnapshotWindow;
use crate::state::data_model::{TableId, TableSnapshot};
use crate::state::edit_session::PendingCommit;

#[derive(Debug)]
struct CommitRequest {
    commit: PendingCommit,
    table_id: TableId,
}

/// Outcome of one commit: the refreshed snapshot, or why the write failed.
#[derive(Debug)]
pub struct CommitResult {
    pub commit: PendingCommit,
    /// Fetch version of the snapshot, from the shared [`SnapshotWindow`].
    pub version: u64,
    pub outcome: GridResult<TableSnapshot>,
}

#[derive(Debug, Clone)]
pub struct CommitQueue {
    tx: mpsc::UnboundedSender<CommitRequest>,
}

#[derive(Debug)]
pub struct CommitWorker {
    rx: mpsc::UnboundedReceiver<CommitRequest>,
    window: SnapshotWindow,
}

pub fn channel(window: SnapshotWindow) -> (CommitQueue, CommitWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommitQueue { tx }, CommitWorker { rx, window })
}

impl CommitQueue {
    pub fn submit(&self, commit: PendingCommit, table_id: TableId) -> GridResult<()> {
        tracing::debug!("Queued commit {:?} for cell {}", commit.ticket, commit.key);
        self.tx
            .send(CommitRequest { commit, table_id })
            .map_err(|_| GridError::Internal("commit worker has stopped".to_string()))
    }
}

impl CommitWorker {
    /// Processes commits until every [`CommitQueue`] handle is dropped.
    pub async fn run(mut self, service: GridService, mut on_result: impl FnMut(CommitResult)) {
        while let Some(request) = self.rx.recv().await {
            let (version, outcome) = write_and_refetch(&service, &self.window, &request).await;
            if let Err(err) = &outcome {
                tracing::warn!("Commit to cell {} failed: {}", request.commit.key, err);
            }
            on_result(CommitResult {
                commit: request.commit,
                version,
                outcome,
            });
        }
        tracing::debug!("Commit worker finished");
    }
}

async fn write_and_refetch(
    service: &GridService,
    window: &SnapshotWindow,
    request: &CommitRequest,
) -> (u64, GridResult<TableSnapshot>) {
    let key = request.commit.key;
    if let Err(err) = service
        .upsert_cell(key.row_id, key.column_id, request.commit.raw.clone())
        .await
    {
        return (0, Err(err));
    }
    let (version, limit) = window.begin_fetch();
    (version, service.get_snapshot(request.table_id, limit).await)
}
