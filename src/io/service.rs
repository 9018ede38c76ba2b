//! Async facade over [`Store`] for a single caller.

use tokio::task;

use crate::error::{GridError, GridResult};
use crate::io::store::{Store, TableTemplate};
use crate::state::data_model::{
    Base, BaseId, Cell, Column, ColumnId, ColumnType, InsertPosition, OwnerId, Row, RowId, Table,
    TableId, TableSnapshot,
};

#[derive(Debug, Clone)]
pub struct GridService {
    store: Store,
    owner: OwnerId,
}

impl GridService {
    pub fn new(store: Store, owner: OwnerId) -> Self {
        Self { store, owner }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn blocking<T, F>(&self, f: F) -> GridResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store, &OwnerId) -> GridResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let owner = self.owner.clone();
        task::spawn_blocking(move || f(&store, &owner))
            .await
            .map_err(|err| GridError::Internal(format!("store task failed: {err}")))?
    }

    pub async fn get_snapshot(&self, table_id: TableId, limit: usize) -> GridResult<TableSnapshot> {
        self.blocking(move |store, owner| store.get_snapshot(owner, table_id, limit))
            .await
    }

    pub async fn list_bases(&self) -> GridResult<Vec<Base>> {
        self.blocking(|store, owner| store.list_bases(owner)).await
    }

    pub async fn create_base(&self, name: String) -> GridResult<Base> {
        self.blocking(move |store, owner| store.create_base(owner, &name))
            .await
    }

    pub async fn list_tables(&self, base_id: BaseId) -> GridResult<Vec<Table>> {
        self.blocking(move |store, owner| store.list_tables(owner, base_id))
            .await
    }

    pub async fn create_table(
        &self,
        base_id: BaseId,
        name: String,
        template: TableTemplate,
    ) -> GridResult<Table> {
        self.blocking(move |store, owner| store.create_table(owner, base_id, &name, &template))
            .await
    }

    pub async fn rename_table(&self, table_id: TableId, name: String) -> GridResult<Table> {
        self.blocking(move |store, owner| store.rename_table(owner, table_id, &name))
            .await
    }

    pub async fn delete_table(&self, table_id: TableId) -> GridResult<()> {
        self.blocking(move |store, owner| store.delete_table(owner, table_id))
            .await
    }

    pub async fn create_column(
        &self,
        table_id: TableId,
        name: String,
        column_type: ColumnType,
    ) -> GridResult<Column> {
        self.blocking(move |store, owner| store.create_column(owner, table_id, &name, column_type))
            .await
    }

    pub async fn insert_column(
        &self,
        table_id: TableId,
        anchor: ColumnId,
        position: InsertPosition,
        name: String,
        column_type: ColumnType,
    ) -> GridResult<Column> {
        self.blocking(move |store, owner| {
            store.insert_column(owner, table_id, anchor, position, &name, column_type)
        })
        .await
    }

    pub async fn rename_column(&self, column_id: ColumnId, name: String) -> GridResult<Column> {
        self.blocking(move |store, owner| store.rename_column(owner, column_id, &name))
            .await
    }

    pub async fn delete_column(&self, column_id: ColumnId) -> GridResult<()> {
        self.blocking(move |store, owner| store.delete_column(owner, column_id))
            .await
    }

    pub async fn reorder_columns(
        &self,
        table_id: TableId,
        assignments: Vec<(ColumnId, i64)>,
    ) -> GridResult<Vec<Column>> {
        self.blocking(move |store, owner| store.reorder_columns(owner, table_id, &assignments))
            .await
    }

    pub async fn create_row(&self, table_id: TableId) -> GridResult<Row> {
        self.blocking(move |store, owner| store.create_row(owner, table_id))
            .await
    }

    pub async fn insert_row(
        &self,
        table_id: TableId,
        anchor: RowId,
        position: InsertPosition,
    ) -> GridResult<Row> {
        self.blocking(move |store, owner| store.insert_row(owner, table_id, anchor, position))
            .await
    }

    pub async fn delete_row(&self, row_id: RowId) -> GridResult<()> {
        self.blocking(move |store, owner| store.delete_row(owner, row_id))
            .await
    }

    pub async fn reorder_rows(
        &self,
        table_id: TableId,
        assignments: Vec<(RowId, i64)>,
    ) -> GridResult<Vec<Row>> {
        self.blocking(move |store, owner| store.reorder_rows(owner, table_id, &assignments))
            .await
    }

    pub async fn upsert_cell(
        &self,
        row_id: RowId,
        column_id: ColumnId,
        raw: String,
    ) -> GridResult<Cell> {
        self.blocking(move |store, owner| store.upsert_cell(owner, row_id, column_id, &raw))
            .await
    }
}
