use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::GridResult;
use crate::state::data_model::{CellValue, TableSnapshot};

/// Column name to value, with keys in column order.
pub type ExportRow = Map<String, Value>;

fn to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => Value::Null,
        CellValue::Text(text) => Value::String(text.clone()),
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    }
}

/// One object per loaded row, keyed by column name, in row order.
pub fn snapshot_rows(snapshot: &TableSnapshot) -> Vec<ExportRow> {
    snapshot
        .rows
        .iter()
        .map(|row| {
            snapshot
                .columns
                .iter()
                .map(|column| {
                    let value = snapshot
                        .cell(row.id, column.id)
                        .map(|cell| to_json(&cell.value))
                        .unwrap_or(Value::Null);
                    (column.name.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Writes the snapshot rows as a pretty-printed JSON array. Returns the row count.
pub fn save_snapshot_json(path: &Path, snapshot: &TableSnapshot) -> GridResult<usize> {
    let rows = snapshot_rows(snapshot);
    let json = serde_json::to_string_pretty(&rows)?;
    write_atomically(path, json.as_bytes())?;
    tracing::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

/// Writes through a temp file in the target directory, then renames over `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
