//! Applying ordering plans to the sibling tables.

use rusqlite::types::{FromSql, ToSql};
use rusqlite::{params, Connection};

use crate::error::{GridError, GridResult};
use crate::state::data_model::{SiblingKind, TableId};
use crate::state::ordering::{self, Shift, Sibling};

fn table_and_field(kind: SiblingKind) -> (&'static str, &'static str) {
    match kind {
        SiblingKind::Column => ("grid_columns", "sort_order"),
        SiblingKind::Row => ("grid_rows", "row_index"),
    }
}

/// All siblings of `kind` in a table, lowest index first.
pub(crate) fn load<Id: FromSql>(
    conn: &Connection,
    kind: SiblingKind,
    table_id: TableId,
) -> GridResult<Vec<Sibling<Id>>> {
    let (table, field) = table_and_field(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {field} FROM {table} WHERE table_id = ?1 ORDER BY {field}"
    ))?;
    let siblings = stmt
        .query_map(params![table_id], |row| {
            Ok(Sibling {
                id: row.get(0)?,
                index: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(siblings)
}

/// Writes shifts one statement at a time, in the order given.
pub(crate) fn apply_shifts<Id: ToSql>(
    conn: &Connection,
    kind: SiblingKind,
    shifts: &[Shift<Id>],
) -> GridResult<()> {
    let (table, field) = table_and_field(kind);
    let mut stmt = conn.prepare(&format!("UPDATE {table} SET {field} = ?1 WHERE id = ?2"))?;
    for shift in shifts {
        stmt.execute(params![shift.to, shift.id])?;
    }
    Ok(())
}

/// Applies a validated full reassignment of a table's siblings.
///
/// Moved siblings are parked on negative indices first so no intermediate
/// state holds the same index twice.
pub(crate) fn reorder<Id>(
    conn: &Connection,
    kind: SiblingKind,
    table_id: TableId,
    assignments: &[(Id, i64)],
) -> GridResult<usize>
where
    Id: FromSql + ToSql + Copy + Ord + std::fmt::Display,
{
    let siblings = load::<Id>(conn, kind, table_id)?;
    let shifts = ordering::plan_reorder(&siblings, assignments)
        .map_err(|err| GridError::BadRequest(err.to_string()))?;

    let parked: Vec<Shift<Id>> = shifts
        .iter()
        .enumerate()
        .map(|(slot, shift)| Shift {
            id: shift.id,
            from: shift.from,
            to: -(slot as i64) - 1,
        })
        .collect();
    apply_shifts(conn, kind, &parked)?;
    apply_shifts(conn, kind, &shifts)?;

    tracing::debug!(
        "Reordered {} of {} {:?} siblings in table {}",
        shifts.len(),
        siblings.len(),
        kind,
        table_id
    );
    Ok(shifts.len())
}
