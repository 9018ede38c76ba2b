//! Positional ordering of sibling sets (columns of a table, rows of a table).
//!
//! Planning is pure: callers load the siblings, ask for a plan, and apply it
//! inside a single transaction. Shifts are always listed highest index first,
//! so applying them one by one never writes an index another sibling still holds.

use std::collections::{BTreeMap, BTreeSet};

use crate::state::data_model::InsertPosition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sibling<Id> {
    pub id: Id,
    pub index: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift<Id> {
    pub id: Id,
    pub from: i64,
    pub to: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertPlan<Id> {
    pub new_index: i64,
    pub shifts: Vec<Shift<Id>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReorderError {
    UnknownSibling(String),
    DuplicateSibling(String),
    MissingSibling(String),
    NegativeIndex(i64),
    DuplicateIndex(i64),
}

impl std::fmt::Display for ReorderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSibling(id) => write!(f, "{id} does not belong to this table"),
            Self::DuplicateSibling(id) => write!(f, "{id} is listed more than once"),
            Self::MissingSibling(id) => write!(f, "{id} is missing from the new order"),
            Self::NegativeIndex(index) => write!(f, "index {index} is negative"),
            Self::DuplicateIndex(index) => write!(f, "index {index} is assigned twice"),
        }
    }
}

fn sorted<Id: Copy>(siblings: &[Sibling<Id>]) -> Vec<Sibling<Id>> {
    let mut out = siblings.to_vec();
    out.sort_by_key(|sibling| sibling.index);
    out
}

/// Index for a sibling appended after every existing one.
///
/// Equal to the sibling count while the set is dense; after deletes it stays
/// past the current maximum.
pub fn append_index<Id>(siblings: &[Sibling<Id>]) -> i64 {
    siblings
        .iter()
        .map(|sibling| sibling.index + 1)
        .max()
        .unwrap_or(0)
}

/// Plans an insert next to `anchor`. Returns `None` when the anchor is not in the set.
pub fn plan_insert<Id: Copy + PartialEq>(
    siblings: &[Sibling<Id>],
    anchor: Id,
    position: InsertPosition,
) -> Option<InsertPlan<Id>> {
    let ordered = sorted(siblings);
    let anchor_index = ordered.iter().find(|sibling| sibling.id == anchor)?.index;
    let new_index = match position {
        InsertPosition::Before => anchor_index,
        InsertPosition::After => anchor_index + 1,
    };

    let shifts = ordered
        .iter()
        .rev()
        .filter(|sibling| sibling.index >= new_index)
        .map(|sibling| Shift {
            id: sibling.id,
            from: sibling.index,
            to: sibling.index + 1,
        })
        .collect();

    Some(InsertPlan { new_index, shifts })
}

/// Applies a plan to a snapshot list and returns the resulting ordering.
pub fn apply_insert<Id: Copy + PartialEq>(
    siblings: &[Sibling<Id>],
    plan: &InsertPlan<Id>,
    new_id: Id,
) -> Vec<Sibling<Id>> {
    let mut out: Vec<Sibling<Id>> = siblings
        .iter()
        .map(|sibling| {
            let index = plan
                .shifts
                .iter()
                .find(|shift| shift.id == sibling.id)
                .map(|shift| shift.to)
                .unwrap_or(sibling.index);
            Sibling {
                id: sibling.id,
                index,
            }
        })
        .collect();
    out.push(Sibling {
        id: new_id,
        index: plan.new_index,
    });
    out.sort_by_key(|sibling| sibling.index);
    out
}

/// Validates an explicit full reassignment of a sibling set.
///
/// Every current sibling must appear exactly once and the new indices must be
/// non-negative and distinct. Returns only the entries whose index changes.
pub fn plan_reorder<Id: Copy + Ord + std::fmt::Display>(
    siblings: &[Sibling<Id>],
    assignments: &[(Id, i64)],
) -> Result<Vec<Shift<Id>>, ReorderError> {
    let current: BTreeMap<Id, i64> = siblings
        .iter()
        .map(|sibling| (sibling.id, sibling.index))
        .collect();

    let mut seen_ids = BTreeSet::new();
    let mut seen_indices = BTreeSet::new();
    let mut shifts = Vec::new();
    for (id, index) in assignments {
        let Some(from) = current.get(id) else {
            return Err(ReorderError::UnknownSibling(id.to_string()));
        };
        if !seen_ids.insert(*id) {
            return Err(ReorderError::DuplicateSibling(id.to_string()));
        }
        if *index < 0 {
            return Err(ReorderError::NegativeIndex(*index));
        }
        if !seen_indices.insert(*index) {
            return Err(ReorderError::DuplicateIndex(*index));
        }
        if from != index {
            shifts.push(Shift {
                id: *id,
                from: *from,
                to: *index,
            });
        }
    }

    if let Some(missing) = current.keys().find(|id| !seen_ids.contains(*id)) {
        return Err(ReorderError::MissingSibling(missing.to_string()));
    }

    Ok(shifts)
}

/// Whether the indices, taken in display order, strictly increase.
pub fn is_strictly_increasing(indices: &[i64]) -> bool {
    indices.windows(2).all(|pair| pair[0] < pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(indices: &[i64]) -> Vec<Sibling<u32>> {
        indices
            .iter()
            .enumerate()
            .map(|(id, index)| Sibling {
                id: id as u32,
                index: *index,
            })
            .collect()
    }

    #[test]
    fn test_shifts_are_descending() {
        let plan = plan_insert(&set(&[0, 1, 2, 3]), 1, InsertPosition::Before).unwrap();
        let from: Vec<i64> = plan.shifts.iter().map(|shift| shift.from).collect();
        assert_eq!(from, vec![3, 2, 1]);
        assert_eq!(plan.new_index, 1);
    }

    #[test]
    fn test_append_index_with_gap() {
        assert_eq!(append_index(&set(&[0, 5, 6])), 7);
        assert_eq!(append_index::<u32>(&[]), 0);
    }
}
