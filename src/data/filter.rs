use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// FilterSelection: per-column allow-lists from the sidebar
// ---------------------------------------------------------------------------

/// Maps column name → set of allowed values. A column that is absent, maps
/// to an empty set, or maps to every observed value imposes no restriction.
pub type FilterSelection = BTreeMap<String, BTreeSet<CellValue>>;

/// Selection with every observed value of every filter column selected,
/// i.e. no effective restriction. This is the sidebar's initial state.
pub fn init_selection(table: &Table) -> FilterSelection {
    table
        .observed
        .iter()
        .map(|(col, vals)| (col.clone(), vals.clone()))
        .collect()
}

/// Indices of records passing every active column constraint.
///
/// A record passes a column when:
/// * the table lacks the column, or the allow-list is empty, or the
///   allow-list covers every observed value → no constraint;
/// * otherwise its value must be a member of the allow-list. Missing never
///   matches a concrete entry, so missing-valued rows fall out of any
///   actively constrained column.
pub fn filtered_indices(table: &Table, selection: &FilterSelection) -> Vec<usize> {
    let active: Vec<(&String, &BTreeSet<CellValue>)> = selection
        .iter()
        .filter(|(col, allowed)| {
            if !table.has_column(col) || allowed.is_empty() {
                return false;
            }
            match table.observed.get(*col) {
                // Full observed set selected → no effective filter.
                Some(observed) => !allowed.is_superset(observed),
                None => true,
            }
        })
        .collect();

    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            active
                .iter()
                .all(|(col, allowed)| allowed.contains(record.get(col)))
        })
        .map(|(i, _)| i)
        .collect()
}

/// The filtered table: same columns, original row order, rows restricted
/// to those passing `selection`. Deterministic and idempotent.
pub fn apply(table: &Table, selection: &FilterSelection) -> Table {
    table.subset(&filtered_indices(table, selection))
}
