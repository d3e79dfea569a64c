use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Degraded state: a required column is absent
// ---------------------------------------------------------------------------

/// Returned when an aggregate needs a column the table does not carry.
/// Callers treat this as a first-class state ("insufficient columns"
/// messaging), never as a fatal error and never as a fabricated zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{0}' not present in the table")]
pub struct ColumnMissing(pub String);

fn require(table: &Table, column: &str) -> Result<(), ColumnMissing> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(ColumnMissing(column.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

pub fn count_rows(table: &Table) -> usize {
    table.len()
}

/// Distinct concrete values in `column`; missing cells do not count.
pub fn count_distinct(table: &Table, column: &str) -> Result<usize, ColumnMissing> {
    require(table, column)?;
    let distinct: BTreeSet<&CellValue> = table
        .records
        .iter()
        .map(|r| r.get(column))
        .filter(|v| !v.is_missing())
        .collect();
    Ok(distinct.len())
}

/// Sum of `column` ignoring missing cells. `None` when the table is empty
/// or every cell is missing: an absent sum is not a sum of zero, and the
/// distinction survives through to display.
pub fn sum_by(table: &Table, column: &str) -> Result<Option<f64>, ColumnMissing> {
    require(table, column)?;
    let mut total = None;
    for record in &table.records {
        if let Some(v) = record.number(column) {
            *total.get_or_insert(0.0) += v;
        }
    }
    Ok(total)
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Sum `numeric_column` per `group_column` value.
///
/// A missing group key forms its own group unless `include_missing` is
/// false. Within a group, missing numerics are ignored. Groups are sorted
/// by sum (descending when `descending`, ties by group key) and truncated
/// to `top_n` after sorting.
pub fn group_sum(
    table: &Table,
    group_column: &str,
    numeric_column: &str,
    top_n: Option<usize>,
    descending: bool,
    include_missing: bool,
) -> Result<Vec<(CellValue, f64)>, ColumnMissing> {
    require(table, group_column)?;
    require(table, numeric_column)?;

    let mut sums: BTreeMap<CellValue, f64> = BTreeMap::new();
    for record in &table.records {
        let key = record.get(group_column);
        if key.is_missing() && !include_missing {
            continue;
        }
        let entry = sums.entry(key.clone()).or_insert(0.0);
        if let Some(v) = record.number(numeric_column) {
            *entry += v;
        }
    }

    let mut groups: Vec<(CellValue, f64)> = sums.into_iter().collect();
    // BTreeMap iteration gives key order, so the sort is stable on ties.
    if descending {
        groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        groups.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    if let Some(n) = top_n {
        groups.truncate(n);
    }
    Ok(groups)
}

/// Month-start buckets of `numeric_column` summed over `date_column`.
///
/// Rows without a date are dropped; a bucket exists for every month with
/// at least one dated row (no zero-filling of empty months); the result is
/// chronologically ascending.
pub fn monthly_series(
    table: &Table,
    date_column: &str,
    numeric_column: &str,
) -> Result<Vec<(NaiveDate, f64)>, ColumnMissing> {
    require(table, date_column)?;
    require(table, numeric_column)?;

    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in &table.records {
        let Some(date) = record.date(date_column) else {
            continue;
        };
        let month_start = date.with_day(1).expect("day 1 exists in every month");
        let entry = buckets.entry(month_start).or_insert(0.0);
        if let Some(v) = record.number(numeric_column) {
            *entry += v;
        }
    }
    Ok(buckets.into_iter().collect())
}

/// Row counts per status value. Unlike [`group_sum`], missing is always
/// its own bucket here: the bucket counts must total the row count.
/// Ordered by count descending, ties by key.
pub fn status_distribution(
    table: &Table,
    status_column: &str,
) -> Result<Vec<(CellValue, usize)>, ColumnMissing> {
    require(table, status_column)?;

    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for record in &table.records {
        *counts.entry(record.get(status_column).clone()).or_insert(0) += 1;
    }
    let mut buckets: Vec<(CellValue, usize)> = counts.into_iter().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(buckets)
}

// ---------------------------------------------------------------------------
// Aging
// ---------------------------------------------------------------------------

/// Whole days elapsed from each record's date to `reference`, `None` where
/// the date is missing. Histogram callers skip the `None`s.
pub fn age_days(
    table: &Table,
    date_column: &str,
    reference: NaiveDate,
) -> Result<Vec<Option<i64>>, ColumnMissing> {
    require(table, date_column)?;
    Ok(table
        .records
        .iter()
        .map(|r| r.date(date_column).map(|d| (reference - d).num_days()))
        .collect())
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// One reconciliation hit: `delta = net - (gross - taxes)`.
///
/// The rule is a documented heuristic, not an accounting identity; sign
/// and magnitude both matter and no tolerance is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRow {
    /// Index into the table the check ran over.
    pub index: usize,
    pub gross: f64,
    pub taxes: f64,
    pub net: f64,
    pub delta: f64,
}

/// Check `net ≈ gross − taxes` over the rows where all three amounts are
/// present, ranked by `|delta|` descending (ties keep row order) and
/// truncated to `top` when given.
pub fn reconcile(
    table: &Table,
    gross_column: &str,
    tax_column: &str,
    net_column: &str,
    top: Option<usize>,
) -> Result<Vec<ReconciliationRow>, ColumnMissing> {
    require(table, gross_column)?;
    require(table, tax_column)?;
    require(table, net_column)?;

    let mut rows: Vec<ReconciliationRow> = table
        .records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let gross = record.number(gross_column)?;
            let taxes = record.number(tax_column)?;
            let net = record.number(net_column)?;
            Some(ReconciliationRow {
                index,
                gross,
                taxes,
                net,
                delta: net - (gross - taxes),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
    if let Some(n) = top {
        rows.truncate(n);
    }
    Ok(rows)
}
