use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use super::schema::{self, FILTER_COLUMNS};

// ---------------------------------------------------------------------------
// CellValue – one coerced cell of the source table
// ---------------------------------------------------------------------------

/// A typed cell after loader coercion.
///
/// Invariants: `Number` is always finite, `Text` is always a non-empty
/// trimmed string; anything else was normalized to `Missing` at load time.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                Date(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Missing => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Missing => write!(f, "—"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell, if it holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Date view of the cell, if it holds a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text view of the cell, if it holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the master sheet
// ---------------------------------------------------------------------------

/// A single proforma row keyed by declared column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Record { cells }
    }

    /// Cell for `column`; a column the record never saw reads as missing.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Missing)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).as_number()
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).as_date()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).as_text()
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded (or filtered) dataset
// ---------------------------------------------------------------------------

/// An ordered set of records plus the declared columns found in the source.
///
/// `observed` holds, for each sidebar filter column, the sorted set of
/// concrete values present in the records. Missing never appears there:
/// filter options are built from real values only.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub records: Vec<Record>,
    /// Declared columns present in the source, in schema order.
    pub column_names: Vec<String>,
    /// Observed concrete values per filter column.
    pub observed: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Table {
    /// Build a table, indexing the observed values of every filter column.
    pub fn from_records(records: Vec<Record>, column_names: Vec<String>) -> Self {
        let mut observed: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for (col, _) in FILTER_COLUMNS {
            if !column_names.iter().any(|c| c == col) {
                continue;
            }
            let values: BTreeSet<CellValue> = records
                .iter()
                .map(|r| r.get(col))
                .filter(|v| !v.is_missing())
                .cloned()
                .collect();
            observed.insert((*col).to_string(), values);
        }
        Table {
            records,
            column_names,
            observed,
        }
    }

    /// Table containing every declared column, for in-memory construction.
    pub fn with_all_columns(records: Vec<Record>) -> Self {
        let columns = schema::DECLARED_COLUMNS
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect();
        Self::from_records(records, columns)
    }

    /// New table keeping the rows at `indices`, in the given order.
    /// Columns are carried over untouched; observed values are re-indexed.
    pub fn subset(&self, indices: &[usize]) -> Table {
        let records = indices.iter().map(|&i| self.records[i].clone()).collect();
        Table::from_records(records, self.column_names.clone())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{COL_AREA, COL_GROSS_BRL};

    fn record(area: CellValue, gross: CellValue) -> Record {
        let mut cells = BTreeMap::new();
        cells.insert(COL_AREA.to_string(), area);
        cells.insert(COL_GROSS_BRL.to_string(), gross);
        Record::new(cells)
    }

    #[test]
    fn observed_values_exclude_missing() {
        let table = Table::with_all_columns(vec![
            record(CellValue::Text("RCAL".into()), CellValue::Number(10.0)),
            record(CellValue::Missing, CellValue::Number(5.0)),
            record(CellValue::Text("SCAL".into()), CellValue::Missing),
        ]);
        let areas = &table.observed[COL_AREA];
        assert_eq!(areas.len(), 2);
        assert!(!areas.contains(&CellValue::Missing));
    }

    #[test]
    fn subset_preserves_order_and_columns() {
        let table = Table::with_all_columns(vec![
            record(CellValue::Text("A".into()), CellValue::Number(1.0)),
            record(CellValue::Text("B".into()), CellValue::Number(2.0)),
            record(CellValue::Text("C".into()), CellValue::Number(3.0)),
        ]);
        let sub = table.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.column_names, table.column_names);
        assert_eq!(sub.records[0].text(COL_AREA), Some("C"));
        assert_eq!(sub.records[1].text(COL_AREA), Some("A"));
    }

    #[test]
    fn absent_column_reads_as_missing() {
        let rec = record(CellValue::Text("A".into()), CellValue::Number(1.0));
        assert!(rec.get("nonexistent").is_missing());
    }
}
