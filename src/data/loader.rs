use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use thiserror::Error;

use super::model::{CellValue, Record, Table};
use super::schema::{ColumnRole, DECLARED_COLUMNS};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal load failures. Per-cell parse failures are never errors: they
/// coerce to [`CellValue::Missing`] and the load continues.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point with process-wide memoization
// ---------------------------------------------------------------------------

type CacheKey = (PathBuf, String);

/// Loaded tables keyed by `(path, sheet)`. Written at most once per key,
/// read thereafter; only a fresh process empties it.
static CACHE: Lazy<Mutex<HashMap<CacheKey, Arc<Table>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load one named sheet of a workbook into a [`Table`].
///
/// The result is memoized for the process lifetime: a second call with the
/// same `(path, sheet)` returns the identical in-memory table without
/// touching the file again.
pub fn load(path: &Path, sheet: &str) -> Result<Arc<Table>, LoadError> {
    let key = (path.to_path_buf(), sheet.to_string());

    if let Some(table) = CACHE.lock().expect("loader cache poisoned").get(&key) {
        log::debug!("cache hit for {:?}", key.0);
        return Ok(Arc::clone(table));
    }

    if !path.exists() {
        return Err(LoadError::SourceNotFound(path.to_path_buf()));
    }

    let table = Arc::new(read_sheet(path, sheet)?);
    log::info!(
        "loaded {} rows, {} declared columns from {:?} [{}]",
        table.len(),
        table.column_names.len(),
        path,
        sheet
    );

    Ok(Arc::clone(
        CACHE
            .lock()
            .expect("loader cache poisoned")
            .entry(key)
            .or_insert(table),
    ))
}

// ---------------------------------------------------------------------------
// Workbook reading
// ---------------------------------------------------------------------------

fn read_sheet(path: &Path, sheet: &str) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)?;

    if !workbook.sheet_names().iter().any(|s| s == sheet) {
        return Err(LoadError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(row) => row,
        None => return Ok(Table::from_records(Vec::new(), Vec::new())),
    };

    // Map declared columns onto sheet positions. Unknown sheet columns are
    // ignored; declared columns the sheet lacks are skipped.
    let mut layout: Vec<(String, ColumnRole, usize)> = Vec::new();
    for (name, role) in DECLARED_COLUMNS {
        let position = header
            .iter()
            .position(|cell| header_text(cell).as_deref() == Some(*name));
        if let Some(idx) = position {
            layout.push(((*name).to_string(), *role, idx));
        }
    }
    let column_names: Vec<String> = layout.iter().map(|(name, _, _)| name.clone()).collect();

    let records: Vec<Record> = rows
        .map(|row| {
            let mut cells = BTreeMap::new();
            for (name, role, idx) in &layout {
                let value = match row.get(*idx) {
                    Some(cell) => coerce(cell, *role),
                    None => CellValue::Missing,
                };
                cells.insert(name.clone(), value);
            }
            Record::new(cells)
        })
        .collect();

    Ok(Table::from_records(records, column_names))
}

fn header_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Coerce one sheet cell according to the column's declared role.
/// Anything that does not parse becomes `Missing`, never an error.
fn coerce(cell: &Data, role: ColumnRole) -> CellValue {
    match role {
        ColumnRole::Date => coerce_date(cell),
        ColumnRole::Numeric => coerce_number(cell),
        ColumnRole::Text => coerce_text(cell),
    }
}

fn coerce_date(cell: &Data) -> CellValue {
    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.date()))
            .unwrap_or(CellValue::Missing),
        Data::DateTimeIso(s) => parse_flexible_date(s)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Missing),
        Data::String(s) => parse_flexible_date(s)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Missing),
        _ => CellValue::Missing,
    }
}

fn coerce_number(cell: &Data) -> CellValue {
    let parsed = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_flexible_number(s),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Missing,
    }
}

fn coerce_text(cell: &Data) -> CellValue {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Identifier-like columns often come back as floats; render
            // whole values without the trailing ".0".
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => d.date().format("%Y-%m-%d").to_string(),
            None => return CellValue::Missing,
        },
        _ => return CellValue::Missing,
    };
    normalize_text(text)
}

/// Blank and placeholder-null strings collapse to `Missing`.
fn normalize_text(text: String) -> CellValue {
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        CellValue::Missing
    } else {
        CellValue::Text(text)
    }
}

// ---------------------------------------------------------------------------
// Format-tolerant parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a number tolerating thousands/decimal punctuation variance:
/// `1.234,56`, `1,234.56`, `R$ 1.234,56`, `12,5%` all parse; garbage and
/// non-finite values do not.
fn parse_flexible_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized = match (last_dot, last_comma) {
        // Both separators present: the rightmost one is the decimal mark.
        (Some(dot), Some(comma)) if comma > dot => {
            cleaned.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Comma only: a single comma is a decimal mark, repeated commas
        // are thousands separators.
        (None, Some(_)) => {
            if cleaned.matches(',').count() == 1 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flexible_numbers_handle_punctuation_variance() {
        assert_eq!(parse_flexible_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_flexible_number("1,234.56"), Some(1234.56));
        assert_eq!(parse_flexible_number("R$ 2.500,00"), Some(2500.0));
        assert_eq!(parse_flexible_number("12,5%"), Some(12.5));
        assert_eq!(parse_flexible_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_flexible_number("-42"), Some(-42.0));
        assert_eq!(parse_flexible_number("n/a"), None);
        assert_eq!(parse_flexible_number(""), None);
    }

    #[test]
    fn flexible_dates_accept_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(parse_flexible_date("2026-03-02"), Some(expected));
        assert_eq!(parse_flexible_date("02/03/2026"), Some(expected));
        assert_eq!(parse_flexible_date("2026-03-02 13:45:00"), Some(expected));
        assert_eq!(parse_flexible_date("not a date"), None);
    }

    #[test]
    fn placeholder_text_becomes_missing() {
        assert_eq!(normalize_text("".into()), CellValue::Missing);
        assert_eq!(normalize_text("nan".into()), CellValue::Missing);
        assert_eq!(normalize_text("NaN".into()), CellValue::Missing);
        assert_eq!(
            normalize_text("ACME".into()),
            CellValue::Text("ACME".into())
        );
    }

    #[test]
    fn numeric_coercion_never_yields_non_finite() {
        assert_eq!(coerce_number(&Data::Float(f64::NAN)), CellValue::Missing);
        assert_eq!(
            coerce_number(&Data::Float(f64::INFINITY)),
            CellValue::Missing
        );
        assert_eq!(coerce_number(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(coerce_number(&Data::Empty), CellValue::Missing);
    }

    #[test]
    fn identifier_floats_render_without_decimal_tail() {
        assert_eq!(
            coerce_text(&Data::Float(1042.0)),
            CellValue::Text("1042".into())
        );
    }
}
