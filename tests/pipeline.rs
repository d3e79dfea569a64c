//! End-to-end pipeline tests over a real workbook on disk:
//! load → filter → aggregate, plus the loader's cache and error taxonomy.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use proforma_dash::data::aggregate::{
    count_distinct, count_rows, monthly_series, reconcile, status_distribution, sum_by,
};
use proforma_dash::data::filter::{apply, FilterSelection};
use proforma_dash::data::loader::{load, LoadError};
use proforma_dash::data::model::CellValue;
use proforma_dash::data::schema::{
    COL_AREA, COL_CLIENT, COL_DATE, COL_GROSS_BRL, COL_MONTH_DATE, COL_NET_BRL, COL_PROFORMA,
    COL_STATUS, COL_TAXES, DECLARED_COLUMNS, SHEET_MASTER,
};

const EPS: f64 = 1e-9;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three hand-picked rows:
/// 1. complete, delta = 75 − (100 − 20) = −5
/// 2. gross written as the pt-BR string "1.234,56", delta = 0
/// 3. document date blank, client "nan", net missing
fn write_fixture(path: &Path) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_MASTER).unwrap();

    for (col, (name, _)) in DECLARED_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }

    let d = |y: u16, m: u8, day: u8| ExcelDateTime::from_ymd(y, m, day).unwrap();

    // DATA, DATA N.F., MES_CONTABIL, MES_CONTABIL_DT, PROFORMA, CLIENTE,
    // STATUS, BU, AREA, GROSS BRL, GROSS USD, FATURADO, NET, IMPOSTOS, %
    sheet
        .write_datetime_with_format(1, 0, &d(2026, 1, 5), &date_format)
        .unwrap();
    sheet.write_string(1, 2, "2026-01").unwrap();
    sheet
        .write_datetime_with_format(1, 3, &d(2026, 1, 1), &date_format)
        .unwrap();
    sheet.write_string(1, 4, "PF-1").unwrap();
    sheet.write_string(1, 5, "ACME").unwrap();
    sheet.write_string(1, 6, "PAGO").unwrap();
    sheet.write_string(1, 7, "BU1").unwrap();
    sheet.write_string(1, 8, "RCAL").unwrap();
    sheet.write_number(1, 9, 100.0).unwrap();
    sheet.write_number(1, 12, 75.0).unwrap();
    sheet.write_number(1, 13, 20.0).unwrap();

    sheet
        .write_datetime_with_format(2, 0, &d(2026, 1, 20), &date_format)
        .unwrap();
    sheet.write_string(2, 2, "2026-01").unwrap();
    sheet
        .write_datetime_with_format(2, 3, &d(2026, 1, 1), &date_format)
        .unwrap();
    sheet.write_string(2, 4, "PF-1").unwrap();
    sheet.write_string(2, 5, "ACME").unwrap();
    sheet.write_string(2, 6, "ABERTO").unwrap();
    sheet.write_string(2, 7, "BU1").unwrap();
    sheet.write_string(2, 8, "SCAL").unwrap();
    sheet.write_string(2, 9, "1.234,56").unwrap();
    sheet.write_number(2, 12, 1214.56).unwrap();
    sheet.write_number(2, 13, 20.0).unwrap();

    sheet.write_string(3, 2, "2026-03").unwrap();
    sheet
        .write_datetime_with_format(3, 3, &d(2026, 3, 2), &date_format)
        .unwrap();
    sheet.write_string(3, 4, "PF-2").unwrap();
    sheet.write_string(3, 5, "nan").unwrap();
    sheet.write_string(3, 6, "PAGO").unwrap();
    sheet.write_string(3, 7, "BU2").unwrap();
    sheet.write_string(3, 8, "RCAL").unwrap();
    sheet.write_number(3, 9, 7.0).unwrap();
    sheet.write_number(3, 13, 1.0).unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn load_coerces_filters_and_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proformas.xlsx");
    write_fixture(&path);

    let table = load(&path, SHEET_MASTER).unwrap();
    assert_eq!(count_rows(&table), 3);
    assert_eq!(table.column_names.len(), DECLARED_COLUMNS.len());

    // Typed coercion, including the punctuation-tolerant numeric parse
    // and the "nan" placeholder.
    assert_eq!(table.records[0].date(COL_DATE), Some(date(2026, 1, 5)));
    let gross = table.records[1].number(COL_GROSS_BRL).unwrap();
    assert!((gross - 1234.56).abs() < EPS);
    assert!(table.records[2].get(COL_CLIENT).is_missing());
    assert!(table.records[2].get(COL_DATE).is_missing());

    // Scalar metrics.
    assert_eq!(count_distinct(&table, COL_PROFORMA).unwrap(), 2);
    assert_eq!(count_distinct(&table, COL_CLIENT).unwrap(), 1);
    let total = sum_by(&table, COL_GROSS_BRL).unwrap().unwrap();
    assert!((total - 1341.56).abs() < EPS);

    // Monthly buckets off the accounting-month date.
    let series = monthly_series(&table, COL_MONTH_DATE, COL_GROSS_BRL).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].0, date(2026, 1, 1));
    assert!((series[0].1 - 1334.56).abs() < EPS);
    assert_eq!(series[1].0, date(2026, 3, 1));
    assert!((series[1].1 - 7.0).abs() < EPS);

    // Status counts cover every row.
    let dist = status_distribution(&table, COL_STATUS).unwrap();
    assert_eq!(dist[0], (CellValue::Text("PAGO".into()), 2));
    let counted: usize = dist.iter().map(|(_, n)| n).sum();
    assert_eq!(counted, 3);

    // Reconciliation: the incomplete row is excluded, worst delta first.
    let hits = reconcile(&table, COL_GROSS_BRL, COL_TAXES, COL_NET_BRL, None).unwrap();
    assert_eq!(hits.len(), 2);
    assert!((hits[0].delta + 5.0).abs() < EPS);
    assert!(hits[1].delta.abs() < EPS);

    // Filter by area, then re-aggregate the subset.
    let mut selection = FilterSelection::new();
    selection.insert(
        COL_AREA.to_string(),
        BTreeSet::from([CellValue::Text("RCAL".into())]),
    );
    let filtered = apply(&table, &selection);
    assert_eq!(filtered.len(), 2);
    let filtered_total = sum_by(&filtered, COL_GROSS_BRL).unwrap().unwrap();
    assert!((filtered_total - 107.0).abs() < EPS);
}

#[test]
fn cache_returns_identical_table_without_rereading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cached.xlsx");
    write_fixture(&path);

    let first = load(&path, SHEET_MASTER).unwrap();

    // With the file gone, only the cache can answer.
    std::fs::remove_file(&path).unwrap();
    let second = load(&path, SHEET_MASTER).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[test]
fn bad_path_is_source_not_found() {
    let err = load(Path::new("definitely/not/here.xlsx"), SHEET_MASTER).unwrap_err();
    assert!(matches!(err, LoadError::SourceNotFound(_)));
}

#[test]
fn wrong_sheet_is_sheet_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheets.xlsx");
    write_fixture(&path);

    let err = load(&path, "no_such_sheet").unwrap_err();
    assert!(matches!(err, LoadError::SheetNotFound(name) if name == "no_such_sheet"));
}
