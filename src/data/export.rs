use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// CSV export of the filtered table
// ---------------------------------------------------------------------------

/// Write `table` as UTF-8 comma-separated text: one header row with the
/// table's current columns, one row per record. Dates serialize as ISO
/// `YYYY-MM-DD`, numbers via the shortest round-tripping form, missing
/// cells as empty fields, so the export is a lossless view of the table.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    out.write_record(&table.column_names)
        .context("writing CSV header")?;

    for record in &table.records {
        let row: Vec<String> = table
            .column_names
            .iter()
            .map(|col| csv_field(record.get(col)))
            .collect();
        out.write_record(&row).context("writing CSV row")?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the table to a file path, e.g. from the save dialog.
pub fn write_csv_file(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file)
}

fn csv_field(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        CellValue::Missing => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::schema::{COL_AREA, COL_DATE, COL_GROSS_BRL};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn record(area: CellValue, date: CellValue, gross: CellValue) -> Record {
        let mut cells = BTreeMap::new();
        cells.insert(COL_AREA.to_string(), area);
        cells.insert(COL_DATE.to_string(), date);
        cells.insert(COL_GROSS_BRL.to_string(), gross);
        Record::new(cells)
    }

    #[test]
    fn export_round_trips_values_and_columns() {
        let table = Table::from_records(
            vec![
                record(
                    CellValue::Text("RCAL".into()),
                    CellValue::Date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
                    CellValue::Number(1234.56),
                ),
                record(CellValue::Missing, CellValue::Missing, CellValue::Missing),
            ],
            vec![
                COL_DATE.to_string(),
                COL_AREA.to_string(),
                COL_GROSS_BRL.to_string(),
            ],
        );

        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, table.column_names);

        let rows: Vec<csv::StringRecord> =
            reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2026-01-05");
        assert_eq!(&rows[0][1], "RCAL");
        assert_eq!(rows[0][2].parse::<f64>().unwrap(), 1234.56);
        assert!(rows[1].iter().all(|field| field.is_empty()));
    }
}
