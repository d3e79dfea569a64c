//! Writes a deterministic sample workbook so the dashboard can be tried
//! without the real consolidated spreadsheet:
//!
//! ```text
//! cargo run --bin generate_sample
//! cargo run -- # then point the sidebar at sample_proformas.xlsx
//! ```

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use proforma_dash::data::schema::{self, DECLARED_COLUMNS};

const OUTPUT_PATH: &str = "sample_proformas.xlsx";
const ROWS: u32 = 240;

const AREAS: &[&str] = &[
    "RCAL",
    "SCAL",
    "GEOCHEMISTRY",
    "GEOLOGY",
    "STORAGE-LOGISTC",
    "PRODUCT SALES",
];
const STATUSES: &[&str] = &["FATURADO", "PAGO", "EM ABERTO", "CANCELADO"];
const BUS: &[&str] = &["BU NORTE", "BU SUL", "BU OFFSHORE"];
const CLIENTS: &[&str] = &[
    "Petrobras",
    "Shell Brasil",
    "Equinor",
    "TotalEnergies",
    "Prio",
    "Enauta",
    "3R Petroleum",
    "Karoon",
];

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.set_name(schema::SHEET_MASTER)?;

    for (col, (name, _)) in DECLARED_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    for i in 0..ROWS {
        let row = i + 1;
        let month = rng.gen_range(1..=6u32);
        let day = rng.gen_range(1..=28u32);

        let area = AREAS[rng.gen_range(0..AREAS.len())];
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        let bu = BUS[rng.gen_range(0..BUS.len())];
        let client = CLIENTS[rng.gen_range(0..CLIENTS.len())];

        let gross_brl = (rng.gen_range(5_000.0..250_000.0f64) * 100.0).round() / 100.0;
        let tax_rate = rng.gen_range(0.08..0.18);
        let taxes = (gross_brl * tax_rate * 100.0).round() / 100.0;
        // A few rows get a booking slip so the consistency check has
        // something to flag.
        let slip = if rng.gen_bool(0.06) {
            rng.gen_range(-1_500.0..1_500.0f64)
        } else {
            0.0
        };
        let net_brl = ((gross_brl - taxes + slip) * 100.0).round() / 100.0;

        let mut col = 0u16;

        // DATA, with occasional gaps to exercise the aging fallback.
        if rng.gen_bool(0.95) {
            write_date(sheet, row, col, month, day, &date_format)?;
        }
        col += 1;
        // DATA N.F.
        if rng.gen_bool(0.7) {
            write_date(sheet, row, col, month, (day + 2).min(28), &date_format)?;
        }
        col += 1;
        // MES_CONTABIL
        sheet.write_string(row, col, format!("2026-{month:02}"))?;
        col += 1;
        // MES_CONTABIL_DT
        write_date(sheet, row, col, month, 1, &date_format)?;
        col += 1;
        // PROFORMA: identifiers repeat across service lines.
        sheet.write_string(row, col, format!("PF-2026-{:04}", rng.gen_range(1..=160)))?;
        col += 1;
        // CLIENTE, with a sprinkle of the "nan" placeholder the loader
        // must normalize away.
        if rng.gen_bool(0.04) {
            sheet.write_string(row, col, "nan")?;
        } else {
            sheet.write_string(row, col, client)?;
        }
        col += 1;
        sheet.write_string(row, col, status)?;
        col += 1;
        sheet.write_string(row, col, bu)?;
        col += 1;
        if rng.gen_bool(0.97) {
            sheet.write_string(row, col, area)?;
        }
        col += 1;
        sheet.write_number(row, col, gross_brl)?;
        col += 1;
        // VALOR BRUTO USD, sometimes blank.
        if rng.gen_bool(0.6) {
            sheet.write_number(row, col, (gross_brl / 5.2 * 100.0).round() / 100.0)?;
        }
        col += 1;
        // VALOR FATURADO BRL only for invoiced statuses.
        if status == "FATURADO" || status == "PAGO" {
            sheet.write_number(row, col, gross_brl)?;
        }
        col += 1;
        sheet.write_number(row, col, net_brl)?;
        col += 1;
        sheet.write_number(row, col, taxes)?;
        col += 1;
        sheet.write_number(row, col, (tax_rate * 10_000.0).round() / 100.0)?;
    }

    workbook.save(OUTPUT_PATH)?;
    println!("Wrote {ROWS} sample rows to {OUTPUT_PATH}");
    Ok(())
}

fn write_date(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    month: u32,
    day: u32,
    format: &Format,
) -> Result<()> {
    let dt = ExcelDateTime::from_ymd(2026, month as u8, day as u8)?;
    sheet.write_datetime_with_format(row, col, &dt, format)?;
    Ok(())
}
