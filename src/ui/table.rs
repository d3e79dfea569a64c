use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::reconcile;
use crate::data::model::Table;
use crate::data::schema::{
    COL_AREA, COL_CLIENT, COL_GROSS_BRL, COL_MONTH_LABEL, COL_NET_BRL, COL_PROFORMA,
    COL_STATUS, COL_TAXES,
};
use crate::ui::format_money;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Filtered data grid
// ---------------------------------------------------------------------------

/// The filtered table, every column, one grid row per record.
pub fn data_table(ui: &mut Ui, table: &Table) {
    if table.is_empty() {
        ui.label("Nenhuma linha após os filtros.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), table.column_names.len())
        .header(HEADER_HEIGHT, |mut header| {
            for name in &table.column_names {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let record = &table.records[row.index()];
                for name in &table.column_names {
                    row.col(|ui| {
                        ui.label(record.get(name).to_string());
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Reconciliation warning table
// ---------------------------------------------------------------------------

const RECON_HEADERS: [&str; 9] = [
    "Área",
    "Proforma",
    "Cliente",
    "Mês contábil",
    "Bruto (BRL)",
    "Impostos",
    "Líquido (BRL)",
    "Delta",
    "Status",
];

/// Worst `net ≈ gross − taxes` deviations over the filtered subset.
pub fn reconciliation_table(ui: &mut Ui, table: &Table, top: usize) {
    ui.strong("Alerta de consistência");
    let rows = match reconcile(table, COL_GROSS_BRL, COL_TAXES, COL_NET_BRL, Some(top)) {
        Ok(rows) => rows,
        Err(_) => {
            ui.label("Colunas Bruto/Impostos/Líquido não encontradas.");
            return;
        }
    };
    if rows.is_empty() {
        ui.label("Sem linhas completas para checagem (Bruto/Impostos/Líquido).");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), RECON_HEADERS.len())
        .header(HEADER_HEIGHT, |mut header| {
            for name in RECON_HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let hit = &rows[row.index()];
                let record = &table.records[hit.index];
                for text in [
                    record.get(COL_AREA).to_string(),
                    record.get(COL_PROFORMA).to_string(),
                    record.get(COL_CLIENT).to_string(),
                    record.get(COL_MONTH_LABEL).to_string(),
                    format_money(hit.gross),
                    format_money(hit.taxes),
                    format_money(hit.net),
                ] {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
                row.col(|ui| {
                    // Sign matters: deviations are shown signed, ranked by
                    // magnitude.
                    ui.label(RichText::new(format_money(hit.delta)).strong());
                });
                row.col(|ui| {
                    ui.label(record.get(COL_STATUS).to_string());
                });
            });
        });
}
