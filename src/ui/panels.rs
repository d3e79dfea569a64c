use std::collections::BTreeSet;
use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{count_distinct, count_rows, sum_by};
use crate::data::model::Table;
use crate::data::schema::{
    COL_CLIENT, COL_GROSS_BRL, COL_GROSS_USD, COL_NET_BRL, COL_PROFORMA, FILTER_COLUMNS,
};
use crate::state::AppState;
use crate::ui::{format_count, format_money};

// ---------------------------------------------------------------------------
// Left side panel – source path and filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar: workbook path, load button, per-column filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Fonte");
    ui.label("Caminho do arquivo consolidado (.xlsx)");
    ui.text_edit_singleline(&mut state.source_input);
    if ui.button("Carregar").clicked() {
        let path = state.source_input.clone();
        state.load_source(Path::new(&path));
    }
    ui.add_space(4.0);
    ui.separator();

    ui.heading("Filtros");
    let Some(dataset) = state.dataset.clone() else {
        ui.label("Nenhum dado carregado.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, label) in FILTER_COLUMNS {
                // A filter column the sheet lacks simply has no widget.
                let Some(all_values) = dataset.observed.get(*col) else {
                    continue;
                };

                let n_selected = state
                    .selection
                    .get(*col)
                    .map(|s| s.len())
                    .unwrap_or_default();
                let header_text = format!("{label}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("Todos").clicked() {
                                state
                                    .selection
                                    .insert((*col).to_string(), all_values.clone());
                                changed = true;
                            }
                            if ui.small_button("Nenhum").clicked() {
                                state
                                    .selection
                                    .insert((*col).to_string(), BTreeSet::new());
                                changed = true;
                            }
                        });

                        let selected = state.selection.entry((*col).to_string()).or_default();
                        for val in all_values {
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                                changed = true;
                            }
                        }
                    });
            }
        });

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(filtered)) = (&state.dataset, &state.filtered) {
            ui.label(format!(
                "{} linhas carregadas, {} após filtros",
                format_count(ds.len()),
                format_count(filtered.len())
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Six headline metrics over the filtered subset. A sum with no value
/// shows "—", which is not the same thing as 0,00.
pub fn kpi_strip(ui: &mut Ui, filtered: &Table) {
    let metrics: [(&str, String); 6] = [
        ("Linhas", format_count(count_rows(filtered))),
        (
            "Proformas únicas",
            count_distinct(filtered, COL_PROFORMA)
                .map(format_count)
                .unwrap_or_else(|_| "—".to_string()),
        ),
        (
            "Clientes únicos",
            count_distinct(filtered, COL_CLIENT)
                .map(format_count)
                .unwrap_or_else(|_| "—".to_string()),
        ),
        ("Bruto (BRL)", money_metric(filtered, COL_GROSS_BRL)),
        ("Bruto (USD)", money_metric(filtered, COL_GROSS_USD)),
        ("Líquido (BRL)", money_metric(filtered, COL_NET_BRL)),
    ];

    ui.columns(metrics.len(), |cols| {
        for (col_ui, (label, value)) in cols.iter_mut().zip(metrics.iter()) {
            col_ui.label(RichText::new(*label).small().weak());
            col_ui.label(RichText::new(value).strong().size(18.0));
        }
    });
}

fn money_metric(table: &Table, column: &str) -> String {
    match sum_by(table, column) {
        Ok(Some(total)) => format_money(total),
        // Missing column and empty sum both degrade to a dash.
        Ok(None) | Err(_) => "—".to_string(),
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir planilha consolidada")
        .add_filter("Planilhas", &["xlsx", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        state.source_input = path.display().to_string();
        state.load_source(&path);
    }
}
