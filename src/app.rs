use std::path::Path;
use std::sync::Arc;

use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::Settings;
use crate::data::export;
use crate::data::model::Table;
use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and try the configured workbook straight away, the
    /// way the report opens pre-pointed at the consolidated file.
    pub fn new(settings: Settings) -> Self {
        let mut state = AppState::new(settings);
        let path = state.source_input.clone();
        if Path::new(&path).exists() {
            state.load_source(Path::new(&path));
        }
        DashboardApp { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: source + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and report tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(filtered) = self.state.filtered.clone() else {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Informe o caminho da planilha na barra lateral (ou Arquivo → Abrir…)");
                });
                return;
            };

            panels::kpi_strip(ui, &filtered);
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.label());
                }
            });
            ui.separator();

            match self.state.tab {
                Tab::Overview => overview_tab(ui, &filtered),
                Tab::Financial => financial_tab(ui, &mut self.state, &filtered),
                Tab::Operational => operational_tab(ui, &mut self.state, &filtered),
                Tab::Data => data_tab(ui, &mut self.state, &filtered),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn overview_tab(ui: &mut Ui, filtered: &Arc<Table>) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            plot::monthly_gross(ui, filtered);
            ui.add_space(8.0);
            ui.columns(2, |cols| {
                plot::area_bars(&mut cols[0], filtered);
                plot::status_chart(&mut cols[1], filtered);
            });
        });
}

fn financial_tab(ui: &mut Ui, state: &mut AppState, filtered: &Arc<Table>) {
    let top_clients = state.settings.top_clients;
    let reconciliation_top = state.settings.reconciliation_top;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            plot::top_clients(ui, filtered, top_clients);
            ui.add_space(8.0);
            plot::numeric_scatter(ui, state, filtered);
            ui.add_space(8.0);
            table::reconciliation_table(ui, filtered, reconciliation_top);
        });
}

fn operational_tab(ui: &mut Ui, state: &mut AppState, filtered: &Arc<Table>) {
    let bins = state.settings.aging_bins;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            plot::bu_bars(ui, filtered);
            ui.add_space(8.0);
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Data de referência:");
                ui.add(DatePickerButton::new(&mut state.aging_reference));
            });
            plot::aging_histogram(ui, filtered, state.aging_reference, bins);
        });
}

fn data_tab(ui: &mut Ui, state: &mut AppState, filtered: &Arc<Table>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Dados filtrados");
        if ui.button("Baixar CSV (dados filtrados)").clicked() {
            save_filtered_csv(state, filtered);
        }
    });
    ui.add_space(4.0);
    ScrollArea::horizontal()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            table::data_table(ui, filtered);
        });
}

fn save_filtered_csv(state: &mut AppState, filtered: &Table) {
    let target = rfd::FileDialog::new()
        .set_title("Salvar CSV")
        .set_file_name("proformas_filtradas.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = target {
        match export::write_csv_file(filtered, &path) {
            Ok(()) => {
                log::info!("exported {} rows to {}", filtered.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("CSV export failed: {e:#}");
                state.status_message = Some(format!("Erro ao salvar CSV: {e:#}"));
            }
        }
    }
}
