use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::data::filter::{apply, init_selection, FilterSelection};
use crate::data::loader;
use crate::data::model::{CellValue, Table};
use crate::data::schema::{COL_GROSS_BRL, COL_TAXES};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard tabs, mirroring the report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Financial,
    Operational,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Financial, Tab::Operational, Tab::Data];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Visão Geral",
            Tab::Financial => "Financeiro",
            Tab::Operational => "Operacional",
            Tab::Data => "Dados (tabela)",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Workbook path as typed in the sidebar.
    pub source_input: String,

    /// Loaded master table (None until a load succeeds).
    pub dataset: Option<Arc<Table>>,

    /// Per-column sidebar selections.
    pub selection: FilterSelection,

    /// Result of applying the current selection (cached between changes).
    pub filtered: Option<Arc<Table>>,

    pub tab: Tab,

    /// Numeric columns plotted on the scatter axes.
    pub scatter_x: String,
    pub scatter_y: String,

    /// Reference date for the aging histogram.
    pub aging_reference: NaiveDate,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        AppState {
            source_input: settings.source_path.clone(),
            settings,
            dataset: None,
            selection: FilterSelection::default(),
            filtered: None,
            tab: Tab::default(),
            scatter_x: COL_GROSS_BRL.to_string(),
            scatter_y: COL_TAXES.to_string(),
            aging_reference: chrono::Local::now().date_naive(),
            status_message: None,
        }
    }

    /// Load (or re-load from cache) the workbook at `path` and swap it in.
    /// Failures land in `status_message`; the previous dataset survives.
    pub fn load_source(&mut self, path: &Path) {
        match loader::load(path, &self.settings.sheet_name) {
            Ok(table) => self.set_dataset(table),
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Erro: {e}"));
            }
        }
    }

    /// Ingest a newly loaded table and reset filters to "everything".
    pub fn set_dataset(&mut self, table: Arc<Table>) {
        self.selection = init_selection(&table);
        self.filtered = Some(Arc::clone(&table));
        self.dataset = Some(table);
        self.status_message = None;
    }

    /// Recompute the filtered table after a selection change. One full
    /// synchronous pass: the aggregates all read `filtered` afterwards.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filtered = Some(Arc::new(apply(ds, &self.selection)));
        }
    }

    /// Toggle a single value in a column's allow-list.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.selection.entry(column.to_string()).or_default();
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select every observed value in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(ds) = &self.dataset {
            if let Some(observed) = ds.observed.get(column) {
                self.selection.insert(column.to_string(), observed.clone());
                self.refilter();
            }
        }
    }

    /// Clear a column's allow-list (which means "no restriction").
    pub fn select_none(&mut self, column: &str) {
        self.selection.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::data::schema::COL_AREA;
    use std::collections::BTreeMap;

    fn table_with_areas(areas: &[&str]) -> Arc<Table> {
        let records = areas
            .iter()
            .map(|a| {
                let mut cells = BTreeMap::new();
                cells.insert(COL_AREA.to_string(), CellValue::Text((*a).into()));
                Record::new(cells)
            })
            .collect();
        Arc::new(Table::with_all_columns(records))
    }

    #[test]
    fn toggling_a_value_refilters() {
        let mut state = AppState::new(Settings::default());
        state.set_dataset(table_with_areas(&["RCAL", "SCAL", "RCAL"]));
        assert_eq!(state.filtered.as_ref().unwrap().len(), 3);

        state.toggle_filter_value(COL_AREA, &CellValue::Text("SCAL".into()));
        assert_eq!(state.filtered.as_ref().unwrap().len(), 2);

        state.select_all(COL_AREA);
        assert_eq!(state.filtered.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn select_none_means_unrestricted() {
        let mut state = AppState::new(Settings::default());
        state.set_dataset(table_with_areas(&["RCAL", "SCAL"]));
        state.select_none(COL_AREA);
        assert_eq!(state.filtered.as_ref().unwrap().len(), 2);
    }
}
