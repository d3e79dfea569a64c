use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::CategoryColors;
use crate::data::aggregate::{age_days, group_sum, monthly_series, status_distribution};
use crate::data::model::{CellValue, Table};
use crate::data::schema::{
    COL_AREA, COL_BU, COL_CLIENT, COL_DATE, COL_GROSS_BRL, COL_MONTH_DATE, COL_NET_BRL,
    COL_STATUS, COL_TAXES,
};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;
const SERIES_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Overview: monthly series, area bars, status distribution
// ---------------------------------------------------------------------------

/// Gross BRL summed per accounting month, as a line with markers.
pub fn monthly_gross(ui: &mut Ui, table: &Table) {
    ui.strong("Bruto (BRL) por mês contábil");
    let series = match monthly_series(table, COL_MONTH_DATE, COL_GROSS_BRL) {
        Ok(series) => series,
        Err(_) => {
            ui.label("Não encontrei colunas suficientes para série temporal (MES_CONTABIL_DT + VALOR BRUTO BRL).");
            return;
        }
    };

    let points: Vec<[f64; 2]> = series
        .iter()
        .map(|(month, total)| [month.num_days_from_ce() as f64, *total])
        .collect();

    Plot::new("monthly_gross")
        .height(CHART_HEIGHT)
        .x_axis_formatter(|mark: GridMark, _range| month_label(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(SERIES_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(SERIES_COLOR)
                    .radius(3.0),
            );
        });
}

fn month_label(days_from_ce: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days_from_ce.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Gross BRL per area, descending.
pub fn area_bars(ui: &mut Ui, table: &Table) {
    group_bars_chart(
        ui,
        "area_bars",
        "Bruto (BRL) por área",
        table,
        COL_AREA,
        None,
        "Colunas AREA e/ou VALOR BRUTO BRL não encontradas.",
    );
}

/// Gross BRL per business unit, descending.
pub fn bu_bars(ui: &mut Ui, table: &Table) {
    group_bars_chart(
        ui,
        "bu_bars",
        "Bruto (BRL) por BU",
        table,
        COL_BU,
        None,
        "Colunas BU e/ou VALOR BRUTO BRL não encontradas.",
    );
}

/// Top clients by gross BRL.
pub fn top_clients(ui: &mut Ui, table: &Table, top_n: usize) {
    group_bars_chart(
        ui,
        "top_clients",
        &format!("Top {top_n} clientes por Bruto (BRL)"),
        table,
        COL_CLIENT,
        Some(top_n),
        "Colunas CLIENTE e VALOR BRUTO BRL não encontradas.",
    );
}

fn group_bars_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    table: &Table,
    group_column: &str,
    top_n: Option<usize>,
    missing_message: &str,
) {
    ui.strong(title);
    let groups = match group_sum(table, group_column, COL_GROSS_BRL, top_n, true, false) {
        Ok(groups) => groups,
        Err(_) => {
            ui.label(missing_message);
            return;
        }
    };
    let labels: Vec<String> = groups.iter().map(|(key, _)| key.to_string()).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (_, total))| Bar::new(i as f64, *total).width(0.6))
        .collect();

    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark: GridMark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(SERIES_COLOR));
        });
}

/// Label only the integer marks that map onto a bar.
fn index_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Row counts per status. Missing is its own bucket, drawn gray.
pub fn status_chart(ui: &mut Ui, table: &Table) {
    ui.strong("Distribuição por status");
    let buckets = match status_distribution(table, COL_STATUS) {
        Ok(buckets) => buckets,
        Err(_) => {
            ui.label("Coluna STATUS não encontrada.");
            return;
        }
    };
    let labels: Vec<String> = buckets.iter().map(|(key, _)| key.to_string()).collect();
    let colors = CategoryColors::from_values(
        &buckets.iter().map(|(key, _)| key.clone()).collect(),
    );
    let bars: Vec<Bar> = buckets
        .iter()
        .enumerate()
        .map(|(i, (key, count))| {
            Bar::new(i as f64, *count as f64)
                .width(0.6)
                .fill(colors.color_for(key))
        })
        .collect();

    Plot::new("status_chart")
        .height(CHART_HEIGHT)
        .x_axis_formatter(move |mark: GridMark, _range| index_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Financial: numeric relation scatter
// ---------------------------------------------------------------------------

const SCATTER_CANDIDATES: &[&str] = &[COL_GROSS_BRL, COL_TAXES, COL_NET_BRL];

/// Scatter of two user-chosen numeric columns, colored by area.
pub fn numeric_scatter(ui: &mut Ui, state: &mut AppState, table: &Table) {
    let available: Vec<&str> = SCATTER_CANDIDATES
        .iter()
        .copied()
        .filter(|col| table.has_column(col))
        .collect();
    if available.len() < 2 {
        ui.label("Poucas colunas numéricas para gráfico de dispersão.");
        return;
    }

    // Reset stale selections when a column vanished with the source.
    if !available.contains(&state.scatter_x.as_str()) {
        state.scatter_x = available[0].to_string();
    }
    if !available.contains(&state.scatter_y.as_str()) {
        state.scatter_y = available[1].to_string();
    }

    ui.horizontal(|ui: &mut Ui| {
        axis_combo(ui, "Eixo X", "scatter_x", &mut state.scatter_x, &available);
        axis_combo(ui, "Eixo Y", "scatter_y", &mut state.scatter_y, &available);
    });
    ui.strong(format!("Relação: {} vs {}", state.scatter_x, state.scatter_y));

    // One series per area so the legend doubles as a color key.
    let colors = table
        .observed
        .get(COL_AREA)
        .map(CategoryColors::from_values)
        .unwrap_or_default();
    let mut series: std::collections::BTreeMap<CellValue, Vec<[f64; 2]>> =
        std::collections::BTreeMap::new();
    for record in &table.records {
        let (Some(x), Some(y)) = (
            record.number(&state.scatter_x),
            record.number(&state.scatter_y),
        ) else {
            continue;
        };
        series
            .entry(record.get(COL_AREA).clone())
            .or_default()
            .push([x, y]);
    }

    Plot::new("numeric_scatter")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (area, points) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(area.to_string())
                        .color(colors.color_for(&area))
                        .radius(2.5),
                );
            }
        });
}

fn axis_combo(ui: &mut Ui, label: &str, id: &str, current: &mut String, options: &[&str]) {
    ui.label(label);
    eframe::egui::ComboBox::from_id_salt(id)
        .selected_text(current.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                ui.selectable_value(current, (*option).to_string(), *option);
            }
        });
}

// ---------------------------------------------------------------------------
// Operational: aging histogram
// ---------------------------------------------------------------------------

/// Histogram of days elapsed since the document date.
pub fn aging_histogram(ui: &mut Ui, table: &Table, reference: NaiveDate, bins: usize) {
    ui.strong("Aging (dias desde DATA)");
    let ages = match age_days(table, COL_DATE, reference) {
        Ok(ages) => ages,
        Err(_) => {
            ui.label("Coluna DATA não encontrada para aging.");
            return;
        }
    };
    let ages: Vec<i64> = ages.into_iter().flatten().collect();
    if ages.is_empty() {
        ui.label("Sem datas para aging.");
        return;
    }

    let min = ages.iter().copied().min().unwrap_or(0);
    let max = ages.iter().copied().max().unwrap_or(0);
    let bins = bins.max(1);
    let width = (((max - min + 1) as f64) / bins as f64).ceil().max(1.0);

    let mut counts = vec![0usize; bins];
    for age in &ages {
        let idx = (((age - min) as f64) / width) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(i, count)| {
            let center = min as f64 + width * (i as f64 + 0.5);
            Bar::new(center, *count as f64).width(width * 0.95)
        })
        .collect();

    Plot::new("aging_histogram")
        .height(CHART_HEIGHT)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(SERIES_COLOR));
        });
}
