use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Categorical colors for chart series
// ---------------------------------------------------------------------------

/// Assigns each category value of a column a distinct, stable color.
/// Missing always renders gray so it reads as "no value" in every chart.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<CellValue, Color32>,
}

impl CategoryColors {
    /// Build a color assignment for a set of category values, spreading
    /// hues evenly around the wheel.
    pub fn from_values(values: &BTreeSet<CellValue>) -> Self {
        let n = values.len().max(1);
        let mapping = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let hue = (i as f32 / n as f32) * 360.0;
                let rgb: Srgb = Hsl::new(hue, 0.65, 0.55).into_color();
                let color = Color32::from_rgb(
                    (rgb.red * 255.0) as u8,
                    (rgb.green * 255.0) as u8,
                    (rgb.blue * 255.0) as u8,
                );
                (value.clone(), color)
            })
            .collect();
        CategoryColors { mapping }
    }

    /// Color for a value; unknown or missing values render gray.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        if value.is_missing() {
            return Color32::GRAY;
        }
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_values_get_distinct_colors() {
        let values: BTreeSet<CellValue> = ["RCAL", "SCAL", "GEOLOGY"]
            .iter()
            .map(|s| CellValue::Text((*s).into()))
            .collect();
        let colors = CategoryColors::from_values(&values);
        let assigned: BTreeSet<_> = values
            .iter()
            .map(|v| {
                let c = colors.color_for(v);
                (c.r(), c.g(), c.b())
            })
            .collect();
        assert_eq!(assigned.len(), values.len());
    }

    #[test]
    fn missing_is_always_gray() {
        let colors = CategoryColors::default();
        assert_eq!(colors.color_for(&CellValue::Missing), Color32::GRAY);
    }
}
