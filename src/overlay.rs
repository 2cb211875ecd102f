use chrono::NaiveDateTime;
use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::data::model::TimeSeries;
use crate::merge::AlignedColumnSet;
use crate::views::ViewId;

/// Colour of the anomaly scatter on every overlay.
pub const ANOMALY_COLOR: [u8; 3] = [220, 20, 60];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// AnomalyOverlay – what a plotting collaborator needs per view
// ---------------------------------------------------------------------------

/// One view's rendering description: the source series as a line, the
/// anomalous points as a scatter on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyOverlay {
    pub view: ViewId,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub series_color: [u8; 3],
    pub anomaly_color: [u8; 3],
    /// `(timestamp, source value)` for each row labelled anomalous.
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Build one overlay per aligned view, colouring series lines apart.
pub fn build_overlays(
    series: &TimeSeries,
    groups: &[AlignedColumnSet],
    x_label: Option<&str>,
    y_label: Option<&str>,
) -> Vec<AnomalyOverlay> {
    let palette = generate_palette(groups.len());
    groups
        .iter()
        .zip(palette)
        .map(|(group, series_color)| AnomalyOverlay {
            view: group.id,
            title: group.id.kind.title(),
            x_label: x_label.map(str::to_string),
            y_label: y_label.map(str::to_string),
            series_color,
            anomaly_color: ANOMALY_COLOR,
            points: group
                .anomalous_rows()
                .map(|i| (series.timestamps()[i], series.values()[i]))
                .collect(),
        })
        .collect()
}
