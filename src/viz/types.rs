//! Public types and constants for the visualization module.

/// Legend placement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendMode {
    /// Overlay legend inside the plotting area (may overlap data).
    Inside,
    /// Separate, non-overlapping legend panel on the right side.
    Right,
    /// Separate, non-overlapping legend band at the bottom.
    Bottom,
}

/// Horizontal legend below the chart keeps country names close to the x-axis start.
pub const DEFAULT_LEGEND_MODE: LegendMode = LegendMode::Bottom;

/// Marker drawn on every observation; cycles per series so lines stay
/// distinguishable without color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Diamond,
}

impl MarkerShape {
    const ALL: [MarkerShape; 4] = [
        MarkerShape::Circle,
        MarkerShape::Square,
        MarkerShape::Triangle,
        MarkerShape::Diamond,
    ];

    pub fn for_index(idx: usize) -> Self {
        Self::ALL[idx % Self::ALL.len()]
    }
}

/// Size, locale and legend placement of a rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    /// Locale tag for tick labels (`en`, `de`, ...).
    pub locale: String,
    pub legend: LegendMode,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            locale: "en".into(),
            legend: DEFAULT_LEGEND_MODE,
        }
    }
}
