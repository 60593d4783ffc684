//! The render cycle as a pure function.
//!
//! [`render`] maps the cached table plus the current [`Controls`] to a
//! [`DashboardView`]. Front ends call it again on every control change and
//! only draw what it returns.

use crate::models::{ObservationTable, RankedRow, YAxisMode};
use crate::rank;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOP_N_MIN: usize = 3;
pub const TOP_N_MAX: usize = 50;
pub const TOP_N_DEFAULT: usize = 10;
/// Width of the default year window, ending at the latest year.
pub const DEFAULT_YEAR_SPAN: i32 = 20;
/// Countries preselected when present in the data.
pub const DEFAULT_COUNTRIES: [&str; 5] = [
    "Korea, Rep.",
    "United States",
    "India",
    "Nigeria",
    "Brazil",
];

pub const NO_COUNTRIES_MESSAGE: &str = "Select at least one country to draw the chart.";

pub const INTERPRETATION_GUIDE: &str = "\
Interpretation guide
- The indicator is the share of the population (%) living below the international poverty line of $2.15/day (World Bank SI.POV.DDAY).
- \"Rank\" gives the country with the highest poverty rate in a year the smallest number (1).
- Country/year observations can be missing; compare countries over the same year range.";

/// Everything the user can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub year_min: i32,
    pub year_max: i32,
    /// Country names (ISO3 codes are accepted too).
    pub countries: Vec<String>,
    pub y_axis: YAxisMode,
    pub top_n: usize,
}

impl Controls {
    /// Initial controls for a freshly loaded table.
    pub fn defaults_for(table: &ObservationTable) -> Self {
        let (lo, hi) = table.year_bounds().unwrap_or((0, 0));
        let present = table.countries();
        Self {
            year_min: lo.max(hi - DEFAULT_YEAR_SPAN),
            year_max: hi,
            countries: DEFAULT_COUNTRIES
                .iter()
                .filter(|c| present.iter().any(|p| p == *c))
                .map(|c| c.to_string())
                .collect(),
            y_axis: YAxisMode::default(),
            top_n: TOP_N_DEFAULT,
        }
    }

    /// Pull the controls back inside what the widgets allow for `table`:
    /// years inside the data bounds (and ordered), Top-N inside 3..=50.
    pub fn clamped_to(mut self, table: &ObservationTable) -> Self {
        if let Some((lo, hi)) = table.year_bounds() {
            self.year_min = self.year_min.clamp(lo, hi);
            self.year_max = self.year_max.clamp(lo, hi);
        }
        if self.year_min > self.year_max {
            std::mem::swap(&mut self.year_min, &mut self.year_max);
        }
        self.top_n = self.top_n.clamp(TOP_N_MIN, TOP_N_MAX);
        self
    }
}

/// Map user input (country names or ISO3 codes, any case) to the country names
/// used in `table`. Returns `(resolved, unknown)`; duplicates are dropped.
pub fn resolve_countries(table: &ObservationTable, inputs: &[String]) -> (Vec<String>, Vec<String>) {
    let mut resolved: Vec<String> = Vec::new();
    let mut unknown = Vec::new();
    for input in inputs {
        let needle = input.trim();
        if needle.is_empty() {
            continue;
        }
        let hit = table.rows().iter().find(|r| {
            r.country.eq_ignore_ascii_case(needle) || r.iso3.eq_ignore_ascii_case(needle)
        });
        match hit {
            Some(r) if !resolved.contains(&r.country) => resolved.push(r.country.clone()),
            Some(_) => {}
            None => unknown.push(needle.to_string()),
        }
    }
    (resolved, unknown)
}

/// One Top-N preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewTable {
    pub year: i32,
    pub rows: Vec<RankedRow>,
}

impl PreviewTable {
    fn for_year(ranked: &[RankedRow], year: i32, n: usize) -> Self {
        Self {
            year,
            rows: rank::top_n_for_year(ranked, year, n),
        }
    }
}

/// One line of the chart: a country's points in year order. Missing years are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub country: String,
    pub iso3: String,
    pub points: Vec<(i32, f64)>,
}

/// Data for the line chart, independent of any drawing backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub y_axis: YAxisMode,
    pub year_min: i32,
    pub year_max: i32,
    pub series: Vec<Series>,
}

impl ChartData {
    /// Rank mode draws rank 1 at the top.
    pub fn y_inverted(&self) -> bool {
        matches!(self.y_axis, YAxisMode::Rank)
    }

    pub fn y_label(&self) -> &'static str {
        self.y_axis.label()
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartOutcome {
    Chart(ChartData),
    /// No country selected: show this message instead of a chart.
    Info(String),
}

impl ChartOutcome {
    pub fn chart(&self) -> Option<&ChartData> {
        match self {
            ChartOutcome::Chart(c) => Some(c),
            ChartOutcome::Info(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub controls: Controls,
    /// Ranked rows in the selected year range (all countries).
    pub ranked: Vec<RankedRow>,
    /// Top-N of the latest year present in `ranked`.
    pub latest: Option<PreviewTable>,
    /// Top-N of the earliest year present in `ranked`.
    pub earliest: Option<PreviewTable>,
    pub chart: ChartOutcome,
}

/// Run one render cycle: filter by year, rank, build previews, then the chart
/// for the selected countries (or the info message when none is selected).
pub fn render(table: &ObservationTable, controls: &Controls) -> DashboardView {
    let ranked = rank::rank(table, controls.year_min, controls.year_max);
    let n = controls.top_n.clamp(TOP_N_MIN, TOP_N_MAX);

    let (latest, earliest) = match rank::year_bounds(&ranked) {
        Some((first, last)) => (
            Some(PreviewTable::for_year(&ranked, last, n)),
            Some(PreviewTable::for_year(&ranked, first, n)),
        ),
        None => (None, None),
    };

    let chart = if controls.countries.is_empty() {
        ChartOutcome::Info(NO_COUNTRIES_MESSAGE.to_string())
    } else {
        let selected = rank::filter_countries(&ranked, &controls.countries);
        ChartOutcome::Chart(chart_data(&selected, controls))
    };

    DashboardView {
        controls: controls.clone(),
        ranked,
        latest,
        earliest,
        chart,
    }
}

fn chart_data(selected: &[RankedRow], controls: &Controls) -> ChartData {
    // Sorted by country, then year.
    let mut by_country: BTreeMap<(String, String), Vec<(i32, f64)>> = BTreeMap::new();
    for r in selected {
        let y = match controls.y_axis {
            YAxisMode::Percentage => r.poverty_rate(),
            YAxisMode::Rank => f64::from(r.rank),
        };
        by_country
            .entry((r.country().to_string(), r.iso3().to_string()))
            .or_default()
            .push((r.year(), y));
    }

    let series = by_country
        .into_iter()
        .map(|((country, iso3), mut points)| {
            points.sort_by_key(|(year, _)| *year);
            Series {
                country,
                iso3,
                points,
            }
        })
        .collect();

    let title = match controls.y_axis {
        YAxisMode::Percentage => "Poverty headcount ratio at $2.15/day by country",
        YAxisMode::Rank => "Poverty rank by country (per year, highest rate = 1)",
    };

    ChartData {
        title: title.to_string(),
        y_axis: controls.y_axis,
        year_min: controls.year_min,
        year_max: controls.year_max,
        series,
    }
}
