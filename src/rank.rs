//! Per-year dense ranking and the filters around it.

use crate::models::{ObservationRow, ObservationTable, RankedRow};
use ahash::AHashSet;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Rows with `year_min <= year <= year_max`.
pub fn filter_years(rows: &[ObservationRow], year_min: i32, year_max: i32) -> Vec<ObservationRow> {
    rows.iter()
        .filter(|r| r.year >= year_min && r.year <= year_max)
        .cloned()
        .collect()
}

/// Dense rank inside each year on descending rate: ties share a rank and the
/// next distinct rate gets the next integer.
///
/// Output is grouped by year (ascending) and sorted by rate within each year.
pub fn dense_rank_per_year(rows: Vec<ObservationRow>) -> Vec<RankedRow> {
    let mut by_year: BTreeMap<i32, Vec<ObservationRow>> = BTreeMap::new();
    for row in rows {
        by_year.entry(row.year).or_default().push(row);
    }

    let mut out = Vec::new();
    for (_year, mut group) in by_year {
        group.sort_by(|a, b| desc_rate(a.poverty_rate, b.poverty_rate));
        let mut rank = 0u32;
        let mut prev: Option<f64> = None;
        for observation in group {
            if prev != Some(observation.poverty_rate) {
                rank += 1;
                prev = Some(observation.poverty_rate);
            }
            out.push(RankedRow { observation, rank });
        }
    }
    out
}

/// Filter to the inclusive year range and rank each remaining year.
pub fn rank(table: &ObservationTable, year_min: i32, year_max: i32) -> Vec<RankedRow> {
    dense_rank_per_year(filter_years(table.rows(), year_min, year_max))
}

/// Keep rows whose country name or ISO3 code is in `selected`.
pub fn filter_countries(ranked: &[RankedRow], selected: &[String]) -> Vec<RankedRow> {
    let wanted: AHashSet<&str> = selected.iter().map(|s| s.as_str()).collect();
    ranked
        .iter()
        .filter(|r| wanted.contains(r.country()) || wanted.contains(r.iso3()))
        .cloned()
        .collect()
}

/// The `n` rows of `year` with the highest rate, highest first.
pub fn top_n_for_year(ranked: &[RankedRow], year: i32, n: usize) -> Vec<RankedRow> {
    let mut rows: Vec<RankedRow> = ranked.iter().filter(|r| r.year() == year).cloned().collect();
    rows.sort_by(|a, b| {
        desc_rate(a.poverty_rate(), b.poverty_rate()).then_with(|| a.country().cmp(b.country()))
    });
    rows.truncate(n);
    rows
}

/// Inclusive (min, max) year present in a ranked view.
pub fn year_bounds(ranked: &[RankedRow]) -> Option<(i32, i32)> {
    let min = ranked.iter().map(|r| r.year()).min()?;
    let max = ranked.iter().map(|r| r.year()).max()?;
    Some((min, max))
}

fn desc_rate(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, country: &str, rate: f64) -> ObservationRow {
        ObservationRow {
            year,
            country: country.into(),
            iso3: country.to_uppercase(),
            poverty_rate: rate,
        }
    }

    #[test]
    fn desc_rate_orders_highest_first() {
        let mut v = vec![1.0, 3.0, 2.0];
        v.sort_by(|a, b| desc_rate(*a, *b));
        assert_eq!(v, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn output_is_grouped_by_year() {
        let ranked = dense_rank_per_year(vec![row(2020, "a", 1.0), row(2019, "b", 1.0), row(2020, "c", 2.0)]);
        let years: Vec<i32> = ranked.iter().map(|r| r.year()).collect();
        assert_eq!(years, vec![2019, 2020, 2020]);
        assert_eq!(ranked[1].country(), "c");
    }
}
