use crate::models::{ObservationRow, RankedRow};
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save observations as CSV with the same header as the bundled sample.
pub fn save_csv<P: AsRef<Path>>(rows: &[ObservationRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("Year", "Country", "ISO3", "Headcount215"))?;
    for r in rows {
        wtr.serialize((r.year, &r.country, &r.iso3, r.poverty_rate))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a ranked view as CSV (sample columns plus `Rank`).
pub fn save_ranked_csv<P: AsRef<Path>>(rows: &[RankedRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("Year", "Country", "ISO3", "Headcount215", "Rank"))?;
    for r in rows {
        wtr.serialize((r.year(), r.country(), r.iso3(), r.poverty_rate(), r.rank))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any serializable rows as a pretty JSON array.
pub fn save_json<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::load_sample_from_path;
    use tempfile::tempdir;

    #[test]
    fn csv_export_reloads_as_sample() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let rows = vec![ObservationRow {
            year: 2019,
            country: "Korea, Rep.".into(),
            iso3: "KOR".into(),
            poverty_rate: 0.2,
        }];
        save_csv(&rows, &csvp).unwrap();
        let back = load_sample_from_path(&csvp).unwrap();
        assert_eq!(back.rows(), rows.as_slice());
    }
}
