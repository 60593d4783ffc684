//! Bundled static snapshot used when the API is unavailable.
//!
//! The CSV has the columns `Year,Country,ISO3,Headcount215` and is compiled
//! into the binary, so loading it only fails if the file itself is broken.

use crate::models::{ObservationRow, ObservationTable};
use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Raw bytes of `data/sample_poverty_215.csv`.
pub const SAMPLE_CSV: &str = include_str!("../data/sample_poverty_215.csv");

const REQUIRED_COLUMNS: [&str; 4] = ["Year", "Country", "ISO3", "Headcount215"];

/// Load the bundled snapshot.
pub fn load_sample() -> Result<ObservationTable> {
    parse_sample(SAMPLE_CSV.as_bytes()).context("parse bundled sample data")
}

/// Load a snapshot with the same columns from disk.
pub fn load_sample_from_path<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    parse_sample(file).with_context(|| format!("parse {}", path.display()))
}

/// Parse CSV with a header row. Rows that do not deserialize are skipped;
/// a missing column or an empty result is an error.
pub fn parse_sample<R: Read>(reader: R) -> Result<ObservationTable> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().context("read header row")?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("missing column {col:?}");
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (idx, rec) in rdr.deserialize::<ObservationRow>().enumerate() {
        match rec {
            Ok(row) if row.poverty_rate.is_finite() && !row.country.is_empty() => rows.push(row),
            Ok(_) => skipped += 1,
            Err(e) => {
                log::debug!("skipping sample row {}: {}", idx + 1, e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} malformed sample rows");
    }
    if rows.is_empty() {
        bail!("sample data contains no rows");
    }
    Ok(ObservationTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_sample_parses() {
        let t = load_sample().unwrap();
        assert!(t.len() > 50);
        assert!(t.countries().iter().any(|c| c == "Korea, Rep."));
        let (lo, hi) = t.year_bounds().unwrap();
        assert!(lo <= 2000 && hi >= 2020);
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let csv = "Year,Country,ISO3,Headcount215\n2019,A,AAA,60\nxx,B,BBB,1\n2019,C,CCC,\n2020,D,DDD,NaN\n";
        let t = parse_sample(csv.as_bytes()).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows()[0].country, "A");
    }

    #[test]
    fn missing_column_is_error() {
        let csv = "Year,Country,Value\n2019,A,1\n";
        assert!(parse_sample(csv.as_bytes()).is_err());
    }

    #[test]
    fn empty_sample_is_error() {
        let csv = "Year,Country,ISO3,Headcount215\n";
        assert!(parse_sample(csv.as_bytes()).is_err());
    }
}
