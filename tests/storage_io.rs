use povrank::models::{ObservationRow, ObservationTable};
use povrank::{rank, sample, storage};
use std::fs;

fn rows() -> Vec<ObservationRow> {
    vec![
        ObservationRow {
            year: 2019,
            country: "Congo, Dem. Rep.".into(),
            iso3: "COD".into(),
            poverty_rate: 78.9,
        },
        ObservationRow {
            year: 2019,
            country: "Zambia".into(),
            iso3: "ZMB".into(),
            poverty_rate: 61.4,
        },
    ]
}

#[test]
fn save_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows();

    let csv_path = dir.path().join("obs.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("Year,Country,ISO3,Headcount215"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    // Names with commas survive.
    assert_eq!(sample::load_sample_from_path(&csv_path).unwrap().rows(), rows.as_slice());

    let json_path = dir.path().join("obs.json");
    storage::save_json(&rows, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), rows.len());
    assert_eq!(v[0]["ISO3"], "COD");
}

#[test]
fn ranked_exports_carry_rank() {
    let dir = tempfile::tempdir().unwrap();
    let ranked = rank::rank(&ObservationTable::new(rows()), 2019, 2019);

    let csv_path = dir.path().join("ranked.csv");
    storage::save_ranked_csv(&ranked, &csv_path).unwrap();
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[4], "Rank");
    let ranks: Vec<String> = rdr
        .records()
        .map(|r| r.unwrap()[4].to_string())
        .collect();
    assert_eq!(ranks.len(), 2);
    assert!(ranks.contains(&"1".to_string()) && ranks.contains(&"2".to_string()));

    let json_path = dir.path().join("ranked.json");
    storage::save_json(&ranked, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert!(v[0].get("Rank").is_some());
    assert!(v[0].get("Country").is_some());
}
