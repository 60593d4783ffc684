use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("povrank"));
}

#[test]
fn show_offline_prints_previews_and_series() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "--offline", "--top", "3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Using bundled sample data"))
        .stdout(predicate::str::contains("Latest year Top 3"))
        .stdout(predicate::str::contains("Start of selected range Top 3"))
        .stdout(predicate::str::contains("India (IND)"))
        .stdout(predicate::str::contains("Interpretation guide"));
}

#[test]
fn show_without_countries_prints_message() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "--offline", "--clear-countries"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            povrank::dashboard::NO_COUNTRIES_MESSAGE,
        ));
}

#[test]
fn offline_custom_sample_is_named_in_status() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("snapshot.csv");
    std::fs::write(&csv, "Year,Country,ISO3,Headcount215\n2019,Aland,ALA,3.5\n").unwrap();
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "--offline", "--sample"]).arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Offline mode. Using sample data from"))
        .stdout(predicate::str::contains("snapshot.csv"))
        .stdout(predicate::str::contains("bundled").not());
}

#[test]
fn top_outside_range_is_rejected() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "--offline", "--top", "51"]);
    cmd.assert().failure();
}

#[test]
fn unreachable_api_falls_back() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args([
        "countries",
        "--base-url",
        "http://127.0.0.1:9/v2",
        "--timeout",
        "2",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Korea, Rep."));
}

#[test]
fn show_writes_plot_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chart.svg");
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "--offline", "--y-axis", "rate", "-c", "NGA", "-c", "Brazil", "--plot"])
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nigeria (NGA)"));
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn export_ranked_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("ranks.csv");
    Command::cargo_bin("povrank")
        .unwrap()
        .args(["export", "--offline", "--ranked", "--from", "2019", "--to", "2020", "--out"])
        .arg(&csv)
        .assert()
        .success();
    let text = std::fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("Year,Country,ISO3,Headcount215,Rank"));

    let json = dir.path().join("table.json");
    Command::cargo_bin("povrank")
        .unwrap()
        .args(["export", "--offline", "--out"])
        .arg(&json)
        .assert()
        .success();
    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert!(!v.as_array().unwrap().is_empty());
    assert!(v[0].get("Headcount215").is_some());
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn show_online() {
    let mut cmd = Command::cargo_bin("povrank").unwrap();
    cmd.args(["show", "-c", "IND"]);
    cmd.assert().success();
}
