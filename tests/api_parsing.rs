use povrank::api::{FetchError, parse_envelope};
use povrank::models::{Meta, ObservationRow};

#[test]
fn parse_sample_json() {
    let sample = r#"
    [
      {"page":1,"pages":1,"per_page":"20000","total":4,"lastupdated":"2024-06-28"},
      [
        {
          "indicator":{"id":"SI.POV.DDAY","value":"Poverty headcount ratio at $2.15 a day (2017 PPP) (% of population)"},
          "country":{"id":"IN","value":"India"},
          "countryiso3code":"IND",
          "date":"2019",
          "value":10.0,
          "unit":"",
          "obs_status":"",
          "decimal":1
        },
        {
          "indicator":{"id":"SI.POV.DDAY","value":"Poverty headcount ratio at $2.15 a day (2017 PPP) (% of population)"},
          "country":{"id":"IN","value":"India"},
          "countryiso3code":"IND",
          "date":"2018",
          "value":null,
          "unit":"",
          "obs_status":"",
          "decimal":1
        },
        {
          "indicator":{"id":"SI.POV.DDAY","value":"Poverty headcount ratio at $2.15 a day (2017 PPP) (% of population)"},
          "country":{"id":"1A","value":"Arab World"},
          "countryiso3code":"",
          "date":"2019",
          "value":5.1,
          "unit":"",
          "obs_status":"",
          "decimal":1
        },
        {
          "indicator":{"id":"SI.POV.DDAY","value":"Poverty headcount ratio at $2.15 a day (2017 PPP) (% of population)"},
          "country":{"id":"NG","value":"Nigeria"},
          "countryiso3code":"NGA",
          "date":"2018",
          "value":30.9,
          "unit":"",
          "obs_status":"",
          "decimal":1
        }
      ]
    ]
    "#;

    let v: serde_json::Value = serde_json::from_str(sample).unwrap();
    let meta: Meta = serde_json::from_value(v[0].clone()).unwrap();
    assert_eq!(meta.per_page, 20000);
    assert_eq!(meta.total, 4);

    let rows = parse_envelope(v).unwrap();
    assert_eq!(
        rows,
        vec![
            ObservationRow {
                year: 2019,
                country: "India".into(),
                iso3: "IND".into(),
                poverty_rate: 10.0,
            },
            ObservationRow {
                year: 2018,
                country: "Nigeria".into(),
                iso3: "NGA".into(),
                poverty_rate: 30.9,
            },
        ]
    );
}

#[test]
fn records_missing_fields_are_dropped() {
    let v = serde_json::json!([
        {"page": 1, "pages": 1, "per_page": 50, "total": 5},
        [
            {"country": {"value": "A"}, "countryiso3code": "AAA", "date": "2019", "value": 1.5},
            {"countryiso3code": "BBB", "date": "2019", "value": 2.0},
            {"country": {"value": "C"}, "date": "2019", "value": 2.0},
            {"country": {"value": "D"}, "countryiso3code": "DDD", "value": 2.0},
            {"country": {"value": "E"}, "countryiso3code": "EEE", "date": "MRV", "value": 2.0},
            {"country": {"value": "F"}, "countryiso3code": "FFF", "date": "2019", "value": "oops"}
        ]
    ]);
    let rows = parse_envelope(v).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].country, "A");
    assert_eq!(rows[0].year, 2019);
}

#[test]
fn malformed_envelopes_fail() {
    let not_array = serde_json::json!({"page": 1});
    assert!(matches!(parse_envelope(not_array), Err(FetchError::Envelope(_))));

    let one_element = serde_json::json!([{"page": 1, "pages": 1, "per_page": 1, "total": 0}]);
    assert!(matches!(parse_envelope(one_element), Err(FetchError::Envelope(_))));

    let records_not_array = serde_json::json!([{"page": 1}, {"oops": true}]);
    assert!(matches!(
        parse_envelope(records_not_array),
        Err(FetchError::Envelope(_))
    ));
}

#[test]
fn api_error_message_is_surfaced() {
    let v = serde_json::json!([
        {"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}
    ]);
    match parse_envelope(v) {
        Err(FetchError::Api(msg)) => assert!(msg.contains("Invalid value")),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn zero_usable_rows_is_failure() {
    let empty = serde_json::json!([{"page": 0, "pages": 0, "per_page": "20000", "total": 0}, null]);
    assert!(matches!(parse_envelope(empty), Err(FetchError::Empty)));

    let all_null = serde_json::json!([
        {"page": 1, "pages": 1, "per_page": "20000", "total": 1},
        [{"country": {"value": "A"}, "countryiso3code": "AAA", "date": "2019", "value": null}]
    ]);
    assert!(matches!(parse_envelope(all_null), Err(FetchError::Empty)));
}
