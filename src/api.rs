//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! Fetches the poverty headcount indicator for all countries in a single
//! page (`per_page=20000`) and converts the records into [`ObservationRow`]s.
//!
//! ### Notes
//! - One attempt per call, no retries; the timeout is 20s.
//! - The response is `[Meta, [Record, ...]]`, or `[{"message": ...}]` on API errors.
//! - Records missing country, ISO3, year or value are dropped silently.
//!
//! Typical usage:
//! ```no_run
//! # use povrank::api::{Client, RemoteSource};
//! let client = Client::default();
//! let rows = client.fetch_observations()?;
//! # Ok::<(), povrank::api::FetchError>(())
//! ```
use crate::models::{Meta, ObservationRow, Record};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// World Bank code for "Poverty headcount ratio at $2.15 a day (2017 PPP)".
pub const POVERTY_INDICATOR: &str = "SI.POV.DDAY";

/// Reasons the remote fetch can fail. The loader treats all of them the same way.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed with HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Envelope(String),
    #[error("world bank api error: {0}")]
    Api(String),
    #[error("no usable records in response")]
    Empty,
}

/// Something that can produce observations from the network.
pub trait RemoteSource {
    fn fetch_observations(&self) -> Result<Vec<ObservationRow>, FetchError>;

    /// Human-readable description used in status lines.
    fn describe(&self) -> String {
        format!("World Bank API ({POVERTY_INDICATOR})")
    }
}

/// Endpoint and limits used by [`Client`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub indicator: String,
    pub per_page: u32,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            indicator: POVERTY_INDICATOR.into(),
            per_page: 20_000,
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_config(ClientConfig::default())
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

impl Client {
    pub fn with_config(config: ClientConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout) // total request timeout
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(5))
            .user_agent(concat!("povrank/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full request URL for the configured indicator.
    pub fn url(&self) -> String {
        format!(
            "{}/country/all/indicator/{}?format=json&per_page={}",
            self.config.base_url.trim_end_matches('/'),
            enc(&self.config.indicator),
            self.config.per_page
        )
    }
}

impl RemoteSource for Client {
    fn fetch_observations(&self) -> Result<Vec<ObservationRow>, FetchError> {
        let url = self.url();
        log::debug!("GET {url}");
        let resp = self.http.get(&url).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        let body = resp.text()?;
        let v: Value = serde_json::from_str(&body)?;
        parse_envelope(v)
    }

    fn describe(&self) -> String {
        format!("World Bank API ({})", self.config.indicator)
    }
}

/// Parse a `[Meta, [Record, ...]]` envelope into observations.
///
/// Fails on a non-array or short envelope, on an API error payload, and when
/// no record survives the missing-field filter.
pub fn parse_envelope(v: Value) -> Result<Vec<ObservationRow>, FetchError> {
    let arr = match v {
        Value::Array(arr) => arr,
        _ => return Err(FetchError::Envelope("not a top-level array".into())),
    };

    // If first element has "message", surface API error.
    if let Some(first) = arr.first()
        && first.get("message").is_some()
    {
        return Err(FetchError::Api(first.to_string()));
    }
    if arr.len() < 2 {
        return Err(FetchError::Envelope(format!(
            "expected 2 elements, got {}",
            arr.len()
        )));
    }

    let mut it = arr.into_iter();
    let meta = it.next().map(serde_json::from_value::<Meta>);
    if let Some(Ok(meta)) = &meta {
        log::debug!(
            "envelope meta: page {}/{} per_page={} total={}",
            meta.page,
            meta.pages,
            meta.per_page,
            meta.total
        );
    }

    let records = match it.next() {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(FetchError::Envelope(format!(
                "records element is not an array: {}",
                type_name(&other)
            )));
        }
    };

    let total = records.len();
    // Records that do not even deserialize count as malformed and are skipped.
    let rows: Vec<ObservationRow> = records
        .into_iter()
        .filter_map(|r| serde_json::from_value::<Record>(r).ok())
        .filter_map(Record::into_observation)
        .collect();
    log::debug!("kept {} of {} records", rows.len(), total);

    if rows.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(rows)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
