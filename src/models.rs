use serde::{Deserialize, Serialize};

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
    #[serde(default)]
    pub lastupdated: Option<String>,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative or oversized value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// `{"id": "...", "value": "..."}` pair used by the API for countries and indicators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Raw record from the API (position 1 array).
///
/// Every field is optional: incomplete records are dropped when converted
/// into [`ObservationRow`], never rejected as a whole response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub country: Option<CountryRef>,
    #[serde(default)]
    pub countryiso3code: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Record {
    /// Convert into an observation, or `None` when country, ISO3, year or value is missing.
    pub fn into_observation(self) -> Option<ObservationRow> {
        let country = self
            .country
            .and_then(|c| c.value)
            .filter(|s| !s.trim().is_empty())?;
        let iso3 = self.countryiso3code.filter(|s| !s.trim().is_empty())?;
        let year = self.date?.trim().parse::<i32>().ok()?;
        let poverty_rate = self.value.filter(|v| v.is_finite())?;
        Some(ObservationRow {
            year,
            country,
            iso3,
            poverty_rate,
        })
    }
}

/// One observation: poverty headcount ratio of a country in a year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservationRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "ISO3")]
    pub iso3: String,
    /// Percentage of the population below $2.15/day.
    #[serde(rename = "Headcount215")]
    pub poverty_rate: f64,
}

/// Immutable table of observations. Derived views are built as new vectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    rows: Vec<ObservationRow>,
}

impl ObservationTable {
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inclusive (min, max) year present in the table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Distinct country names, sorted.
    pub fn countries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.country.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

impl From<Vec<ObservationRow>> for ObservationTable {
    fn from(rows: Vec<ObservationRow>) -> Self {
        Self::new(rows)
    }
}

/// Observation plus its dense rank within the year (1 = highest poverty rate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedRow {
    #[serde(flatten)]
    pub observation: ObservationRow,
    #[serde(rename = "Rank")]
    pub rank: u32,
}

impl RankedRow {
    pub fn year(&self) -> i32 {
        self.observation.year
    }

    pub fn country(&self) -> &str {
        &self.observation.country
    }

    pub fn iso3(&self) -> &str {
        &self.observation.iso3
    }

    pub fn poverty_rate(&self) -> f64 {
        self.observation.poverty_rate
    }
}

/// What the chart's Y axis shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YAxisMode {
    /// Raw headcount ratio in percent.
    Percentage,
    /// Per-year rank; axis inverted so rank 1 sits at the top.
    #[default]
    Rank,
}

impl YAxisMode {
    pub fn label(&self) -> &'static str {
        match self {
            YAxisMode::Percentage => "Poverty rate (%)",
            YAxisMode::Rank => "Rank (1 = highest poverty rate)",
        }
    }
}
