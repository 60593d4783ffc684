//! Remote-first data loading with a bundled fallback.
//!
//! The remote outcome (success *or* failure) is cached for [`LoaderConfig::remote_ttl`],
//! so a failing API is tried once per window. The fallback table is cached
//! for the lifetime of the loader.

use crate::api::{Client, RemoteSource};
use crate::cache::TtlCache;
use crate::models::ObservationTable;
use crate::sample;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where the fallback table comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FallbackSource {
    /// CSV compiled into the binary.
    #[default]
    Bundled,
    /// CSV with the same columns on disk.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub remote_ttl: Duration,
    pub fallback: FallbackSource,
    /// Skip the network entirely.
    pub offline: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            remote_ttl: Duration::from_secs(60 * 60),
            fallback: FallbackSource::Bundled,
            offline: false,
        }
    }
}

/// Why the fallback table is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The network was never tried.
    Offline,
    /// The remote fetch failed with this message.
    RemoteFailed(String),
}

/// Which source produced the active table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote { description: String },
    Fallback {
        origin: FallbackSource,
        reason: FallbackReason,
    },
}

impl DataSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Remote { .. })
    }
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Arc<ObservationTable>,
    pub source: DataSource,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedTable {
    /// One-line message telling the user which data is shown.
    pub fn status_line(&self) -> String {
        match &self.source {
            DataSource::Remote { description } => format!(
                "Loaded {} observations from {} at {}.",
                self.table.len(),
                description,
                self.loaded_at.format("%Y-%m-%d %H:%M UTC")
            ),
            DataSource::Fallback { origin, reason } => {
                let lead = match reason {
                    FallbackReason::Offline => "Offline mode.",
                    FallbackReason::RemoteFailed(_) => "World Bank API unavailable.",
                };
                let data = match origin {
                    FallbackSource::Bundled => "bundled sample data".to_string(),
                    FallbackSource::File(path) => format!("sample data from {}", path.display()),
                };
                format!("{lead} Using {data} ({} observations).", self.table.len())
            }
        }
    }
}

#[derive(Debug, Clone)]
struct RemoteOutcome {
    table: Option<Arc<ObservationTable>>,
    reason: String,
    at: DateTime<Utc>,
}

const REMOTE_KEY: &str = "remote";
const FALLBACK_KEY: &str = "fallback";

pub struct DataLoader<R = Client> {
    remote: R,
    config: LoaderConfig,
    remote_cache: TtlCache<&'static str, RemoteOutcome>,
    fallback_cache: TtlCache<&'static str, (Arc<ObservationTable>, DateTime<Utc>)>,
}

impl DataLoader<Client> {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_remote(Client::default(), config)
    }
}

impl Default for DataLoader<Client> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<R: RemoteSource> DataLoader<R> {
    pub fn with_remote(remote: R, config: LoaderConfig) -> Self {
        Self {
            remote_cache: TtlCache::with_ttl(config.remote_ttl),
            fallback_cache: TtlCache::forever(),
            remote,
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Produce the session table: remote if available, otherwise the fallback.
    ///
    /// Only a broken fallback is an error.
    pub fn load(&mut self) -> Result<LoadedTable> {
        if !self.config.offline {
            let outcome = self.remote_outcome();
            if let Some(table) = outcome.table {
                log::info!("using remote data ({} rows)", table.len());
                return Ok(LoadedTable {
                    table,
                    source: DataSource::Remote {
                        description: self.remote.describe(),
                    },
                    loaded_at: outcome.at,
                });
            }
            log::warn!("remote unavailable, using fallback: {}", outcome.reason);
            return self.fallback(FallbackReason::RemoteFailed(outcome.reason));
        }
        self.fallback(FallbackReason::Offline)
    }

    /// Forget the cached remote outcome so the next [`load`](Self::load) hits the network.
    pub fn invalidate(&mut self) {
        self.remote_cache.clear();
    }

    fn remote_outcome(&mut self) -> RemoteOutcome {
        let remote = &self.remote;
        self.remote_cache
            .get_or_insert_with(REMOTE_KEY, || match remote.fetch_observations() {
                Ok(rows) => RemoteOutcome {
                    table: Some(Arc::new(ObservationTable::new(rows))),
                    reason: String::new(),
                    at: Utc::now(),
                },
                Err(e) => RemoteOutcome {
                    table: None,
                    reason: e.to_string(),
                    at: Utc::now(),
                },
            })
    }

    fn fallback(&mut self, reason: FallbackReason) -> Result<LoadedTable> {
        let source = self.config.fallback.clone();
        let (table, loaded_at) = self.fallback_cache.try_get_or_insert_with(FALLBACK_KEY, || {
            let table = match &source {
                FallbackSource::Bundled => sample::load_sample()?,
                FallbackSource::File(path) => sample::load_sample_from_path(path)?,
            };
            Ok::<_, anyhow::Error>((Arc::new(table), Utc::now()))
        })?;
        Ok(LoadedTable {
            table,
            source: DataSource::Fallback {
                origin: source,
                reason,
            },
            loaded_at,
        })
    }
}
