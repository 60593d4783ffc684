//! povrank
//!
//! Rank the world's countries by poverty headcount ratio ($2.15/day, World Bank
//! `SI.POV.DDAY`) per year, and show the result as Top-N tables and a line chart.
//! Pairs with the `povrank` CLI and the `povrank-gui` dashboard.
//!
//! ### Pipeline
//! - [`loader`]: World Bank API first, bundled sample on any failure; cached per session
//! - [`rank`]: year filter and per-year dense rank (1 = highest poverty rate)
//! - [`dashboard`]: pure render cycle from (table, controls) to previews and chart data
//! - [`viz`]: chart rendering to SVG/PNG or an RGB buffer
//!
//! ### Example
//! ```no_run
//! use povrank::dashboard::{self, Controls};
//! use povrank::loader::DataLoader;
//!
//! let mut loader = DataLoader::default();
//! let loaded = loader.load()?;
//! println!("{}", loaded.status_line());
//! let controls = Controls::defaults_for(&loaded.table);
//! let view = dashboard::render(&loaded.table, &controls);
//! if let Some(chart) = view.chart.chart() {
//!     povrank::viz::plot_chart(chart, "ranks.svg", &Default::default())?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod dashboard;
pub mod loader;
pub mod models;
pub mod rank;
pub mod sample;
pub mod storage;
pub mod viz;

pub use api::{Client, ClientConfig, FetchError, RemoteSource};
pub use dashboard::{Controls, DashboardView};
pub use loader::{DataLoader, DataSource, FallbackReason, FallbackSource, LoadedTable, LoaderConfig};
pub use models::{ObservationRow, ObservationTable, RankedRow, YAxisMode};
