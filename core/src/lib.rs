//! Loan-portfolio metrics core.
//!
//! Pure modules (no I/O, no shared state):
//!   - snapshot   per-officer raw counters for one cycle
//!   - scoring    raw counters -> composite quality and risk indicators
//!   - portfolio  officer results -> portfolio KPIs
//!   - branch     officer results -> per-branch roll-up
//!   - classify   risk band, DPD status, roll direction
//!   - rounding   display rounding
//!
//! `store` is the SQLite snapshot producer. It is the only module that
//! performs I/O and the engine never writes its results back.

pub mod branch;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod officer;
pub mod portfolio;
pub mod rounding;
pub mod scoring;
pub mod snapshot;
pub mod store;
pub mod team;
pub mod types;

pub use classify::{DpdStatus, RiskBand, RollDirection};
pub use config::MetricsConfig;
pub use engine::{CycleReport, MetricsEngine};
pub use error::{MetricsError, MetricsResult};
pub use officer::OfficerRecord;
pub use portfolio::{PortfolioAggregator, PortfolioMetrics, TopOfficer, Trends};
pub use scoring::{CalculatedMetrics, ScoreCalculator};
pub use snapshot::RawMetrics;
