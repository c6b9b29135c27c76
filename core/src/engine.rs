//! The metrics engine: one calculation cycle end to end.
//!
//! ORDER (fixed):
//!   1. Score every officer that carries raw metrics
//!   2. Attach the risk band to each scored officer
//!   3. Aggregate the portfolio in input order
//!   4. Attach trends against the previous cycle, if given
//!   5. Roll up branches
//!
//! RULES:
//!   - The engine holds configuration only; it has no mutable state.
//!   - Input is a fully materialized Vec owned by the call.
//!   - Nothing here reads from or writes to the store.

use crate::{
    branch::{roll_up_branches, BranchMetrics},
    classify::RiskBand,
    config::MetricsConfig,
    error::{MetricsError, MetricsResult},
    officer::OfficerRecord,
    portfolio::{PortfolioAggregator, PortfolioMetrics, Trends},
    scoring::{CalculatedMetrics, ScoreCalculator},
    snapshot::RawMetrics,
    types::CycleDate,
};
use serde::{Deserialize, Serialize};

/// Everything the dashboard needs for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: CycleDate,
    pub officers: Vec<OfficerRecord>,
    pub portfolio: PortfolioMetrics,
    pub branches: Vec<BranchMetrics>,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    calculator: ScoreCalculator,
    aggregator: PortfolioAggregator,
}

impl MetricsEngine {
    /// Rejects a config that fails `MetricsConfig::validate`.
    pub fn new(config: MetricsConfig) -> MetricsResult<Self> {
        Ok(Self {
            aggregator: PortfolioAggregator::new(&config),
            calculator: ScoreCalculator::new(config)?,
        })
    }

    /// Build an engine from the scoring model under `data_dir`.
    pub fn build(data_dir: &str) -> anyhow::Result<Self> {
        let config = MetricsConfig::load(data_dir)?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &MetricsConfig {
        self.calculator.config()
    }

    pub fn score(&self, raw: &RawMetrics) -> CalculatedMetrics {
        self.calculator.calculate(raw)
    }

    /// Score one officer in place.
    ///
    /// Calling this is a statement that the officer has data for the cycle;
    /// a record without raw metrics is a caller bug and fails loudly.
    pub fn score_officer(&self, officer: &mut OfficerRecord) -> MetricsResult<()> {
        let raw = officer
            .raw_metrics
            .as_ref()
            .ok_or_else(|| MetricsError::MissingRawMetrics {
                officer_id: officer.officer_id.clone(),
            })?;

        let calculated = self.calculator.calculate(raw);
        log::debug!(
            "officer={} risk_score={} dqi={} ayr={:.4}",
            officer.officer_id,
            calculated.risk_score,
            calculated.dqi,
            calculated.ayr
        );
        officer.risk_band = Some(RiskBand::from_score(calculated.risk_score));
        officer.calculated_metrics = Some(calculated);
        Ok(())
    }

    pub fn aggregate(&self, officers: &[OfficerRecord]) -> PortfolioMetrics {
        self.aggregator.aggregate(officers)
    }

    pub fn run_cycle(
        &self,
        cycle: CycleDate,
        mut officers: Vec<OfficerRecord>,
        previous: Option<&PortfolioMetrics>,
    ) -> MetricsResult<CycleReport> {
        let mut unscored = 0usize;
        for officer in &mut officers {
            if officer.raw_metrics.is_some() {
                self.score_officer(officer)?;
            } else {
                // Stale results from an earlier run must not reach the roll-up.
                officer.calculated_metrics = None;
                officer.risk_band = None;
                unscored += 1;
                log::warn!(
                    "cycle={cycle} officer={} has no raw metrics; counted but not scored",
                    officer.officer_id
                );
            }
        }

        let mut portfolio = self.aggregator.aggregate(&officers);
        if let Some(prev) = previous {
            portfolio.trends = Some(Trends::between(&portfolio, prev));
        }
        let branches = roll_up_branches(&officers);

        log::info!(
            "cycle={cycle} officers={} unscored={unscored} watchlist={} avg_risk={} top={}",
            portfolio.total_officers,
            portfolio.watchlist_count,
            portfolio.avg_risk_score,
            portfolio
                .top_officer
                .as_ref()
                .map(|t| t.officer_id.as_str())
                .unwrap_or("-"),
        );

        Ok(CycleReport {
            cycle,
            officers,
            portfolio,
            branches,
        })
    }
}
