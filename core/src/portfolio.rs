//! Portfolio aggregator: officer results folded into portfolio KPIs.
//!
//! Single pass over an ordered, fully materialized list. Officers without
//! calculated metrics still count toward `total_officers` but add nothing
//! to the score sums; officers without raw metrics add nothing to the loan
//! and portfolio totals.
//!
//! An empty list yields the zero value with `total_officers == 0` and no
//! division is attempted. Callers must check `total_officers` before
//! trusting the averages.

use crate::{
    config::{AtRiskThresholds, MetricsConfig},
    officer::OfficerRecord,
    scoring::guarded_ratio,
    types::OfficerId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOfficer {
    pub officer_id: OfficerId,
    pub name: String,
    pub ayr: f64,
}

/// Change against the previous cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    /// Percentage change of the 15-day overdue total; 0 without a base.
    #[serde(rename = "overdue15d_wow")]
    pub overdue15d_wow: f64,
    pub dqi_change: i32,
    pub ayr_change: f64,
}

impl Trends {
    pub fn between(current: &PortfolioMetrics, previous: &PortfolioMetrics) -> Self {
        let overdue_delta = current.total_overdue_15d - previous.total_overdue_15d;
        Self {
            overdue15d_wow: guarded_ratio(overdue_delta, previous.total_overdue_15d) * 100.0,
            dqi_change: current.avg_dqi - previous.avg_dqi,
            ayr_change: current.avg_ayr - previous.avg_ayr,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    #[serde(rename = "totalOfficers")]
    pub total_officers: usize,
    #[serde(rename = "totalLoans")]
    pub total_loans: i64,
    #[serde(rename = "totalPortfolio")]
    pub total_portfolio: f64,
    #[serde(rename = "totalOverdue15d")]
    pub total_overdue_15d: f64,
    #[serde(rename = "avgDQI")]
    pub avg_dqi: i32,
    #[serde(rename = "avgRiskScore")]
    pub avg_risk_score: i32,
    #[serde(rename = "avgAYR")]
    pub avg_ayr: f64,
    #[serde(rename = "topOfficer")]
    pub top_officer: Option<TopOfficer>,
    #[serde(rename = "watchlistCount")]
    pub watchlist_count: usize,
    #[serde(rename = "watchlistPortfolio")]
    pub watchlist_portfolio: f64,
    #[serde(rename = "avgRepaymentDelayRate")]
    pub avg_repayment_delay_rate: f64,
    #[serde(rename = "atRiskOfficersCount")]
    pub at_risk_officers_count: usize,
    #[serde(rename = "atRiskOfficersPercentage")]
    pub at_risk_officers_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trends: Option<Trends>,
}

#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    watchlist_below: i32,
    at_risk: AtRiskThresholds,
}

impl Default for PortfolioAggregator {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

impl PortfolioAggregator {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            watchlist_below: config.watchlist_below,
            at_risk: config.at_risk.clone(),
        }
    }

    pub fn aggregate(&self, officers: &[OfficerRecord]) -> PortfolioMetrics {
        if officers.is_empty() {
            return PortfolioMetrics::default();
        }

        let mut total_overdue_15d = 0.0;
        let mut total_dqi: i64 = 0;
        let mut total_ayr = 0.0;
        let mut total_risk_score: i64 = 0;
        let mut total_loans: i64 = 0;
        let mut total_portfolio = 0.0;
        let mut watchlist_count = 0usize;
        let mut watchlist_portfolio = 0.0;
        let mut top_ayr = 0.0;
        let mut top_officer: Option<TopOfficer> = None;
        let mut total_delay_rate = 0.0;
        let mut officers_with_delay_rate = 0usize;
        let mut at_risk_officers_count = 0usize;

        for officer in officers {
            if let Some(calc) = &officer.calculated_metrics {
                total_overdue_15d += calc.overdue15d_volume;
                total_dqi += i64::from(calc.dqi);
                total_ayr += calc.ayr;
                total_risk_score += i64::from(calc.risk_score);

                // Strictly greater: the first officer to reach the maximum keeps it.
                if calc.ayr > top_ayr {
                    top_ayr = calc.ayr;
                    top_officer = Some(TopOfficer {
                        officer_id: officer.officer_id.clone(),
                        name: officer.name.clone(),
                        ayr: calc.ayr,
                    });
                }

                if calc.risk_score < self.watchlist_below {
                    watchlist_count += 1;
                    if let Some(raw) = &officer.raw_metrics {
                        watchlist_portfolio += raw.total_portfolio;
                    }
                }

                if calc.repayment_delay_rate != 0.0 {
                    total_delay_rate += calc.repayment_delay_rate;
                    officers_with_delay_rate += 1;
                }

                if calc.avg_days_since_last_repayment > self.at_risk.days_since_last_repayment_above
                    && calc.avg_loan_age > self.at_risk.loan_age_above
                {
                    at_risk_officers_count += 1;
                }
            }

            if let Some(raw) = &officer.raw_metrics {
                total_loans += raw.disbursed;
                total_portfolio += raw.total_portfolio;
            }
        }

        let n = officers.len();
        let avg_repayment_delay_rate = if officers_with_delay_rate > 0 {
            total_delay_rate / officers_with_delay_rate as f64
        } else {
            0.0
        };

        PortfolioMetrics {
            total_officers: n,
            total_loans,
            total_portfolio,
            total_overdue_15d,
            avg_dqi: (total_dqi / n as i64) as i32,
            avg_risk_score: (total_risk_score / n as i64) as i32,
            avg_ayr: total_ayr / n as f64,
            top_officer,
            watchlist_count,
            watchlist_portfolio,
            avg_repayment_delay_rate,
            at_risk_officers_count,
            at_risk_officers_percentage: (at_risk_officers_count as f64 / n as f64) * 100.0,
            trends: None,
        }
    }
}
