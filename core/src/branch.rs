//! Branch roll-up of scored officers.
//!
//! Groups are keyed by (branch, region) and returned in that order.
//! Portfolio sums come from raw metrics; score means are taken over the
//! officers of the branch that were scored.

use crate::{officer::OfficerRecord, scoring::guarded_ratio};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchMetrics {
    pub branch: String,
    pub region: String,
    pub portfolio_total: f64,
    pub overdue_15d: f64,
    pub par15_ratio: f64,
    pub ayr: f64,
    pub dqi: i32,
    pub fimr: f64,
    pub active_loans: i64,
    pub total_officers: usize,
    pub avg_repayment_delay_rate: f64,
}

#[derive(Default)]
struct BranchAccumulator {
    portfolio_total: f64,
    overdue_15d: f64,
    active_loans: i64,
    officers: usize,
    scored: usize,
    ayr_sum: f64,
    fimr_sum: f64,
    dqi_sum: i64,
    delay_sum: f64,
    delay_count: usize,
}

pub fn roll_up_branches(officers: &[OfficerRecord]) -> Vec<BranchMetrics> {
    let mut groups: BTreeMap<(String, String), BranchAccumulator> = BTreeMap::new();

    for officer in officers {
        let acc = groups
            .entry((officer.branch.clone(), officer.region.clone()))
            .or_default();
        acc.officers += 1;

        if let Some(raw) = &officer.raw_metrics {
            acc.portfolio_total += raw.total_portfolio;
            acc.overdue_15d += raw.overdue15d;
            acc.active_loans += raw.active_loans_count;
        }

        if let Some(calc) = &officer.calculated_metrics {
            acc.scored += 1;
            acc.ayr_sum += calc.ayr;
            acc.fimr_sum += calc.fimr;
            acc.dqi_sum += i64::from(calc.dqi);
            if calc.repayment_delay_rate != 0.0 {
                acc.delay_sum += calc.repayment_delay_rate;
                acc.delay_count += 1;
            }
        }
    }

    groups
        .into_iter()
        .map(|((branch, region), acc)| {
            let (ayr, fimr, dqi) = if acc.scored > 0 {
                (
                    acc.ayr_sum / acc.scored as f64,
                    acc.fimr_sum / acc.scored as f64,
                    (acc.dqi_sum / acc.scored as i64) as i32,
                )
            } else {
                (0.0, 0.0, 0)
            };

            BranchMetrics {
                branch,
                region,
                portfolio_total: acc.portfolio_total,
                overdue_15d: acc.overdue_15d,
                par15_ratio: guarded_ratio(acc.overdue_15d, acc.portfolio_total),
                ayr,
                dqi,
                fimr,
                active_loans: acc.active_loans,
                total_officers: acc.officers,
                avg_repayment_delay_rate: if acc.delay_count > 0 {
                    acc.delay_sum / acc.delay_count as f64
                } else {
                    0.0
                },
            }
        })
        .collect()
}
