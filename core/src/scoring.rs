//! Score calculator: one officer's raw snapshot to composite indicators.
//!
//! Pure and total over non-negative input: every ratio with a possibly-zero
//! denominator is defined as 0 when the denominator is not positive, so no
//! input produces NaN or infinity. "No data" and "a verified zero rate" are
//! indistinguishable in the output.
//!
//! Guaranteed bounds: `risk_score_norm`, `on_time_rate` in [0, 1];
//! `risk_score`, `dqi` in 0..=100. The plain ratios (`ayr`, `frr`, `roll`,
//! `porr`, ...) are not clamped and `repayment_delay_rate` may be negative.

use crate::{config::MetricsConfig, error::MetricsResult, snapshot::RawMetrics};
use serde::{Deserialize, Serialize};

/// Channel mix is not tracked upstream yet; every officer scores as pure.
pub const CHANNEL_PURITY_PLACEHOLDER: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedMetrics {
    pub fimr: f64,
    pub slippage: f64,
    pub roll: f64,
    pub frr: f64,
    pub ayr: f64,
    pub porr: f64,
    pub channel_purity: f64,
    pub on_time_rate: f64,
    pub risk_score_norm: f64,
    pub risk_score: i32,
    pub dqi: i32,
    #[serde(rename = "yield")]
    pub yield_amount: f64,
    pub overdue15d_volume: f64,
    pub avg_timeliness_score: f64,
    pub avg_repayment_health: f64,
    pub avg_days_since_last_repayment: f64,
    pub avg_loan_age: f64,
    pub repayment_delay_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    config: MetricsConfig,
}

impl ScoreCalculator {
    /// Fails with `InvalidConfig` when `config.validate()` does; a zero
    /// delay target would otherwise yield non-finite delay rates.
    pub fn new(config: MetricsConfig) -> MetricsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn calculate(&self, raw: &RawMetrics) -> CalculatedMetrics {
        let fimr = guarded_ratio(raw.first_miss as f64, raw.disbursed as f64);
        let slippage = guarded_ratio(raw.dpd1to6_bal, raw.amount_due7d);
        let roll = guarded_ratio(raw.moved_to7to30, raw.prev_dpd1to6_bal);
        let frr = guarded_ratio(raw.fees_collected, raw.fees_due);
        let yield_amount = raw.interest_collected + raw.fees_collected;
        let ayr = guarded_ratio(yield_amount, raw.par15_mid_month);
        let porr = guarded_ratio(raw.overdue15d, raw.total_portfolio);
        let on_time_rate = (1.0 - slippage).max(0.0);

        let risk_score_norm = self.risk_score_norm(raw, porr, fimr, roll);
        let risk_score = (risk_score_norm * 100.0) as i32;
        let dqi = self.dqi(risk_score_norm, on_time_rate, CHANNEL_PURITY_PLACEHOLDER, fimr);

        CalculatedMetrics {
            fimr,
            slippage,
            roll,
            frr,
            ayr,
            porr,
            channel_purity: CHANNEL_PURITY_PLACEHOLDER,
            on_time_rate,
            risk_score_norm,
            risk_score,
            dqi,
            yield_amount,
            overdue15d_volume: raw.overdue15d,
            avg_timeliness_score: raw.avg_timeliness_score,
            avg_repayment_health: raw.avg_repayment_health,
            avg_days_since_last_repayment: raw.avg_days_since_last_repayment,
            avg_loan_age: raw.avg_loan_age,
            repayment_delay_rate: self.repayment_delay_rate(raw),
        }
    }

    /// 1.0 minus weighted penalties, clamped to [0, 1].
    ///
    /// The waiver, backdating and reversal penalties only apply when their
    /// denominators are positive, so an officer with no recorded entries is
    /// never penalised on those axes and scores higher than an otherwise
    /// identical officer with activity.
    pub fn risk_score_norm(&self, raw: &RawMetrics, porr: f64, fimr: f64, roll: f64) -> f64 {
        let w = &self.config.risk_weights;
        let mut score = 1.0;

        score -= porr * w.porr;
        score -= fimr * w.fimr;
        score -= roll * w.roll;

        if raw.total_portfolio > 0.0 {
            score -= (raw.waivers / raw.total_portfolio) * w.waivers;
        }
        if raw.entries > 0 {
            score -= (raw.backdated as f64 / raw.entries as f64) * w.backdated;
            score -= (raw.reversals as f64 / raw.entries as f64) * w.reversals;
        }
        if raw.had_float_gap {
            score -= w.float_gap;
        }

        score.clamp(0.0, 1.0)
    }

    /// Quality index on 0..=100. `fimr` is unbounded, so the blend can go
    /// negative before the clamp.
    pub fn dqi(&self, risk_score_norm: f64, on_time_rate: f64, channel_purity: f64, fimr: f64) -> i32 {
        let w = &self.config.dqi_weights;
        let dqi = risk_score_norm * w.risk
            + on_time_rate * w.on_time
            + channel_purity * w.channel_purity
            + (1.0 - fimr) * w.fimr;

        (dqi * 100.0).round().clamp(0.0, 100.0) as i32
    }

    /// Signed, unclamped: 100 when repayments are current, negative once the
    /// gap since the last repayment exceeds the target share of loan age.
    pub fn repayment_delay_rate(&self, raw: &RawMetrics) -> f64 {
        if raw.avg_loan_age > 0.0 {
            let ratio = raw.avg_days_since_last_repayment / raw.avg_loan_age;
            (1.0 - (ratio / self.config.repayment_delay_target_ratio)) * 100.0
        } else {
            0.0
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
