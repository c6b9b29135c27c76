use crate::error::{MetricsError, MetricsResult};
use serde::{Deserialize, Serialize};

/// Penalty weights subtracted from a perfect score of 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub porr: f64,
    pub fimr: f64,
    pub roll: f64,
    pub waivers: f64,
    pub backdated: f64,
    pub reversals: f64,
    pub float_gap: f64,
}

/// Blend weights of the quality index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqiWeights {
    pub risk: f64,
    pub on_time: f64,
    pub channel_purity: f64,
    pub fimr: f64,
}

/// An officer is "at risk" when both averages exceed their limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskThresholds {
    pub days_since_last_repayment_above: f64,
    pub loan_age_above: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub risk_weights: RiskWeights,
    pub dqi_weights: DqiWeights,
    /// Expected share of loan age between repayments.
    pub repayment_delay_target_ratio: f64,
    /// Officers with a risk score strictly below this land on the watchlist.
    pub watchlist_below: i32,
    pub at_risk: AtRiskThresholds,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_weights: RiskWeights {
                porr: 0.25,
                fimr: 0.20,
                roll: 0.15,
                waivers: 0.10,
                backdated: 0.10,
                reversals: 0.10,
                float_gap: 0.10,
            },
            dqi_weights: DqiWeights {
                risk: 0.40,
                on_time: 0.30,
                channel_purity: 0.20,
                fimr: 0.10,
            },
            repayment_delay_target_ratio: 0.25,
            watchlist_below: 60,
            at_risk: AtRiskThresholds {
                days_since_last_repayment_above: 10.0,
                loan_age_above: 14.0,
            },
        }
    }
}

impl MetricsConfig {
    /// Load from the data/ directory.
    /// In tests, use MetricsConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/scoring/scoring_model.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MetricsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject weights the scoring model cannot use.
    pub fn validate(&self) -> MetricsResult<()> {
        let r = &self.risk_weights;
        let d = &self.dqi_weights;
        let weights = [
            ("risk_weights.porr", r.porr),
            ("risk_weights.fimr", r.fimr),
            ("risk_weights.roll", r.roll),
            ("risk_weights.waivers", r.waivers),
            ("risk_weights.backdated", r.backdated),
            ("risk_weights.reversals", r.reversals),
            ("risk_weights.float_gap", r.float_gap),
            ("dqi_weights.risk", d.risk),
            ("dqi_weights.on_time", d.on_time),
            ("dqi_weights.channel_purity", d.channel_purity),
            ("dqi_weights.fimr", d.fimr),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(MetricsError::InvalidConfig {
                    reason: format!("{name} must be a finite non-negative number, got {value}"),
                });
            }
        }

        if !(self.repayment_delay_target_ratio.is_finite() && self.repayment_delay_target_ratio > 0.0)
        {
            return Err(MetricsError::InvalidConfig {
                reason: format!(
                    "repayment_delay_target_ratio must be positive, got {}",
                    self.repayment_delay_target_ratio
                ),
            });
        }

        if !(0..=100).contains(&self.watchlist_below) {
            return Err(MetricsError::InvalidConfig {
                reason: format!(
                    "watchlist_below must be within 0..=100, got {}",
                    self.watchlist_below
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_risk_weights_sum_to_one() {
        let r = MetricsConfig::default().risk_weights;
        let sum = r.porr + r.fimr + r.roll + r.waivers + r.backdated + r.reversals + r.float_gap;
        assert!((sum - 1.0).abs() < 1e-12, "risk weights sum to {sum}");
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = MetricsConfig::default();
        config.dqi_weights.on_time = -0.1;
        assert!(matches!(
            config.validate(),
            Err(MetricsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_delay_ratio_rejected() {
        let mut config = MetricsConfig::default();
        config.repayment_delay_target_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn shipped_model_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let loaded = MetricsConfig::load(path).expect("load data/scoring/scoring_model.json");
        assert_eq!(loaded, MetricsConfig::default());
    }
}
