//! An officer as the dashboard sees it: identity plus this cycle's metrics.

use crate::{
    classify::RiskBand, scoring::CalculatedMetrics, snapshot::RawMetrics, types::OfficerId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerRecord {
    pub officer_id: OfficerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(rename = "rawMetrics")]
    pub raw_metrics: Option<RawMetrics>,
    #[serde(rename = "calculatedMetrics")]
    pub calculated_metrics: Option<CalculatedMetrics>,
    #[serde(rename = "riskBand")]
    pub risk_band: Option<RiskBand>,
}

impl OfficerRecord {
    pub fn new(officer_id: impl Into<OfficerId>, name: impl Into<String>) -> Self {
        Self {
            officer_id: officer_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, region: &str, branch: &str) -> Self {
        self.region = region.to_string();
        self.branch = branch.to_string();
        self
    }

    pub fn with_raw(mut self, raw: RawMetrics) -> Self {
        self.raw_metrics = Some(raw);
        self
    }

    pub fn with_calculated(mut self, calculated: CalculatedMetrics) -> Self {
        self.calculated_metrics = Some(calculated);
        self
    }

    pub fn is_scored(&self) -> bool {
        self.calculated_metrics.is_some()
    }
}
