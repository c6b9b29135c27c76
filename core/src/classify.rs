//! Categorical labels for scores and days-past-due.
//!
//! All three classifiers are pure lookups. Lower bounds are inclusive.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Risk band ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Green,
    Watch,
    Amber,
    Red,
}

impl RiskBand {
    pub const GREEN_FLOOR: i32 = 80;
    pub const WATCH_FLOOR: i32 = 60;
    pub const AMBER_FLOOR: i32 = 40;

    pub fn from_score(score: i32) -> Self {
        if score >= Self::GREEN_FLOOR {
            RiskBand::Green
        } else if score >= Self::WATCH_FLOOR {
            RiskBand::Watch
        } else if score >= Self::AMBER_FLOOR {
            RiskBand::Amber
        } else {
            RiskBand::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Green => "Green",
            RiskBand::Watch => "Watch",
            RiskBand::Amber => "Amber",
            RiskBand::Red   => "Red",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DPD status ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DpdStatus {
    #[serde(rename = "Current")]
    Current,
    #[serde(rename = "D1-3")]
    D1To3,
    #[serde(rename = "D4-6")]
    D4To6,
    #[serde(rename = "Rolled to D7-15")]
    RolledD7To15,
    #[serde(rename = "Rolled to D16-30")]
    RolledD16To30,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl DpdStatus {
    pub fn from_dpd(dpd: u32) -> Self {
        match dpd {
            0       => DpdStatus::Current,
            1..=3   => DpdStatus::D1To3,
            4..=6   => DpdStatus::D4To6,
            7..=15  => DpdStatus::RolledD7To15,
            16..=30 => DpdStatus::RolledD16To30,
            _       => DpdStatus::Overdue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DpdStatus::Current       => "Current",
            DpdStatus::D1To3         => "D1-3",
            DpdStatus::D4To6         => "D4-6",
            DpdStatus::RolledD7To15  => "Rolled to D7-15",
            DpdStatus::RolledD16To30 => "Rolled to D16-30",
            DpdStatus::Overdue       => "Overdue",
        }
    }
}

impl fmt::Display for DpdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Roll direction ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollDirection {
    Worsening,
    Improving,
    Stable,
}

impl RollDirection {
    /// Compare a loan's DPD today against the previous observation.
    pub fn between(current_dpd: u32, previous_dpd: u32) -> Self {
        use std::cmp::Ordering;
        match current_dpd.cmp(&previous_dpd) {
            Ordering::Greater => RollDirection::Worsening,
            Ordering::Less    => RollDirection::Improving,
            Ordering::Equal   => RollDirection::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RollDirection::Worsening => "Worsening",
            RollDirection::Improving => "Improving",
            RollDirection::Stable    => "Stable",
        }
    }
}

impl fmt::Display for RollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
