//! Raw per-officer snapshot: one record per officer per calculation cycle.
//!
//! Produced by the snapshot store (or any other upstream producer) and
//! never mutated by the engine. Every field is required: "no underlying
//! activity" is an explicit zero, never an absent value, because the
//! scoring model treats zero and unknown identically.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetrics {
    // ── Counters ──────────────────────────────────
    pub first_miss: i64,
    pub disbursed: i64,
    pub backdated: i64,
    pub entries: i64,
    pub reversals: i64,
    pub active_loans_count: i64,

    // ── Balances and collections ──────────────────
    pub dpd1to6_bal: f64,
    pub amount_due7d: f64,
    pub moved_to7to30: f64,
    pub prev_dpd1to6_bal: f64,
    pub fees_collected: f64,
    pub fees_due: f64,
    pub interest_collected: f64,
    pub overdue15d: f64,
    pub total_portfolio: f64,
    pub par15_mid_month: f64,
    pub waivers: f64,

    pub had_float_gap: bool,

    // ── Repayment behaviour averages ──────────────
    pub avg_timeliness_score: f64,
    pub avg_repayment_health: f64,
    pub avg_days_since_last_repayment: f64,
    pub avg_loan_age: f64,
}
