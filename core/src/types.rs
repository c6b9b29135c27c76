//! Shared primitive types used across the metrics core.

use chrono::NaiveDate;

/// Stable identifier of a loan officer, as issued by the upstream system.
pub type OfficerId = String;

/// A calculation cycle is identified by its as-of date.
pub type CycleDate = NaiveDate;

/// Canonical text form of a cycle date, used as the store key.
pub fn cycle_key(cycle: CycleDate) -> String {
    cycle.format("%Y-%m-%d").to_string()
}
