//! SQLite snapshot store.
//!
//! RULE: Only store.rs talks to the database.
//! The metrics engine never calls into the store; callers load a cycle here,
//! hand the materialized records to the engine, and keep the result.

use crate::{
    error::{MetricsError, MetricsResult},
    officer::OfficerRecord,
    snapshot::RawMetrics,
    team::{MemberId, TeamMember},
    types::{cycle_key, CycleDate},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

/// Optional dashboard filters. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficerFilter {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

const OFFICER_SELECT: &str = "
    SELECT o.officer_id, o.name, o.email, o.region, o.branch, o.channel, o.user_type,
           m.officer_id IS NOT NULL,
           m.first_miss, m.disbursed, m.backdated, m.entries, m.reversals,
           m.active_loans_count,
           m.dpd1to6_bal, m.amount_due_7d, m.moved_to_7to30, m.prev_dpd1to6_bal,
           m.fees_collected, m.fees_due, m.interest_collected, m.overdue_15d,
           m.total_portfolio, m.par15_mid_month, m.waivers,
           m.had_float_gap,
           m.avg_timeliness_score, m.avg_repayment_health,
           m.avg_days_since_last_repayment, m.avg_loan_age
    FROM officers o
    LEFT JOIN officer_raw_metrics m
           ON m.officer_id = o.officer_id AND m.cycle_date = ?1";

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (or create) the snapshot database at `path`.
    pub fn open(path: &str) -> MetricsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MetricsResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> MetricsResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_officers.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/002_officer_raw_metrics.sql"))?;
        self.conn
            .execute_batch(include_str!("../../migrations/003_team_members.sql"))?;
        Ok(())
    }

    // ── Officers ───────────────────────────────────────────────

    pub fn upsert_officer(&self, officer: &OfficerRecord) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO officers (officer_id, name, email, region, branch, channel, user_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (officer_id) DO UPDATE SET
                name      = excluded.name,
                email     = excluded.email,
                region    = excluded.region,
                branch    = excluded.branch,
                channel   = excluded.channel,
                user_type = excluded.user_type",
            params![
                officer.officer_id,
                officer.name,
                officer.email,
                officer.region,
                officer.branch,
                officer.channel,
                officer.user_type,
            ],
        )?;
        Ok(())
    }

    pub fn officer_count(&self) -> MetricsResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM officers", [], |row| row.get(0))?)
    }

    // ── Raw metrics ────────────────────────────────────────────

    /// Insert or replace one officer's snapshot for a cycle.
    pub fn upsert_raw_metrics(
        &self,
        cycle: CycleDate,
        officer_id: &str,
        raw: &RawMetrics,
    ) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO officer_raw_metrics (
                cycle_date, officer_id,
                first_miss, disbursed, backdated, entries, reversals, active_loans_count,
                dpd1to6_bal, amount_due_7d, moved_to_7to30, prev_dpd1to6_bal,
                fees_collected, fees_due, interest_collected, overdue_15d,
                total_portfolio, par15_mid_month, waivers, had_float_gap,
                avg_timeliness_score, avg_repayment_health,
                avg_days_since_last_repayment, avg_loan_age
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
             ON CONFLICT (cycle_date, officer_id) DO UPDATE SET
                first_miss                    = excluded.first_miss,
                disbursed                     = excluded.disbursed,
                backdated                     = excluded.backdated,
                entries                       = excluded.entries,
                reversals                     = excluded.reversals,
                active_loans_count            = excluded.active_loans_count,
                dpd1to6_bal                   = excluded.dpd1to6_bal,
                amount_due_7d                 = excluded.amount_due_7d,
                moved_to_7to30                = excluded.moved_to_7to30,
                prev_dpd1to6_bal              = excluded.prev_dpd1to6_bal,
                fees_collected                = excluded.fees_collected,
                fees_due                      = excluded.fees_due,
                interest_collected            = excluded.interest_collected,
                overdue_15d                   = excluded.overdue_15d,
                total_portfolio               = excluded.total_portfolio,
                par15_mid_month               = excluded.par15_mid_month,
                waivers                       = excluded.waivers,
                had_float_gap                 = excluded.had_float_gap,
                avg_timeliness_score          = excluded.avg_timeliness_score,
                avg_repayment_health          = excluded.avg_repayment_health,
                avg_days_since_last_repayment = excluded.avg_days_since_last_repayment,
                avg_loan_age                  = excluded.avg_loan_age",
            params![
                cycle_key(cycle),
                officer_id,
                raw.first_miss,
                raw.disbursed,
                raw.backdated,
                raw.entries,
                raw.reversals,
                raw.active_loans_count,
                raw.dpd1to6_bal,
                raw.amount_due7d,
                raw.moved_to7to30,
                raw.prev_dpd1to6_bal,
                raw.fees_collected,
                raw.fees_due,
                raw.interest_collected,
                raw.overdue15d,
                raw.total_portfolio,
                raw.par15_mid_month,
                raw.waivers,
                raw.had_float_gap,
                raw.avg_timeliness_score,
                raw.avg_repayment_health,
                raw.avg_days_since_last_repayment,
                raw.avg_loan_age,
            ],
        )?;
        Ok(())
    }

    /// Upsert a batch of officers and, where present, their snapshots.
    /// Re-importing the same batch leaves the database unchanged.
    pub fn import_cycle(&self, cycle: CycleDate, officers: &[OfficerRecord]) -> MetricsResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut snapshots = 0usize;
        for officer in officers {
            self.upsert_officer(officer)?;
            if let Some(raw) = &officer.raw_metrics {
                self.upsert_raw_metrics(cycle, &officer.officer_id, raw)?;
                snapshots += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "cycle={cycle} imported officers={} snapshots={snapshots}",
            officers.len()
        );
        Ok(snapshots)
    }

    /// All officers matching `filter`, ordered by officer id, each with the
    /// cycle's raw metrics when a snapshot row exists.
    pub fn officers_for_cycle(
        &self,
        cycle: CycleDate,
        filter: &OfficerFilter,
    ) -> MetricsResult<Vec<OfficerRecord>> {
        let sql = format!(
            "{OFFICER_SELECT}
             WHERE (?2 IS NULL OR o.region = ?2)
               AND (?3 IS NULL OR o.branch = ?3)
               AND (?4 IS NULL OR o.channel = ?4)
               AND (?5 IS NULL OR o.user_type = ?5)
             ORDER BY o.officer_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let officers = stmt
            .query_map(
                params![
                    cycle_key(cycle),
                    filter.region,
                    filter.branch,
                    filter.channel,
                    filter.user_type,
                ],
                officer_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(officers)
    }

    pub fn officer_for_cycle(
        &self,
        cycle: CycleDate,
        officer_id: &str,
    ) -> MetricsResult<OfficerRecord> {
        let sql = format!("{OFFICER_SELECT} WHERE o.officer_id = ?2");
        self.conn
            .query_row(&sql, params![cycle_key(cycle), officer_id], officer_from_row)
            .optional()?
            .ok_or_else(|| MetricsError::OfficerNotFound {
                officer_id: officer_id.to_string(),
            })
    }

    // ── Cycles ─────────────────────────────────────────────────

    pub fn latest_cycle(&self) -> MetricsResult<Option<CycleDate>> {
        let key: Option<String> = self.conn.query_row(
            "SELECT MAX(cycle_date) FROM officer_raw_metrics",
            [],
            |row| row.get(0),
        )?;
        key.map(|k| parse_cycle(&k)).transpose()
    }

    /// The most recent cycle strictly before `cycle`.
    pub fn previous_cycle(&self, cycle: CycleDate) -> MetricsResult<Option<CycleDate>> {
        let key: Option<String> = self.conn.query_row(
            "SELECT MAX(cycle_date) FROM officer_raw_metrics WHERE cycle_date < ?1",
            params![cycle_key(cycle)],
            |row| row.get(0),
        )?;
        key.map(|k| parse_cycle(&k)).transpose()
    }

    // ── Team ───────────────────────────────────────────────────

    pub fn upsert_team_member(
        &self,
        member_id: i64,
        name: &str,
        role: &str,
        active: bool,
    ) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO team_members (member_id, member_name, role, is_active)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (member_id) DO UPDATE SET
                member_name = excluded.member_name,
                role        = excluded.role,
                is_active   = excluded.is_active",
            params![member_id, name, role, active],
        )?;
        Ok(())
    }

    pub fn active_team_members(&self) -> MetricsResult<Vec<TeamMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT member_id, member_name, role FROM team_members
             WHERE is_active = 1
             ORDER BY role, member_name",
        )?;
        let members = stmt
            .query_map([], |row| {
                Ok(TeamMember {
                    id: MemberId::from(row.get::<_, i64>(0)?),
                    name: row.get(1)?,
                    role: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }
}

fn officer_from_row(row: &Row<'_>) -> rusqlite::Result<OfficerRecord> {
    let has_raw: bool = row.get(7)?;
    let raw_metrics = if has_raw {
        Some(RawMetrics {
            first_miss: row.get(8)?,
            disbursed: row.get(9)?,
            backdated: row.get(10)?,
            entries: row.get(11)?,
            reversals: row.get(12)?,
            active_loans_count: row.get(13)?,
            dpd1to6_bal: row.get(14)?,
            amount_due7d: row.get(15)?,
            moved_to7to30: row.get(16)?,
            prev_dpd1to6_bal: row.get(17)?,
            fees_collected: row.get(18)?,
            fees_due: row.get(19)?,
            interest_collected: row.get(20)?,
            overdue15d: row.get(21)?,
            total_portfolio: row.get(22)?,
            par15_mid_month: row.get(23)?,
            waivers: row.get(24)?,
            had_float_gap: row.get(25)?,
            avg_timeliness_score: row.get(26)?,
            avg_repayment_health: row.get(27)?,
            avg_days_since_last_repayment: row.get(28)?,
            avg_loan_age: row.get(29)?,
        })
    } else {
        None
    };

    Ok(OfficerRecord {
        officer_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        region: row.get(3)?,
        branch: row.get(4)?,
        channel: row.get(5)?,
        user_type: row.get(6)?,
        raw_metrics,
        calculated_metrics: None,
        risk_band: None,
    })
}

fn parse_cycle(key: &str) -> MetricsResult<CycleDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|e| MetricsError::Other(anyhow::anyhow!("Bad cycle date '{key}': {e}")))
}
