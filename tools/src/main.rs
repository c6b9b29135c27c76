//! portfolio-report: loads a cycle from the snapshot store, scores every
//! officer and prints the portfolio roll-up.
//!
//! Usage:
//!   portfolio-report --db metrics.db --import cycle.json
//!   portfolio-report --db metrics.db --cycle 2024-06-30 --region Lagos --json
//!   portfolio-report --db metrics.db --ipc-mode

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use loanbook_core::{
    engine::{CycleReport, MetricsEngine},
    officer::OfficerRecord,
    store::{OfficerFilter, SnapshotStore},
    team::TeamMember,
    types::CycleDate,
};
use std::env;
use std::io::{self, BufRead, Write};

/// Import file written by the upstream sync job.
#[derive(serde::Deserialize)]
struct SnapshotFile {
    cycle: CycleDate,
    officers: Vec<OfficerRecord>,
    #[serde(default)]
    team_members: Vec<TeamMemberRow>,
}

#[derive(serde::Deserialize)]
struct TeamMemberRow {
    member_id: i64,
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetPortfolio {
        #[serde(default)]
        cycle: Option<CycleDate>,
        #[serde(default)]
        filter: OfficerFilter,
    },
    GetOfficer {
        officer_id: String,
        #[serde(default)]
        cycle: Option<CycleDate>,
    },
    GetBranches {
        #[serde(default)]
        cycle: Option<CycleDate>,
        #[serde(default)]
        filter: OfficerFilter,
    },
    GetTeamMembers,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let cycle = arg_value(&args, "--cycle").map(parse_cycle).transpose()?;
    let filter = OfficerFilter {
        region: arg_value(&args, "--region").map(str::to_string),
        branch: arg_value(&args, "--branch").map(str::to_string),
        channel: arg_value(&args, "--channel").map(str::to_string),
        user_type: arg_value(&args, "--user-type").map(str::to_string),
    };

    let store = SnapshotStore::open(db)?;
    store.migrate()?;
    let engine = MetricsEngine::build(data_dir)?;

    if let Some(path) = arg_value(&args, "--import") {
        import_snapshot(&store, path)?;
    }

    if ipc_mode {
        return run_ipc_loop(&engine, &store);
    }

    let cycle = match cycle {
        Some(c) => c,
        None => store
            .latest_cycle()?
            .ok_or_else(|| anyhow!("No cycles in {db}; pass --import first"))?,
    };
    let report = build_report(&engine, &store, cycle, &filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, db);
    }
    Ok(())
}

fn import_snapshot(store: &SnapshotStore, path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {path}: {e}"))?;
    let file: SnapshotFile = serde_json::from_str(&content)?;

    let snapshots = store.import_cycle(file.cycle, &file.officers)?;
    for m in &file.team_members {
        store.upsert_team_member(m.member_id, &m.name, &m.role, m.active)?;
    }
    log::info!(
        "imported {path}: cycle={} officers={} snapshots={snapshots} team_members={}",
        file.cycle,
        file.officers.len(),
        file.team_members.len()
    );
    Ok(())
}

/// Score `cycle` and, when an earlier cycle exists, attach trends against it.
fn build_report(
    engine: &MetricsEngine,
    store: &SnapshotStore,
    cycle: CycleDate,
    filter: &OfficerFilter,
) -> Result<CycleReport> {
    let previous = match store.previous_cycle(cycle)? {
        Some(prev_cycle) => {
            let prev_officers = store.officers_for_cycle(prev_cycle, filter)?;
            Some(engine.run_cycle(prev_cycle, prev_officers, None)?.portfolio)
        }
        None => None,
    };

    let officers = store.officers_for_cycle(cycle, filter)?;
    Ok(engine.run_cycle(cycle, officers, previous.as_ref())?)
}

fn resolve_cycle(store: &SnapshotStore, cycle: Option<CycleDate>) -> Result<CycleDate> {
    match cycle {
        Some(c) => Ok(c),
        None => store
            .latest_cycle()?
            .ok_or_else(|| anyhow!("No cycles loaded")),
    }
}

fn run_ipc_loop(engine: &MetricsEngine, store: &SnapshotStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = match handle_command(engine, store, cmd) {
            Ok(value) => value,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    engine: &MetricsEngine,
    store: &SnapshotStore,
    cmd: IpcCommand,
) -> Result<serde_json::Value> {
    match cmd {
        IpcCommand::GetPortfolio { cycle, filter } => {
            let cycle = resolve_cycle(store, cycle)?;
            let report = build_report(engine, store, cycle, &filter)?;
            Ok(serde_json::to_value(&report.portfolio)?)
        }
        IpcCommand::GetOfficer { officer_id, cycle } => {
            let cycle = resolve_cycle(store, cycle)?;
            let mut officer = store.officer_for_cycle(cycle, &officer_id)?;
            engine.score_officer(&mut officer)?;
            Ok(serde_json::to_value(&officer)?)
        }
        IpcCommand::GetBranches { cycle, filter } => {
            let cycle = resolve_cycle(store, cycle)?;
            let report = build_report(engine, store, cycle, &filter)?;
            Ok(serde_json::to_value(&report.branches)?)
        }
        IpcCommand::GetTeamMembers => {
            let roster = TeamMember::roster(store.active_team_members()?);
            Ok(serde_json::to_value(&roster)?)
        }
        IpcCommand::Quit => Ok(serde_json::Value::Null),
    }
}

fn print_summary(report: &CycleReport, db: &str) {
    let p = &report.portfolio;

    println!("=== PORTFOLIO SUMMARY ===");
    println!("  db:               {db}");
    println!("  cycle:            {}", report.cycle);
    println!("  officers:         {}", p.total_officers);
    println!("  loans disbursed:  {}", p.total_loans);
    println!("  portfolio:        {:.2}", p.total_portfolio);
    println!("  overdue 15d:      {:.2}", p.total_overdue_15d);
    println!("  avg DQI:          {}", p.avg_dqi);
    println!("  avg risk score:   {}", p.avg_risk_score);
    println!("  avg AYR:          {:.4}", p.avg_ayr);
    println!("  watchlist:        {} ({:.2} at stake)", p.watchlist_count, p.watchlist_portfolio);
    println!(
        "  at-risk officers: {} ({:.1}%)",
        p.at_risk_officers_count, p.at_risk_officers_percentage
    );
    match &p.top_officer {
        Some(top) => println!("  top officer:      {} {} (AYR {:.4})", top.officer_id, top.name, top.ayr),
        None => println!("  top officer:      (none)"),
    }
    if let Some(t) = &p.trends {
        println!(
            "  trends:           overdue {:+.1}% | DQI {:+} | AYR {:+.4}",
            t.overdue15d_wow, t.dqi_change, t.ayr_change
        );
    }

    println!();
    println!("=== BRANCHES ===");
    if report.branches.is_empty() {
        println!("  (No branches)");
    }
    for b in &report.branches {
        println!(
            "  {} / {} | officers {} | portfolio {:.0} | PAR15 {:.2}% | DQI {}",
            b.region,
            b.branch,
            b.total_officers,
            b.portfolio_total,
            b.par15_ratio * 100.0,
            b.dqi
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_cycle(s: &str) -> Result<CycleDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| anyhow!("Bad --cycle '{s}': {e}"))
}
