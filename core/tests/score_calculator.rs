//! Score calculator tests: guarded ratios, risk score, DQI, delay rate.

use loanbook_core::{
    config::MetricsConfig,
    error::MetricsError,
    scoring::{CalculatedMetrics, ScoreCalculator},
    snapshot::RawMetrics,
};

fn calc(raw: &RawMetrics) -> CalculatedMetrics {
    ScoreCalculator::default().calculate(raw)
}

/// Every guarded ratio is exactly 0 when its denominator is zero.
#[test]
fn zero_denominators_yield_zero_ratios() {
    let raw = RawMetrics {
        first_miss: 7,
        dpd1to6_bal: 500.0,
        moved_to7to30: 250.0,
        fees_collected: 90.0,
        interest_collected: 110.0,
        overdue15d: 1_000.0,
        ..Default::default()
    };
    let c = calc(&raw);

    assert_eq!(c.fimr, 0.0, "FIMR with disbursed=0");
    assert_eq!(c.slippage, 0.0, "slippage with amount_due7d=0");
    assert_eq!(c.roll, 0.0, "roll with prev_dpd1to6_bal=0");
    assert_eq!(c.frr, 0.0, "FRR with fees_due=0");
    assert_eq!(c.ayr, 0.0, "AYR with par15_mid_month=0");
    assert_eq!(c.porr, 0.0, "PORR with total_portfolio=0");
    assert_eq!(c.repayment_delay_rate, 0.0, "delay rate with avg_loan_age=0");
    assert_eq!(c.yield_amount, 200.0, "yield is always interest + fees");
    assert_eq!(c.overdue15d_volume, 1_000.0);
}

/// All-zero input is the best possible officer.
#[test]
fn all_zero_snapshot_scores_perfectly() {
    let c = calc(&RawMetrics::default());
    assert_eq!(c.risk_score_norm, 1.0);
    assert_eq!(c.risk_score, 100);
    assert_eq!(c.on_time_rate, 1.0);
    assert_eq!(c.channel_purity, 1.0);
    assert_eq!(c.dqi, 100);
}

#[test]
fn fimr_is_first_miss_over_disbursed() {
    let raw = RawMetrics {
        first_miss: 10,
        disbursed: 100,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.fimr, 0.10);
    assert_eq!(c.risk_score, 98);
    assert_eq!(c.dqi, 98);
}

/// PORR 0.15 with every other penalty at its zero-denominator default.
#[test]
fn porr_only_penalty() {
    let raw = RawMetrics {
        overdue15d: 150_000.0,
        total_portfolio: 1_000_000.0,
        ..Default::default()
    };
    let c = calc(&raw);

    assert_eq!(c.porr, 0.15);
    assert!(
        (c.risk_score_norm - 0.9625).abs() < 1e-12,
        "risk_score_norm = {}",
        c.risk_score_norm
    );
    assert_eq!(c.risk_score, 96, "risk score truncates 96.25");
    // 0.9625*0.40 + 0.30 + 0.20 + 0.10 = 0.985 -> 98.5 rounds half away from zero.
    assert_eq!(c.dqi, 99);
}

#[test]
fn ayr_and_frr_ratios() {
    let raw = RawMetrics {
        interest_collected: 30_000.0,
        fees_collected: 10_000.0,
        fees_due: 20_000.0,
        par15_mid_month: 20_000.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.yield_amount, 40_000.0);
    assert_eq!(c.ayr, 2.0, "AYR is not clamped");
    assert_eq!(c.frr, 0.5);
}

/// Slippage above 1 floors the on-time rate at 0 instead of going negative.
#[test]
fn on_time_rate_floors_at_zero() {
    let raw = RawMetrics {
        dpd1to6_bal: 3_000.0,
        amount_due7d: 1_000.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.slippage, 3.0);
    assert_eq!(c.on_time_rate, 0.0);
    assert_eq!(c.risk_score, 100, "slippage is not a risk penalty");
    assert_eq!(c.dqi, 70);
}

#[test]
fn partial_slippage_lowers_dqi() {
    let raw = RawMetrics {
        dpd1to6_bal: 300.0,
        amount_due7d: 1_000.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert!((c.on_time_rate - 0.7).abs() < 1e-12);
    assert_eq!(c.dqi, 91);
}

#[test]
fn roll_penalty_weighted() {
    let raw = RawMetrics {
        moved_to7to30: 200.0,
        prev_dpd1to6_bal: 1_000.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.roll, 0.2);
    assert!((c.risk_score_norm - 0.97).abs() < 1e-12);
    assert_eq!(c.risk_score, 97);
}

#[test]
fn float_gap_costs_ten_points() {
    let raw = RawMetrics {
        had_float_gap: true,
        ..Default::default()
    };
    let c = calc(&raw);
    assert!((c.risk_score_norm - 0.9).abs() < 1e-12);
    assert_eq!(c.risk_score, 90);
    assert_eq!(c.dqi, 96);
}

#[test]
fn waiver_penalty_scaled_by_portfolio() {
    let raw = RawMetrics {
        waivers: 50_000.0,
        total_portfolio: 1_000_000.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert!((c.risk_score_norm - 0.995).abs() < 1e-12);
    assert_eq!(c.risk_score, 99);
}

/// Officers with no entries or no portfolio escape those penalties entirely,
/// so they outscore an officer who reports the same activity honestly.
#[test]
fn zero_entries_and_zero_portfolio_are_not_penalised() {
    let silent = RawMetrics {
        backdated: 3,
        reversals: 3,
        entries: 0,
        waivers: 5_000.0,
        total_portfolio: 0.0,
        ..Default::default()
    };
    let reporting = RawMetrics {
        backdated: 2,
        reversals: 1,
        entries: 10,
        ..Default::default()
    };

    let silent_score = calc(&silent);
    let reporting_score = calc(&reporting);

    assert_eq!(silent_score.risk_score_norm, 1.0);
    assert_eq!(silent_score.risk_score, 100);
    assert!((reporting_score.risk_score_norm - 0.97).abs() < 1e-12);
    assert_eq!(reporting_score.risk_score, 97);
    assert!(
        silent_score.risk_score > reporting_score.risk_score,
        "asymmetric weighting must be preserved"
    );
}

/// PORR = 4.0 would drive the unclamped score to 0.0 exactly; beyond that
/// it would go negative without the clamp.
#[test]
fn risk_score_norm_clamps_at_zero() {
    let raw = RawMetrics {
        overdue15d: 6_000_000.0,
        total_portfolio: 1_000_000.0,
        first_miss: 9,
        disbursed: 3,
        had_float_gap: true,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.porr, 6.0);
    assert_eq!(c.risk_score_norm, 0.0);
    assert_eq!(c.risk_score, 0);
}

/// FIMR far above 1 pushes the DQI blend negative; the result clamps to 0.
#[test]
fn dqi_clamps_when_fimr_is_pathological() {
    let raw = RawMetrics {
        first_miss: 5_000,
        disbursed: 10,
        dpd1to6_bal: 10.0,
        amount_due7d: 1.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.fimr, 500.0);
    assert_eq!(c.dqi, 0);
}

#[test]
fn dqi_with_fimr_above_one() {
    let raw = RawMetrics {
        first_miss: 50,
        disbursed: 10,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.risk_score, 0);
    // 0 + 0.30 + 0.20 + (1 - 5) * 0.10 = 0.1
    assert_eq!(c.dqi, 10);
}

#[test]
fn repayment_delay_rate_is_signed_and_unclamped() {
    let current = RawMetrics {
        avg_days_since_last_repayment: 5.0,
        avg_loan_age: 40.0,
        ..Default::default()
    };
    let late = RawMetrics {
        avg_days_since_last_repayment: 20.0,
        avg_loan_age: 40.0,
        ..Default::default()
    };
    let paid_today = RawMetrics {
        avg_days_since_last_repayment: 0.0,
        avg_loan_age: 40.0,
        ..Default::default()
    };

    assert_eq!(calc(&current).repayment_delay_rate, 50.0);
    assert_eq!(calc(&late).repayment_delay_rate, -100.0);
    assert_eq!(calc(&paid_today).repayment_delay_rate, 100.0);
}

#[test]
fn behaviour_fields_pass_through() {
    let raw = RawMetrics {
        avg_timeliness_score: 72.5,
        avg_repayment_health: 81.25,
        avg_days_since_last_repayment: 3.5,
        avg_loan_age: 28.0,
        ..Default::default()
    };
    let c = calc(&raw);
    assert_eq!(c.avg_timeliness_score, 72.5);
    assert_eq!(c.avg_repayment_health, 81.25);
    assert_eq!(c.avg_days_since_last_repayment, 3.5);
    assert_eq!(c.avg_loan_age, 28.0);
}

/// Same snapshot in, same metrics out, field for field.
#[test]
fn calculation_is_idempotent() {
    let raw = RawMetrics {
        first_miss: 3,
        disbursed: 41,
        backdated: 2,
        entries: 57,
        reversals: 1,
        active_loans_count: 38,
        dpd1to6_bal: 12_345.67,
        amount_due7d: 98_765.43,
        moved_to7to30: 4_321.0,
        prev_dpd1to6_bal: 11_000.0,
        fees_collected: 2_500.0,
        fees_due: 3_100.0,
        interest_collected: 18_200.0,
        overdue15d: 75_000.0,
        total_portfolio: 1_250_000.0,
        par15_mid_month: 80_000.0,
        waivers: 1_200.0,
        had_float_gap: true,
        avg_timeliness_score: 64.0,
        avg_repayment_health: 70.0,
        avg_days_since_last_repayment: 6.0,
        avg_loan_age: 33.0,
    };
    let calculator = ScoreCalculator::new(MetricsConfig::default()).unwrap();
    let a = calculator.calculate(&raw);
    let b = calculator.calculate(&raw);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn calculator_rejects_invalid_config() {
    let mut zero_target = MetricsConfig::default();
    zero_target.repayment_delay_target_ratio = 0.0;
    assert!(matches!(
        ScoreCalculator::new(zero_target),
        Err(MetricsError::InvalidConfig { .. })
    ));

    let mut negative = MetricsConfig::default();
    negative.risk_weights.float_gap = -0.1;
    assert!(ScoreCalculator::new(negative).is_err());
}

#[test]
fn calculated_metrics_serialise_with_dashboard_names() {
    let c = calc(&RawMetrics::default());
    let json = serde_json::to_value(&c).unwrap();
    for key in [
        "fimr",
        "riskScore",
        "riskScoreNorm",
        "dqi",
        "yield",
        "overdue15dVolume",
        "onTimeRate",
        "channelPurity",
        "repaymentDelayRate",
    ] {
        assert!(json.get(key).is_some(), "missing key {key} in {json}");
    }
}
