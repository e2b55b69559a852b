use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinplanError;
use crate::rates::{monthly_rate, RateConvention};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate, TrajectoryPoint};
use crate::FinplanResult;

/// Longest supported projection horizon: 1000 years.
pub const MAX_HORIZON_MONTHS: u32 = 12_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Monthly cash flow applied after growth each period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CashFlowMode {
    /// Regular deposit; the balance is never clamped and growth is unbounded.
    Contribution { amount: Money },
    /// Regular withdrawal; the balance is clamped at zero and the trajectory
    /// stops at the depletion month.
    Withdrawal { amount: Money },
}

/// Three-scenario projection configuration. Low uses base - variance,
/// High uses base + variance; cash flow and horizon are shared so the three
/// paths are comparable on one chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub start_balance: Money,
    /// Base annual rate as a percentage (6 means 6%).
    pub base_annual_rate: Rate,
    /// Variance applied to the base annual rate, in percentage points.
    pub variance_annual_rate: Rate,
    pub cash_flow: CashFlowMode,
    pub horizon_months: u32,
    pub convention: RateConvention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioLabel {
    Low,
    Base,
    High,
}

/// One projected path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioPath {
    pub label: ScenarioLabel,
    /// Annual rate this path was run at, in percent.
    pub annual_rate_pct: Rate,
    pub trajectory: Vec<TrajectoryPoint>,
    /// Balance at the horizon, or zero if the path depleted first.
    pub final_balance: Money,
    /// First month at which the balance reached zero (withdrawal mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depletion_month: Option<u32>,
    /// Growth accrued over the simulated months (negative at negative rates).
    pub total_growth: Money,
    /// Sum of contributions or withdrawals applied.
    pub total_cash_flow: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjectionOutput {
    pub low: ScenarioPath,
    pub base: ScenarioPath,
    pub high: ScenarioPath,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project Low/Base/High balance trajectories for a contribution or
/// withdrawal configuration.
pub fn project_scenarios(
    input: &ScenarioInput,
) -> FinplanResult<ComputationOutput<ScenarioProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.start_balance < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "start_balance".into(),
            reason: "Starting balance must be non-negative".into(),
        });
    }
    if input.variance_annual_rate < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "variance_annual_rate".into(),
            reason: "Rate variance must be non-negative".into(),
        });
    }
    if input.horizon_months == 0 || input.horizon_months > MAX_HORIZON_MONTHS {
        return Err(FinplanError::TimeframeOutOfRange {
            months: input.horizon_months,
            max_months: MAX_HORIZON_MONTHS,
        });
    }
    let amount = match &input.cash_flow {
        CashFlowMode::Contribution { amount } | CashFlowMode::Withdrawal { amount } => *amount,
    };
    if amount < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "cash_flow".into(),
            reason: "Monthly cash flow amount must be non-negative".into(),
        });
    }

    let low_annual = input.base_annual_rate - input.variance_annual_rate;
    if low_annual < Decimal::ZERO {
        warnings.push(format!(
            "Low scenario annual rate is negative ({low_annual}%)"
        ));
    }

    let low = run_path(input, ScenarioLabel::Low, low_annual)?;
    let base = run_path(input, ScenarioLabel::Base, input.base_annual_rate)?;
    let high = run_path(
        input,
        ScenarioLabel::High,
        input.base_annual_rate + input.variance_annual_rate,
    )?;

    let mode_label = match &input.cash_flow {
        CashFlowMode::Contribution { .. } => "contribution",
        CashFlowMode::Withdrawal { .. } => "withdrawal",
    };

    let output = ScenarioProjectionOutput { low, base, high };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Low/Base/High projection (monthly compounding at base ± variance)",
        &serde_json::json!({
            "start_balance": input.start_balance.to_string(),
            "base_annual_rate_pct": input.base_annual_rate.to_string(),
            "variance_annual_rate_pct": input.variance_annual_rate.to_string(),
            "mode": mode_label,
            "horizon_months": input.horizon_months,
            "convention": format!("{:?}", input.convention),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn run_path(
    input: &ScenarioInput,
    label: ScenarioLabel,
    annual_pct: Rate,
) -> FinplanResult<ScenarioPath> {
    let rate = monthly_rate(annual_pct, input.convention)?;

    let mut balance = input.start_balance;
    let mut trajectory = Vec::with_capacity(input.horizon_months as usize + 1);
    trajectory.push(TrajectoryPoint {
        month: 0,
        balance: round_money(balance),
    });

    let mut total_growth = Decimal::ZERO;
    let mut total_cash_flow = Decimal::ZERO;
    let mut depletion_month = None;

    for month in 1..=input.horizon_months {
        let growth = balance * rate;
        total_growth += growth;

        let depleted = match &input.cash_flow {
            CashFlowMode::Contribution { amount } => {
                balance = balance + growth + amount;
                total_cash_flow += amount;
                false
            }
            CashFlowMode::Withdrawal { amount } => {
                balance = balance + growth - amount;
                total_cash_flow += amount;
                if balance <= Decimal::ZERO {
                    balance = Decimal::ZERO;
                    true
                } else {
                    false
                }
            }
        };

        trajectory.push(TrajectoryPoint {
            month,
            balance: round_money(balance),
        });

        if depleted {
            depletion_month = Some(month);
            break;
        }
    }

    Ok(ScenarioPath {
        label,
        annual_rate_pct: annual_pct,
        trajectory,
        final_balance: round_money(balance),
        depletion_month,
        total_growth: round_money(total_growth),
        total_cash_flow: round_money(total_cash_flow),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn growth_input(
        start: Decimal,
        contribution: Decimal,
        base: Decimal,
        variance: Decimal,
        horizon: u32,
    ) -> ScenarioInput {
        ScenarioInput {
            start_balance: start,
            base_annual_rate: base,
            variance_annual_rate: variance,
            cash_flow: CashFlowMode::Contribution {
                amount: contribution,
            },
            horizon_months: horizon,
            convention: RateConvention::NominalApr,
        }
    }

    fn drawdown_input(
        start: Decimal,
        withdrawal: Decimal,
        base: Decimal,
        variance: Decimal,
        horizon: u32,
    ) -> ScenarioInput {
        ScenarioInput {
            start_balance: start,
            base_annual_rate: base,
            variance_annual_rate: variance,
            cash_flow: CashFlowMode::Withdrawal { amount: withdrawal },
            horizon_months: horizon,
            convention: RateConvention::NominalApr,
        }
    }

    #[test]
    fn test_growth_final_balances_ordered() {
        let out = project_scenarios(&growth_input(dec!(1000), dec!(100), dec!(6), dec!(2), 24))
            .unwrap()
            .result;
        assert!(out.low.final_balance <= out.base.final_balance);
        assert!(out.base.final_balance <= out.high.final_balance);
        assert!(out.low.depletion_month.is_none());
        assert_eq!(out.base.trajectory.len(), 25);
        assert_eq!(out.base.trajectory[0].month, 0);
        assert_eq!(out.base.trajectory[0].balance, dec!(1000));
    }

    #[test]
    fn test_growth_matches_compound_closed_form() {
        // No contributions, 12% APR: 1000 * 1.01^12 ≈ 1126.83
        let out = project_scenarios(&growth_input(dec!(1000), dec!(0), dec!(12), dec!(0), 12))
            .unwrap()
            .result;
        assert_eq!(out.low.final_balance, out.high.final_balance);
        assert!((out.base.final_balance - dec!(1126.83)).abs() < dec!(0.01));
        assert!((out.base.total_growth - dec!(126.83)).abs() < dec!(0.01));
    }

    #[test]
    fn test_drawdown_zero_rate_depletes_exactly() {
        let out = project_scenarios(&drawdown_input(dec!(10000), dec!(500), dec!(0), dec!(0), 600))
            .unwrap()
            .result;
        assert_eq!(out.base.depletion_month, Some(20));
        let last = out.base.trajectory.last().unwrap();
        assert_eq!(last.month, 20);
        assert_eq!(last.balance, dec!(0));
        assert_eq!(out.base.final_balance, dec!(0));
        assert_eq!(out.base.total_cash_flow, dec!(10000));
    }

    #[test]
    fn test_drawdown_low_depletes_no_later_than_high() {
        let out = project_scenarios(&drawdown_input(dec!(10000), dec!(300), dec!(12), dec!(12), 600))
            .unwrap()
            .result;
        let low = out.low.depletion_month.expect("low path should deplete");
        match out.high.depletion_month {
            Some(high) => assert!(low <= high),
            None => {} // high survived the horizon entirely
        }
    }

    #[test]
    fn test_drawdown_sustained_when_growth_covers_withdrawal() {
        // 1% monthly growth on 10_000 is 100; withdrawing 50 never depletes
        let out = project_scenarios(&drawdown_input(dec!(10000), dec!(50), dec!(12), dec!(0), 120))
            .unwrap()
            .result;
        assert!(out.base.depletion_month.is_none());
        assert!(out.base.final_balance > dec!(10000));
        assert_eq!(out.base.trajectory.len(), 121);
    }

    #[test]
    fn test_negative_low_rate_warns_but_computes() {
        let out = project_scenarios(&growth_input(dec!(1000), dec!(0), dec!(2), dec!(5), 12)).unwrap();
        assert!(!out.warnings.is_empty());
        assert!(out.result.low.final_balance < dec!(1000));
    }

    #[test]
    fn test_horizon_bounds() {
        let err = project_scenarios(&growth_input(dec!(1000), dec!(0), dec!(6), dec!(0), 0))
            .unwrap_err();
        assert!(matches!(err, FinplanError::TimeframeOutOfRange { .. }));
        let err = project_scenarios(&growth_input(
            dec!(1000),
            dec!(0),
            dec!(6),
            dec!(0),
            MAX_HORIZON_MONTHS + 1,
        ))
        .unwrap_err();
        assert!(matches!(err, FinplanError::TimeframeOutOfRange { .. }));
    }
}
