use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinplanError;
use crate::rates::{monthly_rate, RateConvention};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::FinplanResult;

/// Default safety cap for the accumulation loop: 1000 years.
pub const DEFAULT_CAP_MONTHS: u32 = 12_000;

fn default_cap_months() -> u32 {
    DEFAULT_CAP_MONTHS
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Time-to-target configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInput {
    pub start_balance: Money,
    pub monthly_contribution: Money,
    pub target_balance: Money,
    /// Annual rate as a percentage (6 means 6%).
    pub annual_rate: Rate,
    pub convention: RateConvention,
    /// Safety cap on the accumulation loop; the solver fails with
    /// `TargetNotReachable` rather than report a number beyond it.
    #[serde(default = "default_cap_months")]
    pub cap_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetOutput {
    pub months_taken: u32,
    pub final_balance: Money,
    /// Starting balance plus every deposit made.
    pub contributions: Money,
    /// Final balance minus contributions.
    pub growth: Money,
    /// Share of the final balance that came from contributions, in percent.
    pub contribution_pct: Rate,
    /// Share of the final balance that came from growth, in percent.
    pub growth_pct: Rate,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Iterate contribution + growth from the starting balance until the target
/// is reached, or fail once the safety cap is exhausted.
pub fn solve_target(input: &TargetInput) -> FinplanResult<ComputationOutput<TargetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.start_balance < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "start_balance".into(),
            reason: "Starting balance must be non-negative".into(),
        });
    }
    if input.monthly_contribution < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "monthly_contribution".into(),
            reason: "Monthly contribution must be non-negative".into(),
        });
    }
    if input.target_balance <= Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "target_balance".into(),
            reason: "Target balance must be positive".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be non-negative".into(),
        });
    }
    if input.cap_months == 0 {
        return Err(FinplanError::InvalidInput {
            field: "cap_months".into(),
            reason: "Safety cap must be at least one month".into(),
        });
    }

    let rate = monthly_rate(input.annual_rate, input.convention)?;

    let mut balance = input.start_balance;
    let mut months: u32 = 0;

    while balance < input.target_balance && months < input.cap_months {
        balance = balance * (Decimal::ONE + rate) + input.monthly_contribution;
        months += 1;
    }

    if balance < input.target_balance {
        return Err(FinplanError::TargetNotReachable {
            cap_months: input.cap_months,
        });
    }

    if months >= 1200 {
        warnings.push("Target takes more than 100 years to reach".into());
    }

    let contributions =
        input.start_balance + input.monthly_contribution * Decimal::from(months);
    let growth = balance - contributions;

    let (contribution_pct, growth_pct) = if balance > Decimal::ZERO {
        (
            round_pct(contributions / balance * dec!(100)),
            round_pct(growth / balance * dec!(100)),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let output = TargetOutput {
        months_taken: months,
        final_balance: round_money(balance),
        contributions: round_money(contributions),
        growth: round_money(growth),
        contribution_pct,
        growth_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Target balance accumulation (bounded month-by-month iteration)",
        &serde_json::json!({
            "start_balance": input.start_balance.to_string(),
            "monthly_contribution": input.monthly_contribution.to_string(),
            "target_balance": input.target_balance.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "convention": format!("{:?}", input.convention),
            "cap_months": input.cap_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Percentage splits are display values; one decimal place is enough.
fn round_pct(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
