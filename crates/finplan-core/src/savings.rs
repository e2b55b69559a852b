use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinplanError;
use crate::rates::{monthly_rate, RateConvention};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::FinplanResult;

/// Longest supported savings term: 100 years.
pub const MAX_SAVINGS_MONTHS: u32 = 1200;

/// Fixed-term savings configuration. Each month the deposit lands first and
/// the whole balance then earns interest, so a deposit starts compounding in
/// the month it is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsInput {
    pub start_balance: Money,
    pub monthly_deposit: Money,
    pub term_months: u32,
    /// Annual rate as a percentage (6 means 6%).
    pub annual_rate: Rate,
    pub convention: RateConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOutput {
    pub final_balance: Money,
    /// Starting balance plus every deposit made.
    pub total_deposited: Money,
    pub interest_accrued: Money,
}

/// Project a savings balance over a fixed term at a single rate.
pub fn project_savings(input: &SavingsInput) -> FinplanResult<ComputationOutput<SavingsOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.start_balance < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "start_balance".into(),
            reason: "Starting balance must be non-negative".into(),
        });
    }
    if input.monthly_deposit < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "monthly_deposit".into(),
            reason: "Monthly deposit must be non-negative".into(),
        });
    }
    if input.term_months == 0 || input.term_months > MAX_SAVINGS_MONTHS {
        return Err(FinplanError::TimeframeOutOfRange {
            months: input.term_months,
            max_months: MAX_SAVINGS_MONTHS,
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be non-negative".into(),
        });
    }

    let rate = monthly_rate(input.annual_rate, input.convention)?;

    let mut balance = input.start_balance;
    let mut interest_accrued = Decimal::ZERO;

    for _ in 0..input.term_months {
        balance += input.monthly_deposit;
        let interest = balance * rate;
        balance += interest;
        interest_accrued += interest;
    }

    let total_deposited =
        input.start_balance + input.monthly_deposit * Decimal::from(input.term_months);

    let output = SavingsOutput {
        final_balance: round_money(balance),
        total_deposited: round_money(total_deposited),
        interest_accrued: round_money(interest_accrued),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Savings projection (deposit-first monthly compounding)",
        &serde_json::json!({
            "start_balance": input.start_balance.to_string(),
            "monthly_deposit": input.monthly_deposit.to_string(),
            "term_months": input.term_months,
            "annual_rate_pct": input.annual_rate.to_string(),
            "convention": format!("{:?}", input.convention),
        }),
        warnings,
        elapsed,
        output,
    ))
}
