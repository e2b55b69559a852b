use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{simulate_payoff, MAX_PAYOFF_MONTHS};
use crate::error::FinplanError;
use crate::rates::{annuity_payment, monthly_rate, RateConvention};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::FinplanResult;

/// Cap on the repayment-with-overpay loop: 1000 years.
pub const MAX_OVERPAY_MONTHS: u32 = 12_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The two loan structures diverge structurally, not just parametrically:
/// an interest-only loan never amortizes principal through its payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanType {
    InterestOnly,
    Repayment,
}

/// Mortgage configuration with optional overpayments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub principal: Money,
    /// Annual rate as a percentage (6 means 6%).
    pub annual_rate: Rate,
    pub convention: RateConvention,
    pub term_months: u32,
    pub loan_type: LoanType,
    /// Applied once to reduce the principal before the first period.
    #[serde(default)]
    pub one_off_overpay: Money,
    /// Applied every period on top of the base payment.
    #[serde(default)]
    pub recurring_overpay: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub baseline_monthly_payment: Money,
    pub baseline_total_interest: Money,
    /// Months until the balance clears; the full term for interest-only.
    pub months_to_clear: u32,
    pub total_interest_with_overpay: Money,
    /// Baseline interest minus simulated interest, clamped at zero.
    pub interest_saved: Money,
    /// Principal still owed at term end (interest-only loans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon_balance: Option<Money>,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Simulate a mortgage with one-off and recurring overpayments against its
/// no-overpay baseline.
///
/// Fallback policy: if the combined repayment-mode payment does not exceed
/// the interest accruing on the reduced opening balance, the loan cannot
/// amortize; the simulator reports the original term with the interest that
/// would accrue on the stalled balance instead of looping without bound, and
/// says so in a warning. (With the base payment set to the annuity payment
/// this branch is unreachable; it guards future payment sources.)
pub fn simulate_mortgage(input: &MortgageInput) -> FinplanResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal <= Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be non-negative".into(),
        });
    }
    if input.term_months == 0 || input.term_months > MAX_PAYOFF_MONTHS {
        return Err(FinplanError::TimeframeOutOfRange {
            months: input.term_months,
            max_months: MAX_PAYOFF_MONTHS,
        });
    }
    if input.one_off_overpay < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "one_off_overpay".into(),
            reason: "One-off overpayment must be non-negative".into(),
        });
    }
    if input.recurring_overpay < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "recurring_overpay".into(),
            reason: "Recurring overpayment must be non-negative".into(),
        });
    }

    let rate = monthly_rate(input.annual_rate, input.convention)?;
    let term = input.term_months;

    // Baseline totals without any overpayment
    let (baseline_payment, baseline_interest) = match input.loan_type {
        LoanType::InterestOnly => {
            let payment = input.principal * rate;
            (payment, payment * Decimal::from(term))
        }
        LoanType::Repayment => {
            let payment = annuity_payment(input.principal, rate, term);
            (payment, payment * Decimal::from(term) - input.principal)
        }
    };

    // One-off overpayment reduces the opening balance before the loop
    let reduced = (input.principal - input.one_off_overpay).max(Decimal::ZERO);

    let (months_to_clear, sim_interest, balloon) = match input.loan_type {
        LoanType::InterestOnly => {
            let mut balance = reduced;
            let mut accrued = Decimal::ZERO;
            for _ in 0..term {
                accrued += balance * rate;
                balance = (balance - input.recurring_overpay).max(Decimal::ZERO);
            }
            (term, accrued, Some(balance))
        }
        LoanType::Repayment => {
            if reduced.is_zero() {
                (0, Decimal::ZERO, None)
            } else {
                let payment = baseline_payment + input.recurring_overpay;
                if !rate.is_zero() && payment <= reduced * rate {
                    warnings.push(
                        "Combined payment does not cover interest on the reduced balance; \
                         reporting the original term"
                            .into(),
                    );
                    (term, reduced * rate * Decimal::from(term), None)
                } else {
                    let schedule = simulate_payoff(reduced, rate, payment, MAX_OVERPAY_MONTHS);
                    (schedule.months_taken, schedule.total_interest, None)
                }
            }
        }
    };

    let interest_saved = (baseline_interest - sim_interest).max(Decimal::ZERO);

    let output = MortgageOutput {
        baseline_monthly_payment: round_money(baseline_payment),
        baseline_total_interest: round_money(baseline_interest),
        months_to_clear,
        total_interest_with_overpay: round_money(sim_interest),
        interest_saved: round_money(interest_saved),
        balloon_balance: balloon.map(round_money),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage overpayment simulation against no-overpay baseline",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "convention": format!("{:?}", input.convention),
            "term_months": input.term_months,
            "loan_type": format!("{:?}", input.loan_type),
            "one_off_overpay": input.one_off_overpay.to_string(),
            "recurring_overpay": input.recurring_overpay.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn input(loan_type: LoanType) -> MortgageInput {
        MortgageInput {
            principal: dec!(100000),
            annual_rate: dec!(6),
            convention: RateConvention::NominalApr,
            term_months: 300,
            loan_type,
            one_off_overpay: Decimal::ZERO,
            recurring_overpay: Decimal::ZERO,
        }
    }

    #[test]
    fn test_interest_only_baseline() {
        let out = simulate_mortgage(&input(LoanType::InterestOnly)).unwrap().result;
        // 100_000 at 0.5%/month: 500/month, 150_000 over 300 months
        assert_eq!(out.baseline_monthly_payment, dec!(500));
        assert_eq!(out.baseline_total_interest, dec!(150000));
        assert_eq!(out.months_to_clear, 300);
        assert_eq!(out.total_interest_with_overpay, dec!(150000));
        assert_eq!(out.interest_saved, dec!(0));
        assert_eq!(out.balloon_balance, Some(dec!(100000)));
    }

    #[test]
    fn test_interest_only_one_off_reduces_balloon_and_interest() {
        let mut cfg = input(LoanType::InterestOnly);
        cfg.one_off_overpay = dec!(10000);
        let out = simulate_mortgage(&cfg).unwrap().result;
        assert_eq!(out.total_interest_with_overpay, dec!(135000));
        assert_eq!(out.balloon_balance, Some(dec!(90000)));
        assert_eq!(out.interest_saved, dec!(15000));
    }

    #[test]
    fn test_interest_only_recurring_pays_down_balloon() {
        let cfg = MortgageInput {
            principal: dec!(12000),
            annual_rate: dec!(0),
            convention: RateConvention::NominalApr,
            term_months: 12,
            loan_type: LoanType::InterestOnly,
            one_off_overpay: Decimal::ZERO,
            recurring_overpay: dec!(1000),
        };
        let out = simulate_mortgage(&cfg).unwrap().result;
        assert_eq!(out.balloon_balance, Some(dec!(0)));
        assert_eq!(out.total_interest_with_overpay, dec!(0));
    }

    #[test]
    fn test_repayment_no_overpay_matches_baseline() {
        let cfg = MortgageInput {
            principal: dec!(10000),
            annual_rate: dec!(6),
            convention: RateConvention::NominalApr,
            term_months: 60,
            loan_type: LoanType::Repayment,
            one_off_overpay: Decimal::ZERO,
            recurring_overpay: Decimal::ZERO,
        };
        let out = simulate_mortgage(&cfg).unwrap().result;
        assert_eq!(out.months_to_clear, 60);
        assert!((out.baseline_monthly_payment - dec!(193.33)).abs() < dec!(0.01));
        assert!((out.baseline_total_interest - dec!(1599.68)).abs() < dec!(0.05));
        assert!(out.interest_saved < dec!(0.01));
        assert!(out.balloon_balance.is_none());
    }

    #[test]
    fn test_repayment_recurring_overpay_shortens_term() {
        let mut cfg = input(LoanType::Repayment);
        cfg.recurring_overpay = dec!(200);
        let out = simulate_mortgage(&cfg).unwrap().result;
        assert!(out.months_to_clear < 300);
        assert!(out.interest_saved > dec!(0));
        assert!(out.total_interest_with_overpay < out.baseline_total_interest);
    }

    #[test]
    fn test_repayment_one_off_covering_whole_loan() {
        let mut cfg = input(LoanType::Repayment);
        cfg.one_off_overpay = dec!(100000);
        let out = simulate_mortgage(&cfg).unwrap().result;
        assert_eq!(out.months_to_clear, 0);
        assert_eq!(out.total_interest_with_overpay, dec!(0));
        assert_eq!(out.interest_saved, out.baseline_total_interest);
    }

    #[test]
    fn test_term_bounds() {
        let mut cfg = input(LoanType::Repayment);
        cfg.term_months = 0;
        assert!(matches!(
            simulate_mortgage(&cfg).unwrap_err(),
            FinplanError::TimeframeOutOfRange { .. }
        ));
        cfg.term_months = 601;
        assert!(matches!(
            simulate_mortgage(&cfg).unwrap_err(),
            FinplanError::TimeframeOutOfRange { .. }
        ));
    }

    #[test]
    fn test_overpay_must_be_non_negative() {
        let mut cfg = input(LoanType::Repayment);
        cfg.one_off_overpay = dec!(-1);
        assert!(matches!(
            simulate_mortgage(&cfg).unwrap_err(),
            FinplanError::InvalidInput { .. }
        ));
    }
}
