use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinplanError;
use crate::rates::{annuity_payment, monthly_rate, RateConvention};
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::FinplanResult;

/// Hard cap on payoff length: 50 years.
pub const MAX_PAYOFF_MONTHS: u32 = 600;

/// Remaining-balance threshold below which the debt counts as cleared.
const EPSILON: Decimal = dec!(0.000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which side of the payoff equation the caller fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RepaymentMode {
    /// Fixed monthly payment; solve for the time to clear the debt.
    FixedPayment { payment: Money },
    /// Fixed term in months; solve for the required monthly payment.
    FixedTerm { months: u32 },
}

/// A loan payoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Annual rate as a percentage (6 means 6%).
    pub annual_rate: Rate,
    pub convention: RateConvention,
    pub mode: RepaymentMode,
}

/// Payoff schedule summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub months_taken: u32,
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    /// The final period's payment, clamped to the remaining balance. May be
    /// smaller than `monthly_payment`, never larger.
    pub final_payment: Money,
}

// ---------------------------------------------------------------------------
// Shared simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub(crate) struct PayoffSchedule {
    pub months_taken: u32,
    pub total_paid: Money,
    pub total_interest: Money,
    pub final_payment: Money,
}

/// Month-by-month payoff simulation. The closed forms above only bound the
/// iteration count; this loop is authoritative for money amounts because the
/// final period's payment is clamped to the remaining balance.
///
/// All accumulation is unrounded; callers round the values they report.
pub(crate) fn simulate_payoff(
    principal: Money,
    rate: Rate,
    payment: Money,
    max_months: u32,
) -> PayoffSchedule {
    // An already-cleared balance takes zero months and pays nothing
    if principal <= EPSILON {
        return PayoffSchedule {
            months_taken: 0,
            total_paid: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            final_payment: Decimal::ZERO,
        };
    }

    let mut remaining = principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut final_payment = payment;
    let mut months_taken = 0u32;

    for _ in 1..=max_months {
        months_taken += 1;
        let interest = remaining * rate;
        let principal_portion = (payment - interest).min(remaining);
        let actual_payment = principal_portion + interest;
        remaining = (remaining - principal_portion).max(Decimal::ZERO);

        total_paid += actual_payment;
        total_interest += interest;
        final_payment = actual_payment;

        if remaining <= EPSILON {
            break;
        }
    }

    PayoffSchedule {
        months_taken,
        total_paid,
        total_interest,
        final_payment,
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute a loan payoff, either the time to clear the debt at a fixed
/// payment or the payment required to clear it in a fixed term.
pub fn amortize(input: &LoanInput) -> FinplanResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.principal < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be non-negative".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be non-negative".into(),
        });
    }

    let rate = monthly_rate(input.annual_rate, input.convention)?;

    let (payment, months) = match &input.mode {
        RepaymentMode::FixedPayment { payment } => {
            let months = solve_months(input.principal, rate, *payment)?;
            (*payment, months)
        }
        RepaymentMode::FixedTerm { months } => {
            if *months == 0 || *months > MAX_PAYOFF_MONTHS {
                return Err(FinplanError::TimeframeOutOfRange {
                    months: *months,
                    max_months: MAX_PAYOFF_MONTHS,
                });
            }
            (annuity_payment(input.principal, rate, *months), *months)
        }
    };

    let schedule = simulate_payoff(input.principal, rate, payment, months);

    let output = AmortizationOutput {
        months_taken: schedule.months_taken,
        monthly_payment: round_money(payment),
        total_paid: round_money(schedule.total_paid),
        total_interest: round_money(schedule.total_interest),
        final_payment: round_money(schedule.final_payment),
    };

    let mode_label = match &input.mode {
        RepaymentMode::FixedPayment { .. } => "fixed_payment",
        RepaymentMode::FixedTerm { .. } => "fixed_term",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan amortisation (analytic month bound, exact month-by-month simulation)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate_pct": input.annual_rate.to_string(),
            "convention": format!("{:?}", input.convention),
            "mode": mode_label,
            "monthly_rate": rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Months needed to clear `principal` at a fixed `payment`.
///
/// The zero-rate case is a straight line. Otherwise the analytic estimate
/// t = ln(pmt / (pmt - P*r)) / ln(1 + r) bounds the simulation; a payment at
/// or below the interest on the opening balance can never clear the debt, and
/// the reported minimum adds one currency unit as a usability margin rather
/// than quoting the unpayable mathematical infimum.
fn solve_months(principal: Money, rate: Rate, payment: Money) -> FinplanResult<u32> {
    if payment <= Decimal::ZERO {
        return Err(FinplanError::InvalidInput {
            field: "payment".into(),
            reason: "Monthly payment must be positive".into(),
        });
    }

    if rate.is_zero() {
        let months = (principal / payment)
            .ceil()
            .to_u32()
            .ok_or(FinplanError::TermTooLong {
                limit_months: MAX_PAYOFF_MONTHS,
            })?;
        if months > MAX_PAYOFF_MONTHS {
            return Err(FinplanError::TermTooLong {
                limit_months: MAX_PAYOFF_MONTHS,
            });
        }
        return Ok(months);
    }

    let opening_interest = principal * rate;
    if payment <= opening_interest {
        return Err(FinplanError::PaymentTooLow {
            minimum_payment: round_money(opening_interest + Decimal::ONE),
        });
    }

    let ratio = payment / (payment - opening_interest);
    let t = match (ratio.checked_ln(), (Decimal::ONE + rate).checked_ln()) {
        (Some(num), Some(den)) if !den.is_zero() => num / den,
        _ => {
            return Err(FinplanError::TermTooLong {
                limit_months: MAX_PAYOFF_MONTHS,
            })
        }
    };

    if t > Decimal::from(MAX_PAYOFF_MONTHS) {
        return Err(FinplanError::TermTooLong {
            limit_months: MAX_PAYOFF_MONTHS,
        });
    }

    t.ceil().to_u32().ok_or(FinplanError::TermTooLong {
        limit_months: MAX_PAYOFF_MONTHS,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn fixed_payment(principal: Decimal, annual_rate: Decimal, payment: Decimal) -> LoanInput {
        LoanInput {
            principal,
            annual_rate,
            convention: RateConvention::NominalApr,
            mode: RepaymentMode::FixedPayment { payment },
        }
    }

    fn fixed_term(principal: Decimal, annual_rate: Decimal, months: u32) -> LoanInput {
        LoanInput {
            principal,
            annual_rate,
            convention: RateConvention::NominalApr,
            mode: RepaymentMode::FixedTerm { months },
        }
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let out = amortize(&fixed_payment(dec!(1200), dec!(0), dec!(100)))
            .unwrap()
            .result;
        assert_eq!(out.months_taken, 12);
        assert_eq!(out.final_payment, dec!(100));
        assert_eq!(out.total_interest, dec!(0));
        assert_eq!(out.total_paid, dec!(1200));
    }

    #[test]
    fn test_zero_rate_partial_final_payment() {
        let out = amortize(&fixed_payment(dec!(1000), dec!(0), dec!(300)))
            .unwrap()
            .result;
        assert_eq!(out.months_taken, 4);
        assert_eq!(out.final_payment, dec!(100));
        assert_eq!(out.total_paid, dec!(1000));
    }

    #[test]
    fn test_payment_at_opening_interest_fails() {
        // 1000 at 12% APR: monthly rate 1%, interest on opening 10
        let err = amortize(&fixed_payment(dec!(1000), dec!(12), dec!(10))).unwrap_err();
        match err {
            FinplanError::PaymentTooLow { minimum_payment } => {
                assert_eq!(minimum_payment, dec!(11));
            }
            other => panic!("expected PaymentTooLow, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_just_above_opening_interest_terminates() {
        let out = amortize(&fixed_payment(dec!(1000), dec!(12), dec!(11)))
            .unwrap()
            .result;
        assert!(out.months_taken > 0);
        assert!(out.months_taken <= MAX_PAYOFF_MONTHS);
        assert!(out.final_payment <= out.monthly_payment);
    }

    #[test]
    fn test_analytic_bound_over_fifty_years_fails() {
        // t = ln(10.01 / 0.01) / ln(1.01) ≈ 694 months
        let err = amortize(&fixed_payment(dec!(1000), dec!(12), dec!(10.01))).unwrap_err();
        assert!(matches!(err, FinplanError::TermTooLong { .. }));
    }

    #[test]
    fn test_analytic_bound_under_fifty_years_succeeds() {
        // t = ln(10.05 / 0.05) / ln(1.01) ≈ 533 months
        let out = amortize(&fixed_payment(dec!(1000), dec!(12), dec!(10.05)))
            .unwrap()
            .result;
        assert!(out.months_taken <= MAX_PAYOFF_MONTHS);
        assert!(out.total_interest > dec!(0));
    }

    #[test]
    fn test_fixed_term_annuity_concrete() {
        // 10_000 at 6% APR over 60 months: payment ≈ 193.33, interest ≈ 1599.68
        let out = amortize(&fixed_term(dec!(10000), dec!(6), 60)).unwrap().result;
        assert_eq!(out.months_taken, 60);
        assert!((out.monthly_payment - dec!(193.33)).abs() < dec!(0.01));
        assert!((out.total_interest - dec!(1599.68)).abs() < dec!(0.05));
        // total_paid = principal + total_interest within rounding
        assert!((out.total_paid - dec!(10000) - out.total_interest).abs() <= dec!(0.02));
    }

    #[test]
    fn test_fixed_term_bounds() {
        assert!(matches!(
            amortize(&fixed_term(dec!(1000), dec!(6), 0)).unwrap_err(),
            FinplanError::TimeframeOutOfRange { .. }
        ));
        assert!(matches!(
            amortize(&fixed_term(dec!(1000), dec!(6), 601)).unwrap_err(),
            FinplanError::TimeframeOutOfRange { .. }
        ));
        assert!(amortize(&fixed_term(dec!(1000), dec!(6), 600)).is_ok());
    }

    #[test]
    fn test_round_trip_term_to_payment_to_term() {
        let solved = amortize(&fixed_term(dec!(10000), dec!(6), 60)).unwrap().result;
        let back = amortize(&fixed_payment(dec!(10000), dec!(6), solved.monthly_payment))
            .unwrap()
            .result;
        // Final-period rounding may shift the answer by one month
        assert!(back.months_taken >= 59 && back.months_taken <= 61);
    }

    #[test]
    fn test_negative_principal_rejected() {
        let err = amortize(&fixed_payment(dec!(-1), dec!(6), dec!(100))).unwrap_err();
        assert!(matches!(err, FinplanError::InvalidInput { .. }));
    }

    #[test]
    fn test_zero_principal_clears_in_zero_months() {
        // Nothing owed: a 0-month payoff with all-zero totals, in both modes
        let out = amortize(&fixed_payment(dec!(0), dec!(12), dec!(100)))
            .unwrap()
            .result;
        assert_eq!(out.months_taken, 0);
        assert_eq!(out.total_paid, dec!(0));
        assert_eq!(out.total_interest, dec!(0));
        assert_eq!(out.final_payment, dec!(0));

        let out = amortize(&fixed_term(dec!(0), dec!(12), 60)).unwrap().result;
        assert_eq!(out.months_taken, 0);
        assert_eq!(out.monthly_payment, dec!(0));
        assert_eq!(out.total_paid, dec!(0));
    }

    #[test]
    fn test_final_payment_never_exceeds_monthly() {
        let out = amortize(&fixed_payment(dec!(5000), dec!(18), dec!(250)))
            .unwrap()
            .result;
        assert!(out.final_payment <= out.monthly_payment);
        assert!((out.total_paid - dec!(5000) - out.total_interest).abs() <= dec!(0.02));
    }
}
