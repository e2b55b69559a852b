use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinplanError;
use crate::types::{Money, Rate};
use crate::FinplanResult;

/// Compounding convention under which an annual percentage is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateConvention {
    /// Nominal APR: the annual rate is divided evenly across twelve months.
    NominalApr,
    /// Effective AER: the monthly rate is the twelfth root of the annual
    /// growth factor, so twelve compoundings reproduce the annual rate.
    EffectiveAer,
}

/// Effective monthly rate for an annual percentage under a convention.
///
/// `annual_pct` is a percentage (6 means 6%). Negative quotes are accepted
/// (a Low scenario can sit below zero); an effective rate at or below
/// -100% has no real twelfth root and is rejected.
pub fn monthly_rate(annual_pct: Rate, convention: RateConvention) -> FinplanResult<Rate> {
    let annual = annual_pct / dec!(100);
    match convention {
        RateConvention::NominalApr => Ok(annual / dec!(12)),
        RateConvention::EffectiveAer => {
            let growth = Decimal::ONE + annual;
            if growth <= Decimal::ZERO {
                return Err(FinplanError::InvalidInput {
                    field: "annual_rate".into(),
                    reason: "Effective annual rate must be greater than -100%".into(),
                });
            }
            Ok(growth.powd(Decimal::ONE / dec!(12)) - Decimal::ONE)
        }
    }
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub(crate) fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Level payment that fully repays `principal` over `n` periods at `rate`:
/// pmt = P * r * (1+r)^n / ((1+r)^n - 1), or P / n at zero rate.
pub(crate) fn annuity_payment(principal: Money, rate: Rate, n: u32) -> Money {
    if n == 0 {
        return Decimal::ZERO;
    }
    if rate.is_zero() {
        return principal / Decimal::from(n);
    }
    let factor = compound(rate, n);
    principal * rate * factor / (factor - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_apr_divides_evenly() {
        let r = monthly_rate(dec!(12), RateConvention::NominalApr).unwrap();
        assert_eq!(r, dec!(0.01));
    }

    #[test]
    fn test_aer_twelfth_root() {
        let r = monthly_rate(dec!(12), RateConvention::EffectiveAer).unwrap();
        // 1.12^(1/12) - 1 ≈ 0.0094888
        assert!((r - dec!(0.0094888)).abs() < dec!(0.000001));
        // Twelve compoundings reproduce the annual growth factor
        let annual = compound(r, 12);
        assert!((annual - dec!(1.12)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_aer_below_apr_for_positive_rates() {
        let apr = monthly_rate(dec!(6), RateConvention::NominalApr).unwrap();
        let aer = monthly_rate(dec!(6), RateConvention::EffectiveAer).unwrap();
        assert!(aer < apr);
    }

    #[test]
    fn test_negative_annual_rate_allowed() {
        let r = monthly_rate(dec!(-3), RateConvention::NominalApr).unwrap();
        assert_eq!(r, dec!(-0.0025));
    }

    #[test]
    fn test_aer_rejects_total_loss() {
        let err = monthly_rate(dec!(-100), RateConvention::EffectiveAer).unwrap_err();
        assert!(matches!(err, FinplanError::InvalidInput { .. }));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
    }

    #[test]
    fn test_annuity_payment_standard_loan() {
        // 10_000 at 0.5%/month over 60 months ≈ 193.33/month
        let pmt = annuity_payment(dec!(10000), dec!(0.005), 60);
        assert!((pmt - dec!(193.33)).abs() < dec!(0.01));
    }
}
