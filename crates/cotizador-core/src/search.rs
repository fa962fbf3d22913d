//! Linear scan for the financing base that reaches a target installment.
//!
//! Used by the Crédito refinance-from-another-lender branch. The scan walks candidate
//! bases upward in fixed steps and never uses root-finding, so every implementation
//! lands on the same base.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::rounding::{round_to_nearest_1000, round_up_to, round_up_to_1000};
use crate::types::Money;
use crate::QuoteEngineResult;

/// Stop scanning once the exact payment is this close to the target.
pub const EARLY_EXIT_THRESHOLD: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub lower: Money,
    pub upper: Money,
    pub step: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub financed_amount: Money,
    /// Unrounded payment of the chosen base.
    pub exact_payment: Money,
    /// Payment rounded up to the next 1000.
    pub rounded_payment: Money,
    pub candidates_evaluated: u32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    base: Money,
    exact: Money,
    rounded: Money,
    diff: Money,
}

/// Finds the base whose rounded payment is the smallest value `>= target_payment`,
/// preferring the candidate whose exact payment is closest to the target.
///
/// `payment_for` maps a candidate base to its exact installment and must be
/// non-decreasing in the base.
pub fn search_base<F>(
    target_payment: Money,
    range: SearchRange,
    mut payment_for: F,
) -> QuoteEngineResult<SearchOutcome>
where
    F: FnMut(Money) -> QuoteEngineResult<Money>,
{
    if range.step <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "step".into(),
            reason: "search step must be positive".into(),
        });
    }

    let mut best: Option<Candidate> = None;
    let mut evaluated: u32 = 0;
    let mut base = round_up_to(range.lower, range.step);

    while base <= range.upper {
        let exact = payment_for(base)?;
        let rounded = round_up_to_1000(exact);
        evaluated += 1;

        if rounded >= target_payment {
            let diff = (exact - target_payment).abs();
            match best {
                Some(b) if rounded > b.rounded => break,
                Some(b) if diff >= b.diff => {}
                _ => {
                    best = Some(Candidate {
                        base,
                        exact,
                        rounded,
                        diff,
                    })
                }
            }
            if diff < EARLY_EXIT_THRESHOLD {
                break;
            }
        }

        base += range.step;
    }

    let best = best.ok_or(QuoteError::NoFeasibleBase {
        target_payment,
        lower: range.lower,
        upper: range.upper,
    })?;

    tracing::debug!(
        %target_payment,
        base = %best.base,
        exact = %best.exact,
        evaluated,
        "base search finished"
    );

    Ok(SearchOutcome {
        financed_amount: round_to_nearest_1000(best.base),
        exact_payment: best.exact,
        rounded_payment: best.rounded,
        candidates_evaluated: evaluated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::annuity_factor;
    use rust_decimal_macros::dec;

    fn range(lower: Decimal, upper: Decimal) -> SearchRange {
        SearchRange {
            lower,
            upper,
            step: dec!(1000),
        }
    }

    #[test]
    fn test_linear_payment_hits_target_exactly() {
        // payment = base / 10
        let outcome = search_base(dec!(500_000), range(dec!(1_000_000), dec!(9_000_000)), |b| {
            Ok(b / dec!(10))
        })
        .unwrap();
        assert_eq!(outcome.financed_amount, dec!(5_000_000));
        assert_eq!(outcome.rounded_payment, dec!(500_000));
    }

    #[test]
    fn test_picks_smallest_rounded_payment_when_steps_overshoot() {
        // Each 1000 of base adds 150 of payment, larger than the early-exit window.
        let outcome = search_base(dec!(30_000), range(dec!(0), dec!(1_000_000)), |b| {
            Ok(b * dec!(0.15) + dec!(20))
        })
        .unwrap();
        assert_eq!(outcome.rounded_payment, dec!(30_000));
        assert!(outcome.exact_payment <= dec!(30_000));
        assert_eq!(outcome.financed_amount % dec!(1000), Decimal::ZERO);
    }

    #[test]
    fn test_every_other_candidate_rounds_no_lower() {
        let factor = annuity_factor(dec!(0.0187), 12).unwrap();
        let target = dec!(700_000);
        let lower = dec!(1_000_000);
        let upper = dec!(12_000_000);
        let outcome = search_base(target, range(lower, upper), |b| Ok(b * factor)).unwrap();

        let mut base = lower;
        while base <= upper {
            let rounded = round_up_to_1000(base * factor);
            if rounded >= target {
                assert!(outcome.rounded_payment <= rounded);
            }
            base += dec!(1000);
        }
        assert!(outcome.rounded_payment >= target);
    }

    #[test]
    fn test_unreachable_target_is_an_error() {
        let err = search_base(dec!(10_000_000), range(dec!(1_000), dec!(50_000)), |b| Ok(b))
            .unwrap_err();
        assert!(matches!(err, QuoteError::NoFeasibleBase { .. }));
    }

    #[test]
    fn test_lower_bound_snaps_to_step() {
        let outcome = search_base(dec!(1_000), range(dec!(1_500.5), dec!(100_000)), |b| {
            Ok(b / dec!(2))
        })
        .unwrap();
        assert_eq!(outcome.financed_amount, dec!(2_000));
    }
}
