//! Upward rounding helpers used for down payments and displayed installments.
//!
//! All helpers round towards positive infinity onto a multiple of the step:
//! `round_up_to(x, step) >= x` and `round_up_to(x, step) < x + step`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

pub const STEP_TENS: Decimal = dec!(10);
pub const STEP_FIVE_HUNDRED: Decimal = dec!(500);
pub const STEP_THOUSAND: Decimal = dec!(1000);

/// `ceil(value / step) * step`. A non-positive step returns the value untouched.
pub fn round_up_to(value: Money, step: Decimal) -> Money {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).ceil() * step
}

/// Rounds up to the next multiple of 10.
pub fn round_up_to_tens(value: Money) -> Money {
    round_up_to(value, STEP_TENS)
}

/// Rounds up to the next multiple of 500.
pub fn round_up_to_500(value: Money) -> Money {
    round_up_to(value, STEP_FIVE_HUNDRED)
}

/// Rounds up to the next multiple of 1000. Installments are displayed this way.
pub fn round_up_to_1000(value: Money) -> Money {
    round_up_to(value, STEP_THOUSAND)
}

/// Rounds half-away-from-zero to the nearest multiple of 1000.
pub fn round_to_nearest_1000(value: Money) -> Money {
    (value / STEP_THOUSAND).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * STEP_THOUSAND
}
