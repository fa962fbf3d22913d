//! Discount-tier lookup for the Crédito FS short-term plan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{sort_discount_ranges, DiscountRange};
use crate::error::QuoteError;
use crate::types::{Money, Percent};
use crate::QuoteEngineResult;

/// The tier selected for an initial payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub initial_percent: Percent,
    pub range: DiscountRange,
}

impl DiscountTier {
    pub fn discount_percent(&self) -> Percent {
        self.range.discount_percent
    }
}

/// Initial payment as a percent of the base price.
pub fn initial_percent(total_initial_payment: Money, base_price: Money) -> QuoteEngineResult<Percent> {
    if base_price <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "base_price".into(),
            reason: "must be positive to compute an initial percent".into(),
        });
    }
    Ok(total_initial_payment / base_price * Decimal::ONE_HUNDRED)
}

/// Returns the first range, in ascending `min_percent` order, containing the percent.
///
/// Boundaries are inclusive on both ends. A percent above every range is
/// `DiscountTooHigh`; anything else that matches no range (below the lowest tier or in a
/// gap between tiers) is `DiscountTooLow`, reporting the next tier's minimum.
pub fn lookup_discount(
    initial_percent: Percent,
    ranges: &[DiscountRange],
) -> QuoteEngineResult<DiscountTier> {
    let ordered = sort_discount_ranges(ranges);

    if let Some(range) = ordered.iter().find(|r| r.contains(initial_percent)) {
        return Ok(DiscountTier {
            initial_percent,
            range: *range,
        });
    }

    let highest = ordered.iter().map(|r| r.max_percent).max();
    match highest {
        None => Err(QuoteError::NoActiveConfiguration {
            plan: "credito_fs".into(),
            reason: "the discount range table is empty".into(),
        }),
        Some(max) if initial_percent > max => Err(QuoteError::DiscountTooHigh {
            initial_percent,
            maximum_percent: max,
        }),
        Some(_) => {
            let next_min = ordered
                .iter()
                .map(|r| r.min_percent)
                .find(|min| *min > initial_percent)
                .unwrap_or(initial_percent);
            Err(QuoteError::DiscountTooLow {
                initial_percent,
                minimum_percent: next_min,
            })
        }
    }
}
