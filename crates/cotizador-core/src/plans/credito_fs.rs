//! Crédito FS ("new model").
//!
//! Short term (3 to 6 months) discounts the base by the tier matching the client's
//! initial payment and splits that payment into down payment and FS fee. Long term
//! (9 to 18 months) finances the full base unless the client elects a larger down
//! payment, in which case the same split reduces the base.

use std::ops::RangeInclusive;

use rust_decimal::Decimal;

use crate::amortization::{build_schedule, AmortizationSchedule, FeeSchedule, ScheduleInput};
use crate::config::{ClientTier, PlanConfiguration, PlanType, RateMode, TierCoefficients};
use crate::discount::{initial_percent, lookup_discount};
use crate::error::QuoteError;
use crate::prices::{PriceField, PriceFields};
use crate::quote::{BranchMetadata, LargerDownPayment, QuoteResult};
use crate::rounding::{round_up_to_1000, round_up_to_tens};
use crate::types::{percent_to_rate, Money, Rate};
use crate::QuoteEngineResult;

pub const SHORT_TERM_MONTHS: RangeInclusive<u32> = 3..=6;
pub const LONG_TERM_MONTHS: RangeInclusive<u32> = 9..=18;

/// Down payment and FS fee making up a client's total initial payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialPaymentSplit {
    pub down_payment: Money,
    pub fs_fee: Money,
}

/// Solves `down = (total − reference·ci) / (1 − ci)`, rounded up to tens; the FS fee is
/// whatever remains so both parts always add up to `total_initial_payment`.
pub fn split_initial_payment(
    total_initial_payment: Money,
    reference_base: Money,
    ci: Rate,
) -> QuoteEngineResult<InitialPaymentSplit> {
    if ci.is_zero() {
        return Ok(InitialPaymentSplit {
            down_payment: total_initial_payment,
            fs_fee: Decimal::ZERO,
        });
    }
    if ci < Decimal::ZERO || ci >= Decimal::ONE {
        return Err(QuoteError::InvalidInput {
            field: "down_payment_percent".into(),
            reason: "C.I. must be in [0, 100)".into(),
        });
    }

    let minimum = reference_base * ci;
    if total_initial_payment < minimum {
        return Err(QuoteError::InsufficientDownPayment {
            supplied: total_initial_payment,
            minimum,
        });
    }

    let raw = (total_initial_payment - minimum) / (Decimal::ONE - ci);
    let down_payment = round_up_to_tens(raw);
    Ok(InitialPaymentSplit {
        down_payment,
        fs_fee: total_initial_payment - down_payment,
    })
}

fn check_term(range: &RangeInclusive<u32>, term_months: u32, label: &str) -> QuoteEngineResult<()> {
    if range.contains(&term_months) {
        return Ok(());
    }
    Err(QuoteError::InvalidTerm {
        plan: format!("{} {label}", PlanType::CreditoFs),
        term_months,
        allowed: format!("{} to {}", range.start(), range.end()),
    })
}

fn fs_schedule(
    financed_amount: Money,
    term_months: u32,
    rate_mode: RateMode,
    coefficients: TierCoefficients,
    config: &PlanConfiguration,
) -> QuoteEngineResult<AmortizationSchedule> {
    build_schedule(&ScheduleInput {
        financed_amount,
        term_months,
        periodic_rate: config.periodic_rate(rate_mode),
        fees: FeeSchedule::full_stack(config, coefficients.guarantee_fee_percent),
    })
}

fn require_tier_table(config: &PlanConfiguration, tier: ClientTier) -> QuoteEngineResult<TierCoefficients> {
    if config.client_tiers.is_empty() {
        return Err(QuoteError::NoActiveConfiguration {
            plan: PlanType::CreditoFs.to_string(),
            reason: "the client tier table is empty".into(),
        });
    }
    config.tier(tier)
}

pub fn quote_short_term(
    prices: &PriceFields,
    term_months: u32,
    client_tier: ClientTier,
    total_initial_payment: Money,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    check_term(&SHORT_TERM_MONTHS, term_months, "corto plazo")?;
    if total_initial_payment <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "total_initial_payment".into(),
            reason: "short-term Crédito FS requires a positive initial payment".into(),
        });
    }
    let coefficients = require_tier_table(config, client_tier)?;
    let base_price = prices.resolve(PriceField::CreditBase)?.amount;

    let percent = initial_percent(total_initial_payment, base_price)?;
    let tier = lookup_discount(percent, &config.discount_ranges)?;
    let discounted_base = base_price * (Decimal::ONE - percent_to_rate(tier.discount_percent()));
    tracing::debug!(
        initial_percent = %percent,
        discount = %tier.discount_percent(),
        %discounted_base,
        "short-term discount tier"
    );

    // InsufficientDownPayment is reserved for the inicial mayor elections.
    let split = split_initial_payment(
        total_initial_payment,
        discounted_base,
        percent_to_rate(coefficients.down_payment_percent),
    )
    .map_err(|e| match e {
        QuoteError::InsufficientDownPayment { minimum, .. } => QuoteError::InvalidInput {
            field: "total_initial_payment".into(),
            reason: format!("below the tier's C.I. share of {minimum} on the discounted base"),
        },
        other => other,
    })?;
    let financed_amount = discounted_base - split.down_payment;
    if financed_amount <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "total_initial_payment".into(),
            reason: format!("covers the discounted base of {discounted_base}"),
        });
    }

    let schedule = fs_schedule(
        financed_amount,
        term_months,
        RateMode::Monthly,
        coefficients,
        config,
    )?;
    let monthly_payment = round_up_to_1000(schedule.first_period_total);

    Ok(QuoteResult {
        plan: PlanType::CreditoFs,
        base_price,
        total_price: total_initial_payment + monthly_payment * Decimal::from(term_months),
        initial_payment: total_initial_payment,
        financed_amount,
        term_months,
        monthly_payment,
        schedule: schedule.rows,
        branch: BranchMetadata::CreditoFsShort {
            client_tier,
            ci_percent: coefficients.down_payment_percent,
            fga_percent: coefficients.guarantee_fee_percent,
            initial_percent: percent,
            discount_percent: tier.discount_percent(),
            discounted_base,
            down_payment: split.down_payment,
            fs_fee: split.fs_fee,
        },
    })
}

pub fn quote_long_term(
    prices: &PriceFields,
    term_months: u32,
    client_tier: ClientTier,
    larger_down_payment: Option<&LargerDownPayment>,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    check_term(&LONG_TERM_MONTHS, term_months, "largo plazo")?;
    let coefficients = require_tier_table(config, client_tier)?;
    let base_price = prices.resolve(PriceField::CreditBase)?.amount;
    let ci = percent_to_rate(coefficients.down_payment_percent);
    let fs_fee_at_base = base_price * ci;

    let (initial_payment, financed_amount, split, rate_mode) = match larger_down_payment {
        None => (Decimal::ZERO, base_price, None, RateMode::Monthly),
        Some(election) => {
            let total = election.total_initial_payment;
            if total <= Decimal::ZERO {
                return Err(QuoteError::InvalidInput {
                    field: "total_initial_payment".into(),
                    reason: "a larger down payment must be positive".into(),
                });
            }
            if total < fs_fee_at_base {
                return Err(QuoteError::InsufficientDownPayment {
                    supplied: total,
                    minimum: fs_fee_at_base,
                });
            }
            let split = split_initial_payment(total, base_price, ci)?;
            let new_base = base_price - split.down_payment;
            if new_base <= Decimal::ZERO {
                return Err(QuoteError::InvalidInput {
                    field: "total_initial_payment".into(),
                    reason: format!("covers the base price of {base_price}"),
                });
            }
            (total, new_base, Some(split), election.rate_mode)
        }
    };

    let schedule = fs_schedule(financed_amount, term_months, rate_mode, coefficients, config)?;
    let monthly_payment = round_up_to_1000(schedule.first_period_total);

    let branch = BranchMetadata::CreditoFsLong {
        client_tier,
        ci_percent: coefficients.down_payment_percent,
        fga_percent: coefficients.guarantee_fee_percent,
        fs_fee: split.map_or(fs_fee_at_base, |s| s.fs_fee),
        fs_fee_collected: split.is_some(),
        down_payment: split.map(|s| s.down_payment),
        rate_mode,
    };

    Ok(QuoteResult {
        plan: PlanType::CreditoFs,
        base_price,
        total_price: initial_payment + monthly_payment * Decimal::from(term_months),
        initial_payment,
        financed_amount,
        term_months,
        monthly_payment,
        schedule: schedule.rows,
        branch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscountRange;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn config() -> PlanConfiguration {
        let mut config = PlanConfiguration {
            discount_ranges: vec![
                DiscountRange {
                    min_percent: dec!(45),
                    max_percent: dec!(64.999),
                    discount_percent: dec!(17),
                },
                DiscountRange {
                    min_percent: dec!(24.999),
                    max_percent: dec!(44.999),
                    discount_percent: dec!(15),
                },
            ],
            ..PlanConfiguration::default()
        };
        config.client_tiers.insert(
            ClientTier::B,
            TierCoefficients {
                down_payment_percent: dec!(10),
                guarantee_fee_percent: dec!(1.5),
            },
        );
        config.client_tiers.insert(
            ClientTier::AAA,
            TierCoefficients {
                down_payment_percent: dec!(0),
                guarantee_fee_percent: dec!(0.5),
            },
        );
        config
    }

    fn prices() -> PriceFields {
        PriceFields {
            credit_base: dec!(4_000_000),
            ..PriceFields::default()
        }
    }

    #[test]
    fn test_short_term_discount_and_split() {
        let quote = quote_short_term(&prices(), 6, ClientTier::B, dec!(1_200_000), &config()).unwrap();
        match quote.branch {
            BranchMetadata::CreditoFsShort {
                initial_percent,
                discount_percent,
                discounted_base,
                down_payment,
                fs_fee,
                ..
            } => {
                assert_eq!(initial_percent, dec!(30));
                assert_eq!(discount_percent, dec!(15));
                assert_eq!(discounted_base, dec!(3_400_000));
                assert_eq!(down_payment, dec!(955_560));
                assert_eq!(fs_fee, dec!(244_440));
                assert_eq!(down_payment + fs_fee, dec!(1_200_000));
            }
            other => panic!("unexpected branch {other:?}"),
        }
        assert_eq!(quote.financed_amount, dec!(2_444_440));
        assert_eq!(quote.monthly_payment, dec!(519_000));
        assert_eq!(quote.schedule.len(), 6);
    }

    #[test]
    fn test_short_term_rejects_long_terms() {
        let err = quote_short_term(&prices(), 9, ClientTier::B, dec!(1_200_000), &config()).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidTerm { term_months: 9, .. }));
    }

    #[test]
    fn test_short_term_payment_below_ci_share_is_invalid_input() {
        let mut config = config();
        config.client_tiers.insert(
            ClientTier::BB,
            TierCoefficients {
                down_payment_percent: dec!(40),
                guarantee_fee_percent: dec!(1.5),
            },
        );
        // 25% initial selects the 15% tier; 40% of 3,400,000 is 1,360,000
        let err = quote_short_term(&prices(), 4, ClientTier::BB, dec!(1_000_000), &config).unwrap_err();
        assert!(matches!(
            err,
            QuoteError::InvalidInput { ref field, .. } if field == "total_initial_payment"
        ));
    }

    #[test]
    fn test_short_term_requires_initial_payment() {
        let err = quote_short_term(&prices(), 4, ClientTier::B, Decimal::ZERO, &config()).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));
    }

    #[test]
    fn test_short_term_distinct_discount_errors() {
        let low = quote_short_term(&prices(), 4, ClientTier::B, dec!(400_000), &config()).unwrap_err();
        assert!(matches!(low, QuoteError::DiscountTooLow { .. }));
        let high = quote_short_term(&prices(), 4, ClientTier::B, dec!(3_000_000), &config()).unwrap_err();
        assert!(matches!(high, QuoteError::DiscountTooHigh { .. }));
    }

    #[test]
    fn test_short_term_unknown_tier() {
        let err = quote_short_term(&prices(), 4, ClientTier::BB, dec!(1_200_000), &config()).unwrap_err();
        assert!(matches!(err, QuoteError::UnknownClientTier(_)));
    }

    #[test]
    fn test_short_term_without_tier_table_needs_configuration() {
        let err = quote_short_term(
            &prices(),
            4,
            ClientTier::B,
            dec!(1_200_000),
            &PlanConfiguration::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::NoActiveConfiguration { .. }));
    }

    #[test]
    fn test_long_term_finances_full_base() {
        let quote = quote_long_term(&prices(), 12, ClientTier::B, None, &config()).unwrap();
        assert_eq!(quote.financed_amount, dec!(4_000_000));
        assert_eq!(quote.initial_payment, Decimal::ZERO);
        assert_eq!(quote.monthly_payment, dec!(483_000));
        assert_eq!(
            quote.branch,
            BranchMetadata::CreditoFsLong {
                client_tier: ClientTier::B,
                ci_percent: dec!(10),
                fga_percent: dec!(1.5),
                fs_fee: dec!(400_000),
                fs_fee_collected: false,
                down_payment: None,
                rate_mode: RateMode::Monthly,
            }
        );
    }

    #[test]
    fn test_long_term_larger_down_payment_at_refinance_rate() {
        let election = LargerDownPayment {
            total_initial_payment: dec!(1_000_000),
            rate_mode: RateMode::Refinance,
        };
        let quote = quote_long_term(&prices(), 12, ClientTier::B, Some(&election), &config()).unwrap();
        assert_eq!(quote.financed_amount, dec!(3_333_330));
        assert_eq!(quote.monthly_payment, dec!(385_000));
        assert!(matches!(
            quote.branch,
            BranchMetadata::CreditoFsLong { fs_fee, down_payment: Some(down), fs_fee_collected: true, .. }
                if fs_fee == dec!(333_330) && down == dec!(666_670)
        ));
    }

    #[test]
    fn test_long_term_larger_down_payment_below_fs_fee() {
        let election = LargerDownPayment {
            total_initial_payment: dec!(399_999),
            rate_mode: RateMode::Monthly,
        };
        let err = quote_long_term(&prices(), 12, ClientTier::B, Some(&election), &config()).unwrap_err();
        assert!(matches!(
            err,
            QuoteError::InsufficientDownPayment { minimum, .. } if minimum == dec!(400_000)
        ));
    }

    #[test]
    fn test_long_term_zero_ci_takes_whole_payment_as_down_payment() {
        let election = LargerDownPayment {
            total_initial_payment: dec!(500_000),
            rate_mode: RateMode::Monthly,
        };
        let quote = quote_long_term(&prices(), 18, ClientTier::AAA, Some(&election), &config()).unwrap();
        assert_eq!(quote.financed_amount, dec!(3_500_000));
        assert!(matches!(
            quote.branch,
            BranchMetadata::CreditoFsLong { fs_fee, .. } if fs_fee.is_zero()
        ));
    }

    #[test]
    fn test_long_term_rejects_short_terms() {
        let err = quote_long_term(&prices(), 6, ClientTier::B, None, &config()).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidTerm { .. }));
    }

    proptest! {
        #[test]
        fn prop_split_sums_exactly(
            base in 1_000_000i64..20_000_000i64,
            ci_pct in 0u32..30u32,
            extra in 0i64..5_000_000i64,
        ) {
            let base = Decimal::from(base);
            let ci = Decimal::from(ci_pct) / dec!(100);
            let total = base * ci + Decimal::from(extra);
            let split = split_initial_payment(total, base, ci).unwrap();
            prop_assert_eq!(split.down_payment + split.fs_fee, total);
            prop_assert!((split.down_payment % dec!(10)).is_zero() || ci.is_zero());
        }
    }
}
