use cotizador_core::config::{
    ClientTier, DiscountRange, PlanConfiguration, RateMode, TierCoefficients,
};
use cotizador_core::prices::PriceFields;
use cotizador_core::quote::{
    BranchMetadata, CashPriceList, CreditoFlags, CreditoOption, LargerDownPayment,
};
use cotizador_core::rounding::round_up_to_1000;
use cotizador_core::{calculate_quote, PlanRequest, PriceQuoteInputs, QuoteError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fs_config() -> PlanConfiguration {
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
    config
}

fn credito_config() -> PlanConfiguration {
    PlanConfiguration {
        monthly_interest_rate: dec!(1.87),
        ..PlanConfiguration::default()
    }
}

// ===========================================================================
// Single-payment plans
// ===========================================================================

#[test]
fn test_cash_list_1_scenario() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            cash_list_1: dec!(3_500_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Cash {
            price_list: CashPriceList::List1,
        },
    };
    let output = calculate_quote(&inputs, Some(&PlanConfiguration::default())).unwrap();
    let quote = &output.result;
    assert_eq!(quote.total_price, dec!(3_500_000));
    assert_eq!(quote.monthly_payment, dec!(3_500_000));
    assert!(quote.schedule.is_empty());
    assert!(output.warnings.is_empty());
}

#[test]
fn test_credicontado_scenario() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credicontado: dec!(2_800_000),
            ..PriceFields::default()
        },
        request: PlanRequest::CrediContado {
            term_months: 5,
            initial_payment: Some(dec!(200_000)),
        },
    };
    let quote = calculate_quote(&inputs, Some(&PlanConfiguration::default()))
        .unwrap()
        .result;
    assert_eq!(quote.financed_amount, dec!(2_600_000));
    assert_eq!(quote.total_price, dec!(3_250_000));
    assert_eq!(quote.monthly_payment, dec!(650_000));
}

// ===========================================================================
// Legacy Crédito
// ===========================================================================

#[test]
fn test_credito_plain_scenario() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(5_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Credito {
            term_months: 12,
            option: CreditoOption::Plain,
        },
    };
    let quote = calculate_quote(&inputs, Some(&credito_config())).unwrap().result;

    let first = &quote.schedule[0];
    let expected = round_up_to_1000(first.principal + first.interest + dec!(100_000));
    assert_eq!(quote.monthly_payment, expected);
    assert_eq!(quote.monthly_payment, dec!(570_000));
    assert_eq!(quote.schedule.len(), 12);

    let principal: Decimal = quote.schedule.iter().map(|r| r.principal).sum();
    assert!((principal - dec!(5_000_000)).abs() < dec!(12));
    let last = quote.schedule.last().unwrap();
    assert!((last.opening_balance - last.principal).abs() < dec!(12));
}

#[test]
fn test_credito_flags_select_refinance_search() {
    let flags = CreditoFlags {
        larger_down_payment: true,
        larger_down_payment_amount: dec!(1_000_000),
        refinance_other_lender: true,
        other_lender_balance: dec!(1_500_000),
        ..CreditoFlags::default()
    };
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(5_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Credito {
            term_months: 12,
            option: CreditoOption::from_flags(&flags),
        },
    };
    let quote = calculate_quote(&inputs, Some(&credito_config())).unwrap().result;

    assert_eq!(quote.financed_amount % dec!(1000), Decimal::ZERO);
    let target = match quote.branch {
        BranchMetadata::CreditoRefinanceOtherLender { target_payment, .. } => target_payment,
        ref other => panic!("unexpected branch {other:?}"),
    };
    assert!(quote.monthly_payment >= target);
    assert_eq!(quote.monthly_payment, target);
}

#[test]
fn test_credito_default_configuration_restricts_terms() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(5_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Credito {
            term_months: 12,
            option: CreditoOption::Plain,
        },
    };
    let err = calculate_quote(&inputs, None).unwrap_err();
    assert!(matches!(err, QuoteError::InvalidTerm { .. }));
}

#[test]
fn test_credito_overflowing_term_returns_error() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(5_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Credito {
            term_months: 3000,
            option: CreditoOption::Plain,
        },
    };
    // Empty allowed_terms accepts the term; the annuity power no longer fits a Decimal
    let config = PlanConfiguration::default();
    let err = calculate_quote(&inputs, Some(&config)).unwrap_err();
    assert!(matches!(
        err,
        QuoteError::InvalidInput { ref field, .. } if field == "term_months"
    ));
}

// ===========================================================================
// Crédito FS
// ===========================================================================

#[test]
fn test_credito_fs_short_term_scenario() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(4_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::CreditoFsShort {
            term_months: 6,
            client_tier: ClientTier::B,
            total_initial_payment: dec!(1_200_000),
        },
    };
    let quote = calculate_quote(&inputs, Some(&fs_config())).unwrap().result;
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
            assert_eq!(down_payment + fs_fee, dec!(1_200_000));
            assert_eq!(down_payment % dec!(10), Decimal::ZERO);
        }
        other => panic!("unexpected branch {other:?}"),
    }
}

#[test]
fn test_credito_fs_long_term_larger_down_payment_split() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(4_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::CreditoFsLong {
            term_months: 15,
            client_tier: ClientTier::B,
            larger_down_payment: Some(LargerDownPayment {
                total_initial_payment: dec!(1_234_567),
                rate_mode: RateMode::Monthly,
            }),
        },
    };
    let quote = calculate_quote(&inputs, Some(&fs_config())).unwrap().result;
    match quote.branch {
        BranchMetadata::CreditoFsLong {
            fs_fee,
            down_payment: Some(down_payment),
            ..
        } => {
            assert_eq!(down_payment + fs_fee, dec!(1_234_567));
            assert_eq!(quote.financed_amount, dec!(4_000_000) - down_payment);
        }
        other => panic!("unexpected branch {other:?}"),
    }
    assert_eq!(quote.schedule.len(), 15);
}

#[test]
fn test_credito_fs_without_configuration_is_rejected() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(4_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::CreditoFsLong {
            term_months: 12,
            client_tier: ClientTier::A,
            larger_down_payment: None,
        },
    };
    let err = calculate_quote(&inputs, None).unwrap_err();
    assert!(matches!(err, QuoteError::NoActiveConfiguration { .. }));
}

// ===========================================================================
// Cross-cutting properties
// ===========================================================================

#[test]
fn test_repeated_calculation_is_identical() {
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            credit_base: dec!(4_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::CreditoFsShort {
            term_months: 4,
            client_tier: ClientTier::B,
            total_initial_payment: dec!(1_900_000),
        },
    };
    let config = fs_config();
    let first = calculate_quote(&inputs, Some(&config)).unwrap();
    let second = calculate_quote(&inputs, Some(&config)).unwrap();
    assert_eq!(first.result, second.result);
    assert_eq!(
        serde_json::to_string(&first.result).unwrap(),
        serde_json::to_string(&second.result).unwrap()
    );
}

#[test]
fn test_invalid_configuration_fails_fast() {
    let config = PlanConfiguration {
        monthly_interest_rate: dec!(-1),
        ..PlanConfiguration::default()
    };
    let inputs = PriceQuoteInputs {
        prices: PriceFields {
            cash_list_1: dec!(1_000_000),
            ..PriceFields::default()
        },
        request: PlanRequest::Cash {
            price_list: CashPriceList::List1,
        },
    };
    assert!(matches!(
        calculate_quote(&inputs, Some(&config)),
        Err(QuoteError::InvalidInput { .. })
    ));
}
