//! CrediContado: the unpaid balance carries a flat 5% surcharge per installment and is
//! divided evenly. No amortization schedule.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::{PlanConfiguration, PlanType};
use crate::error::QuoteError;
use crate::prices::{PriceField, PriceFields};
use crate::quote::{BranchMetadata, QuoteResult};
use crate::types::Money;
use crate::QuoteEngineResult;

/// Surcharge added per installment, not compounded.
pub const SURCHARGE_PER_INSTALLMENT: Decimal = dec!(0.05);

pub fn quote_credicontado(
    prices: &PriceFields,
    term_months: u32,
    initial_payment: Option<Money>,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    config.check_term(PlanType::CrediContado, term_months)?;
    let base_price = prices.resolve(PriceField::CrediContado)?.amount;

    let initial_payment = initial_payment.unwrap_or_default().max(Decimal::ZERO);
    let remaining_balance = base_price - initial_payment;
    if remaining_balance <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "initial_payment".into(),
            reason: format!("must be below the credicontado price of {base_price}"),
        });
    }

    let surcharge_factor = Decimal::ONE + Decimal::from(term_months) * SURCHARGE_PER_INSTALLMENT;
    let total_price = remaining_balance * surcharge_factor;
    let monthly_payment = total_price / Decimal::from(term_months);

    Ok(QuoteResult {
        plan: PlanType::CrediContado,
        base_price,
        total_price,
        initial_payment,
        financed_amount: remaining_balance,
        term_months,
        monthly_payment,
        schedule: Vec::new(),
        branch: BranchMetadata::CrediContado {
            remaining_balance,
            surcharge_factor,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices() -> PriceFields {
        PriceFields {
            credicontado: dec!(2_800_000),
            ..PriceFields::default()
        }
    }

    #[test]
    fn test_five_installments() {
        let config = PlanConfiguration::default();
        let quote = quote_credicontado(&prices(), 5, Some(dec!(200_000)), &config).unwrap();
        assert_eq!(quote.financed_amount, dec!(2_600_000));
        assert_eq!(quote.total_price, dec!(3_250_000));
        assert_eq!(quote.monthly_payment, dec!(650_000));
        assert_eq!(
            quote.branch,
            BranchMetadata::CrediContado {
                remaining_balance: dec!(2_600_000),
                surcharge_factor: dec!(1.25),
            }
        );
    }

    #[test]
    fn test_negative_initial_payment_is_clamped() {
        let config = PlanConfiguration::default();
        let quote = quote_credicontado(&prices(), 2, Some(dec!(-50_000)), &config).unwrap();
        assert_eq!(quote.initial_payment, Decimal::ZERO);
        // 2.8M * 1.10 = 3.08M over 2
        assert_eq!(quote.monthly_payment, dec!(1_540_000));
    }

    #[test]
    fn test_zero_term_is_invalid() {
        let config = PlanConfiguration::default();
        let err = quote_credicontado(&prices(), 0, None, &config).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidTerm { .. }));
    }

    #[test]
    fn test_initial_payment_covering_price_is_rejected() {
        let config = PlanConfiguration::default();
        let err = quote_credicontado(&prices(), 3, Some(dec!(2_800_000)), &config).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));
    }
}
