//! Contado and Convenio: no financing, the selected price is paid in a single installment.

use rust_decimal::Decimal;

use crate::config::PlanType;
use crate::prices::{PriceField, PriceFields, ResolvedPrice};
use crate::quote::{BranchMetadata, CashPriceList, QuoteResult};
use crate::QuoteEngineResult;

pub fn quote_cash(prices: &PriceFields, list: CashPriceList) -> QuoteEngineResult<QuoteResult> {
    let price = prices.resolve(list.price_field())?;
    Ok(single_payment(
        PlanType::Cash,
        price,
        BranchMetadata::Cash {
            price_field: price.field,
            used_fallback: price.used_fallback,
        },
    ))
}

/// Convenio price, or cash list 1 when the product has no negotiated price.
pub fn quote_convenio(prices: &PriceFields) -> QuoteEngineResult<QuoteResult> {
    let price = prices.resolve(PriceField::Convenio)?;
    Ok(single_payment(
        PlanType::Convenio,
        price,
        BranchMetadata::Convenio {
            price_field: price.field,
            used_fallback: price.used_fallback,
        },
    ))
}

fn single_payment(plan: PlanType, price: ResolvedPrice, branch: BranchMetadata) -> QuoteResult {
    QuoteResult {
        plan,
        base_price: price.amount,
        total_price: price.amount,
        initial_payment: Decimal::ZERO,
        financed_amount: Decimal::ZERO,
        term_months: 1,
        monthly_payment: price.amount,
        schedule: Vec::new(),
        branch,
    }
}
