//! Legacy Crédito plan: French amortization plus a flat per-period guarantee of 2% of the
//! schedule's base, with four mutually exclusive branches (plain, inicial mayor and the
//! two retanqueo variants).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::amortization::{annuity_factor, build_schedule, AmortizationSchedule, FeeSchedule, ScheduleInput};
use crate::config::{PlanConfiguration, PlanType, RateMode};
use crate::error::QuoteError;
use crate::prices::{PriceField, PriceFields};
use crate::quote::{BranchMetadata, CreditoOption, QuoteResult};
use crate::rounding::{round_up_to_1000, STEP_THOUSAND};
use crate::search::{search_base, SearchRange};
use crate::types::{percent_to_rate, Money, Rate};
use crate::QuoteEngineResult;

/// Lowest financing base the refinance search will consider.
const MIN_SEARCH_BASE: Decimal = dec!(1_000_000);
const SEARCH_LOWER_RATIO: Decimal = dec!(0.5);
const SEARCH_UPPER_RATIO: Decimal = dec!(1.5);

pub fn quote_credito(
    prices: &PriceFields,
    term_months: u32,
    option: &CreditoOption,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    config.check_term(PlanType::Credito, term_months)?;
    let base_price = prices.resolve(PriceField::CreditBase)?.amount;

    tracing::debug!(%base_price, term_months, ?option, "credito branch selected");

    match *option {
        CreditoOption::Plain => plain(base_price, term_months, config),
        CreditoOption::LargerDownPayment {
            target_down_payment,
        } => larger_down_payment(base_price, term_months, target_down_payment, config),
        CreditoOption::RefinanceOtherLender {
            outstanding_balance,
        } => refinance_other_lender(base_price, term_months, outstanding_balance, config),
        CreditoOption::RefinanceSameLender {
            outstanding_balance,
        } => refinance_same_lender(base_price, term_months, outstanding_balance, config),
    }
}

fn guarantee_for(base: Money, config: &PlanConfiguration) -> Money {
    base * percent_to_rate(config.legacy_guarantee_percent)
}

fn legacy_schedule(
    financed_amount: Money,
    guarantee_fee: Money,
    term_months: u32,
    periodic_rate: Rate,
) -> QuoteEngineResult<AmortizationSchedule> {
    build_schedule(&ScheduleInput {
        financed_amount,
        term_months,
        periodic_rate,
        fees: FeeSchedule::guarantee_only(guarantee_fee),
    })
}

fn financed_quote(
    base_price: Money,
    initial_payment: Money,
    financed_amount: Money,
    term_months: u32,
    monthly_payment: Money,
    schedule: AmortizationSchedule,
    branch: BranchMetadata,
) -> QuoteResult {
    QuoteResult {
        plan: PlanType::Credito,
        base_price,
        total_price: initial_payment + monthly_payment * Decimal::from(term_months),
        initial_payment,
        financed_amount,
        term_months,
        monthly_payment,
        schedule: schedule.rows,
        branch,
    }
}

/// Rounded first-period installment of the plain branch.
fn plain_rounded_payment(
    base_price: Money,
    term_months: u32,
    config: &PlanConfiguration,
) -> QuoteEngineResult<(Money, AmortizationSchedule)> {
    let schedule = legacy_schedule(
        base_price,
        guarantee_for(base_price, config),
        term_months,
        config.periodic_rate(RateMode::Monthly),
    )?;
    Ok((round_up_to_1000(schedule.first_period_total), schedule))
}

fn plain(
    base_price: Money,
    term_months: u32,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    let (monthly_payment, schedule) = plain_rounded_payment(base_price, term_months, config)?;
    Ok(financed_quote(
        base_price,
        Decimal::ZERO,
        base_price,
        term_months,
        monthly_payment,
        schedule,
        BranchMetadata::CreditoPlain {
            guarantee_fee: guarantee_for(base_price, config),
        },
    ))
}

/// Inicial mayor. The installment is reported unrounded in this branch only; quotes
/// already persisted carry that value.
fn larger_down_payment(
    base_price: Money,
    term_months: u32,
    target_down_payment: Money,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    let (rounded_plain, _) = plain_rounded_payment(base_price, term_months, config)?;
    if target_down_payment < rounded_plain {
        return Err(QuoteError::InsufficientDownPayment {
            supplied: target_down_payment,
            minimum: rounded_plain,
        });
    }

    let excess = target_down_payment - rounded_plain;
    let financed_amount = base_price - excess;
    if financed_amount <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "target_down_payment".into(),
            reason: format!("leaves nothing to finance on a base of {base_price}"),
        });
    }

    // The guarantee stays on the original base.
    let guarantee_fee = guarantee_for(base_price, config);
    let schedule = legacy_schedule(
        financed_amount,
        guarantee_fee,
        term_months,
        config.periodic_rate(RateMode::Monthly),
    )?;
    let monthly_payment = schedule.first_period_total;

    Ok(financed_quote(
        base_price,
        target_down_payment,
        financed_amount,
        term_months,
        monthly_payment,
        schedule,
        BranchMetadata::CreditoLargerDownPayment {
            plain_rounded_payment: rounded_plain,
            excess,
            guarantee_fee,
        },
    ))
}

/// Retanqueo EdC a FS: find the base whose installment absorbs the other lender's balance.
fn refinance_other_lender(
    base_price: Money,
    term_months: u32,
    outstanding_balance: Money,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    require_positive_balance(outstanding_balance)?;

    let (current_rounded_payment, _) = plain_rounded_payment(base_price, term_months, config)?;
    let n = Decimal::from(term_months);
    let target_total = current_rounded_payment * n + outstanding_balance;
    let target_payment = round_up_to_1000(target_total / n);

    let rate = config.periodic_rate(RateMode::Monthly);
    let factor = annuity_factor(rate, term_months)?;
    let guarantee_rate = percent_to_rate(config.legacy_guarantee_percent);
    let range = SearchRange {
        lower: MIN_SEARCH_BASE.max(target_total * SEARCH_LOWER_RATIO),
        upper: target_total * SEARCH_UPPER_RATIO,
        step: STEP_THOUSAND,
    };
    tracing::debug!(%target_total, %target_payment, "searching refinance base");

    let outcome = search_base(target_payment, range, |candidate| {
        Ok(candidate * factor + candidate * guarantee_rate)
    })?;

    let financed_amount = outcome.financed_amount;
    let schedule = legacy_schedule(
        financed_amount,
        guarantee_for(financed_amount, config),
        term_months,
        rate,
    )?;
    let monthly_payment = round_up_to_1000(schedule.first_period_total);

    Ok(financed_quote(
        base_price,
        Decimal::ZERO,
        financed_amount,
        term_months,
        monthly_payment,
        schedule,
        BranchMetadata::CreditoRefinanceOtherLender {
            outstanding_balance,
            current_rounded_payment,
            target_total,
            target_payment,
            candidates_evaluated: outcome.candidates_evaluated,
        },
    ))
}

/// Retanqueo FS a FS: the balance is added to the base and financed at the refinance rate.
fn refinance_same_lender(
    base_price: Money,
    term_months: u32,
    outstanding_balance: Money,
    config: &PlanConfiguration,
) -> QuoteEngineResult<QuoteResult> {
    require_positive_balance(outstanding_balance)?;

    let financed_amount = base_price + outstanding_balance;
    let schedule = legacy_schedule(
        financed_amount,
        guarantee_for(financed_amount, config),
        term_months,
        config.periodic_rate(RateMode::Refinance),
    )?;
    let monthly_payment = round_up_to_1000(schedule.first_period_total);

    Ok(financed_quote(
        base_price,
        Decimal::ZERO,
        financed_amount,
        term_months,
        monthly_payment,
        schedule,
        BranchMetadata::CreditoRefinanceSameLender {
            outstanding_balance,
            refinance_rate: config.refinance_interest_rate,
        },
    ))
}

fn require_positive_balance(outstanding_balance: Money) -> QuoteEngineResult<()> {
    if outstanding_balance <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "outstanding_balance".into(),
            reason: "refinancing requires a positive outstanding balance".into(),
        });
    }
    Ok(())
}
