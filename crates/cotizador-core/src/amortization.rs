//! French (level-payment) amortization schedule shared by every financed plan.
//!
//! The level payment is `P = A·r(1+r)^n / ((1+r)^n − 1)`. Each row splits it into
//! interest on the opening balance and principal, then stacks the per-period extras on
//! top: a flat administrative fee, a guarantee fee, an insurance charge proportional to
//! the level payment and a second insurance charge on the opening balance.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::PlanConfiguration;
use crate::error::QuoteError;
use crate::types::{percent_to_rate, Money, Percent, Rate};
use crate::QuoteEngineResult;

/// Insurance 2 is quoted per mille of the balance.
const PER_MILLE: Decimal = dec!(1000);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How the guarantee (FGA) charge of each period is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GuaranteeFee {
    /// Percent of the financed amount, charged every period.
    PercentOfFinanced(Percent),
    /// Fixed amount charged every period.
    FlatPerPeriod(Money),
}

/// Extras stacked on top of the level payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Percent of the financed amount, spread evenly over the term.
    pub admin_fee_percent: Percent,
    pub guarantee: GuaranteeFee,
    /// Percent of the level payment.
    pub insurance1_percent: Percent,
    /// Per mille of the opening balance.
    pub insurance2_factor: Decimal,
}

impl FeeSchedule {
    /// Only a flat guarantee charge, as the legacy Crédito plan quotes it.
    pub fn guarantee_only(flat_guarantee: Money) -> Self {
        Self {
            admin_fee_percent: Decimal::ZERO,
            guarantee: GuaranteeFee::FlatPerPeriod(flat_guarantee),
            insurance1_percent: Decimal::ZERO,
            insurance2_factor: Decimal::ZERO,
        }
    }

    /// Administrative fee, FGA on the financed amount and both insurances.
    pub fn full_stack(config: &PlanConfiguration, guarantee_fee_percent: Percent) -> Self {
        Self {
            admin_fee_percent: config.admin_fee_percent,
            guarantee: GuaranteeFee::PercentOfFinanced(guarantee_fee_percent),
            insurance1_percent: config.insurance1_percent,
            insurance2_factor: config.insurance2_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub financed_amount: Money,
    pub term_months: u32,
    pub periodic_rate: Rate,
    pub fees: FeeSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub opening_balance: Money,
    pub principal: Money,
    pub interest: Money,
    pub admin_fee: Money,
    pub guarantee_fee: Money,
    pub insurance1: Money,
    pub insurance2: Money,
    pub total_payment: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Annuity payment without extras.
    pub level_payment: Money,
    /// Total of the first row, before any display rounding.
    pub first_period_total: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    /// Balance left after the last row; zero up to rounding drift.
    pub closing_balance: Money,
    pub rows: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Annuity helpers
// ---------------------------------------------------------------------------

/// `r(1+r)^n / ((1+r)^n − 1)`, or `1/n` when the rate is zero.
pub fn annuity_factor(periodic_rate: Rate, term_months: u32) -> QuoteEngineResult<Decimal> {
    if term_months == 0 {
        return Err(QuoteError::InvalidInput {
            field: "term_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if periodic_rate < Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Rate must be non-negative".into(),
        });
    }
    if periodic_rate.is_zero() {
        return Ok(Decimal::ONE / Decimal::from(term_months));
    }

    let overflow = || QuoteError::InvalidInput {
        field: "term_months".into(),
        reason: format!("{term_months} periods at a rate of {periodic_rate} overflow decimal range"),
    };
    let growth = (Decimal::ONE + periodic_rate)
        .checked_powu(u64::from(term_months))
        .ok_or_else(overflow)?;
    periodic_rate
        .checked_mul(growth)
        .and_then(|numerator| numerator.checked_div(growth - Decimal::ONE))
        .ok_or_else(overflow)
}

/// Level payment that amortizes `financed_amount` over the term.
pub fn annuity_payment(
    financed_amount: Money,
    periodic_rate: Rate,
    term_months: u32,
) -> QuoteEngineResult<Money> {
    Ok(financed_amount * annuity_factor(periodic_rate, term_months)?)
}

// ---------------------------------------------------------------------------
// Schedule builder
// ---------------------------------------------------------------------------

pub fn build_schedule(input: &ScheduleInput) -> QuoteEngineResult<AmortizationSchedule> {
    if input.financed_amount <= Decimal::ZERO {
        return Err(QuoteError::InvalidInput {
            field: "financed_amount".into(),
            reason: "must be positive to build a schedule".into(),
        });
    }

    let n = input.term_months;
    let r = input.periodic_rate;
    let level_payment = annuity_payment(input.financed_amount, r, n)?;
    let fees = &input.fees;

    let admin_fee =
        input.financed_amount * percent_to_rate(fees.admin_fee_percent) / Decimal::from(n);
    let guarantee_fee = match fees.guarantee {
        GuaranteeFee::PercentOfFinanced(pct) => input.financed_amount * percent_to_rate(pct),
        GuaranteeFee::FlatPerPeriod(amount) => amount,
    };
    let insurance1 = level_payment * percent_to_rate(fees.insurance1_percent);

    let mut balance = input.financed_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut rows = Vec::with_capacity(n as usize);

    for month in 1..=n {
        let interest = balance * r;
        let principal = level_payment - interest;
        let insurance2 = balance * fees.insurance2_factor / PER_MILLE;
        let total_payment =
            principal + interest + admin_fee + guarantee_fee + insurance1 + insurance2;

        rows.push(AmortizationRow {
            month,
            opening_balance: balance,
            principal,
            interest,
            admin_fee,
            guarantee_fee,
            insurance1,
            insurance2,
            total_payment,
        });

        total_interest += interest;
        total_paid += total_payment;
        balance -= principal;
    }

    let first_period_total = rows
        .first()
        .map(|row| row.total_payment)
        .unwrap_or_default();

    Ok(AmortizationSchedule {
        level_payment,
        first_period_total,
        total_interest,
        total_paid,
        closing_balance: balance,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn no_fees() -> FeeSchedule {
        FeeSchedule::guarantee_only(Decimal::ZERO)
    }

    #[test]
    fn test_level_payment_known_answer() {
        // 12,000 at 1% over 12 months ≈ 1,066.19
        let pmt = annuity_payment(dec!(12_000), dec!(0.01), 12).unwrap();
        assert!((pmt - dec!(1066.19)).abs() < dec!(0.01));
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let pmt = annuity_payment(dec!(1_200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_zero_term_is_rejected() {
        assert!(annuity_factor(dec!(0.02), 0).is_err());
    }

    #[test]
    fn test_overflowing_term_is_an_error() {
        let err = annuity_factor(dec!(0.025), 3000).unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { ref field, .. } if field == "term_months"));

        let err = build_schedule(&ScheduleInput {
            financed_amount: dec!(5_000_000),
            term_months: 3000,
            periodic_rate: dec!(0.025),
            fees: no_fees(),
        })
        .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidInput { .. }));
    }

    #[test]
    fn test_schedule_rows_chain_balances() {
        let schedule = build_schedule(&ScheduleInput {
            financed_amount: dec!(5_000_000),
            term_months: 12,
            periodic_rate: dec!(0.0187),
            fees: no_fees(),
        })
        .unwrap();

        assert_eq!(schedule.rows.len(), 12);
        for pair in schedule.rows.windows(2) {
            assert_eq!(
                pair[1].opening_balance,
                pair[0].opening_balance - pair[0].principal
            );
        }
        assert!(schedule.closing_balance.abs() < dec!(0.01));
    }

    #[test]
    fn test_fee_stack_per_row() {
        let fees = FeeSchedule {
            admin_fee_percent: dec!(5),
            guarantee: GuaranteeFee::PercentOfFinanced(dec!(1.5)),
            insurance1_percent: dec!(4),
            insurance2_factor: dec!(0.17),
        };
        let schedule = build_schedule(&ScheduleInput {
            financed_amount: dec!(2_400_000),
            term_months: 6,
            periodic_rate: dec!(0.025),
            fees,
        })
        .unwrap();

        let first = &schedule.rows[0];
        // Admin: 2.4M * 5% / 6 = 20,000 flat
        assert_eq!(first.admin_fee, dec!(20_000));
        // FGA: 2.4M * 1.5% = 36,000 flat
        assert_eq!(first.guarantee_fee, dec!(36_000));
        // Insurance 1 tracks the level payment
        assert_eq!(first.insurance1, schedule.level_payment * dec!(0.04));
        // Insurance 2: 2.4M * 0.17 / 1000 = 408 on the opening balance
        assert_eq!(first.insurance2, dec!(408));

        let last = schedule.rows.last().unwrap();
        assert_eq!(last.admin_fee, first.admin_fee);
        assert_eq!(last.guarantee_fee, first.guarantee_fee);
        assert!(last.insurance2 < first.insurance2);
        assert_eq!(schedule.first_period_total, first.total_payment);
    }

    #[test]
    fn test_flat_guarantee_is_not_scaled() {
        let schedule = build_schedule(&ScheduleInput {
            financed_amount: dec!(1_000_000),
            term_months: 9,
            periodic_rate: dec!(0.02),
            fees: FeeSchedule::guarantee_only(dec!(40_000)),
        })
        .unwrap();
        assert!(schedule.rows.iter().all(|r| r.guarantee_fee == dec!(40_000)));
        assert_eq!(
            schedule.first_period_total,
            schedule.level_payment + dec!(40_000)
        );
    }

    #[test]
    fn test_non_positive_amount_is_rejected() {
        let result = build_schedule(&ScheduleInput {
            financed_amount: Decimal::ZERO,
            term_months: 6,
            periodic_rate: dec!(0.02),
            fees: no_fees(),
        });
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_principal_sums_to_financed_amount(
            amount in 100_000i64..50_000_000i64,
            rate_bp in 1u32..500u32,
            n in 1u32..=36u32,
        ) {
            let financed = Decimal::from(amount);
            let schedule = build_schedule(&ScheduleInput {
                financed_amount: financed,
                term_months: n,
                periodic_rate: Decimal::from(rate_bp) / dec!(10000),
                fees: no_fees(),
            }).unwrap();

            let tolerance = Decimal::from(n);
            let principal: Decimal = schedule.rows.iter().map(|r| r.principal).sum();
            prop_assert_eq!(schedule.rows.len(), n as usize);
            prop_assert!((principal - financed).abs() <= tolerance);
            prop_assert!(schedule.closing_balance.abs() <= tolerance);
        }
    }
}
