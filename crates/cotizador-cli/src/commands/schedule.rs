use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use cotizador_core::amortization::{build_schedule, FeeSchedule, ScheduleInput};
use cotizador_core::config::{PlanType, RateMode};
use cotizador_core::rounding::round_up_to_1000;
use cotizador_core::types::percent_to_rate;

use super::RunContext;

/// Arguments for a bare amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Financed amount
    #[arg(long)]
    pub amount: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Monthly rate in percent (defaults to the Crédito FS configuration)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// FGA percent on the financed amount
    #[arg(long, default_value = "0")]
    pub fga: Decimal,

    /// Only interest and a flat guarantee of this amount, as the legacy plan quotes
    #[arg(long, conflicts_with = "fga")]
    pub flat_guarantee: Option<Decimal>,
}

pub fn run_schedule(
    args: ScheduleArgs,
    context: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = context
        .configuration(PlanType::CreditoFs)?
        .unwrap_or_default();
    let periodic_rate = match args.rate {
        Some(percent) => percent_to_rate(percent),
        None => config.periodic_rate(RateMode::Monthly),
    };
    let fees = match args.flat_guarantee {
        Some(amount) => FeeSchedule::guarantee_only(amount),
        None => FeeSchedule::full_stack(&config, args.fga),
    };

    let schedule = build_schedule(&ScheduleInput {
        financed_amount: args.amount,
        term_months: args.term,
        periodic_rate,
        fees,
    })?;

    Ok(json!({
        "result": {
            "level_payment": schedule.level_payment,
            "first_period_total": schedule.first_period_total,
            "monthly_payment": round_up_to_1000(schedule.first_period_total),
            "total_interest": schedule.total_interest,
            "total_paid": schedule.total_paid,
            "closing_balance": schedule.closing_balance,
            "schedule": schedule.rows,
        },
        "methodology": "French amortization",
        "warnings": [],
    }))
}
