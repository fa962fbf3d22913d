use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cotizador_core::config::{ClientTier, RateMode};
use cotizador_core::plans::credito_fs::SHORT_TERM_MONTHS;
use cotizador_core::prices::PriceField;
use cotizador_core::quote::{CashPriceList, CreditoFlags, CreditoOption, LargerDownPayment};
use cotizador_core::{calculate_quote, PlanRequest, PriceQuoteInputs};

use super::{finish, PersistArgs, PriceSourceArgs, RunContext};

/// Arguments for a contado quote
#[derive(Args)]
pub struct CashArgs {
    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Cash price list (1 to 4)
    #[arg(long, default_value = "1")]
    pub list: CashPriceList,

    #[command(flatten)]
    pub persist: PersistArgs,
}

/// Arguments for a convenio quote
#[derive(Args)]
pub struct ConvenioArgs {
    #[command(flatten)]
    pub source: PriceSourceArgs,

    #[command(flatten)]
    pub persist: PersistArgs,
}

/// Arguments for a CrediContado quote
#[derive(Args)]
pub struct CrediContadoArgs {
    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Number of installments
    #[arg(long)]
    pub term: u32,

    /// Initial payment (defaults to 0)
    #[arg(long)]
    pub initial: Option<Decimal>,

    #[command(flatten)]
    pub persist: PersistArgs,
}

/// Arguments for a legacy Crédito quote
#[derive(Args)]
pub struct CreditoArgs {
    /// FinanSueños base price (or provide --product and --price-list)
    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Inicial mayor: target total down payment
    #[arg(long)]
    pub larger_down_payment: Option<Decimal>,

    /// Retanqueo EdC a FS: balance owed to the other lender
    #[arg(long)]
    pub refinance_other: Option<Decimal>,

    /// Retanqueo FS a FS: balance still owed to FinanSueños
    #[arg(long)]
    pub refinance_same: Option<Decimal>,

    #[command(flatten)]
    pub persist: PersistArgs,
}

/// Arguments for a Crédito FS quote
#[derive(Args)]
pub struct CreditoFsArgs {
    #[command(flatten)]
    pub source: PriceSourceArgs,

    /// Term in months: 3-6 is short term, 9-18 long term
    #[arg(long)]
    pub term: u32,

    /// Client tier (AAA, AA, A, BBB, BB, B)
    #[arg(long)]
    pub tier: ClientTier,

    /// Total initial payment (required for short term, inicial mayor for long term)
    #[arg(long)]
    pub initial: Option<Decimal>,

    /// Use the retanqueo rate for a long-term inicial mayor
    #[arg(long)]
    pub refinance_rate: bool,

    #[command(flatten)]
    pub persist: PersistArgs,
}

fn run(
    inputs: PriceQuoteInputs,
    context: &RunContext,
    source: &PriceSourceArgs,
    persist: &PersistArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let configuration = context.configuration(inputs.request.plan_type())?;
    let output = calculate_quote(&inputs, configuration.as_ref())?;
    finish(output, persist, source.product.as_deref())
}

pub fn run_cash(args: CashArgs, context: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = PriceQuoteInputs {
        prices: args.source.price_fields(args.list.price_field(), context)?,
        request: PlanRequest::Cash {
            price_list: args.list,
        },
    };
    run(inputs, context, &args.source, &args.persist)
}

pub fn run_convenio(
    args: ConvenioArgs,
    context: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = PriceQuoteInputs {
        prices: args.source.price_fields(PriceField::Convenio, context)?,
        request: PlanRequest::Convenio,
    };
    run(inputs, context, &args.source, &args.persist)
}

pub fn run_credicontado(
    args: CrediContadoArgs,
    context: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = PriceQuoteInputs {
        prices: args.source.price_fields(PriceField::CrediContado, context)?,
        request: PlanRequest::CrediContado {
            term_months: args.term,
            initial_payment: args.initial,
        },
    };
    run(inputs, context, &args.source, &args.persist)
}

pub fn run_credito(
    args: CreditoArgs,
    context: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let flags = CreditoFlags {
        larger_down_payment: args.larger_down_payment.is_some(),
        larger_down_payment_amount: args.larger_down_payment.unwrap_or_default(),
        refinance_other_lender: args.refinance_other.is_some(),
        other_lender_balance: args.refinance_other.unwrap_or_default(),
        refinance_same_lender: args.refinance_same.is_some(),
        same_lender_balance: args.refinance_same.unwrap_or_default(),
    };
    let option = CreditoOption::from_flags(&flags);
    if option != CreditoOption::Plain {
        tracing::info!(?option, "credito option selected from flags");
    }

    let inputs = PriceQuoteInputs {
        prices: args.source.price_fields(PriceField::CreditBase, context)?,
        request: PlanRequest::Credito {
            term_months: args.term,
            option,
        },
    };
    run(inputs, context, &args.source, &args.persist)
}

pub fn run_credito_fs(
    args: CreditoFsArgs,
    context: &RunContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request = if SHORT_TERM_MONTHS.contains(&args.term) {
        PlanRequest::CreditoFsShort {
            term_months: args.term,
            client_tier: args.tier,
            total_initial_payment: args
                .initial
                .ok_or("--initial is required for short-term Crédito FS")?,
        }
    } else {
        PlanRequest::CreditoFsLong {
            term_months: args.term,
            client_tier: args.tier,
            larger_down_payment: args.initial.map(|total| LargerDownPayment {
                total_initial_payment: total,
                rate_mode: if args.refinance_rate {
                    RateMode::Refinance
                } else {
                    RateMode::Monthly
                },
            }),
        }
    };

    let inputs = PriceQuoteInputs {
        prices: args.source.price_fields(PriceField::CreditBase, context)?,
        request,
    };
    run(inputs, context, &args.source, &args.persist)
}
