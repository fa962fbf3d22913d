//! Quote request/response types and the single entry point that dispatches a request to
//! its plan calculator.

use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::config::{resolve_configuration, ClientTier, PlanConfiguration, PlanType, RateMode};
use crate::error::QuoteError;
use crate::plans::{cash, credicontado, credito, credito_fs};
use crate::prices::{PriceField, PriceFields};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::QuoteEngineResult;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Cash price list a contado sale is quoted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashPriceList {
    #[default]
    List1,
    List2,
    List3,
    List4,
}

impl CashPriceList {
    pub fn price_field(self) -> PriceField {
        match self {
            Self::List1 => PriceField::CashList1,
            Self::List2 => PriceField::CashList2,
            Self::List3 => PriceField::CashList3,
            Self::List4 => PriceField::CashList4,
        }
    }
}

impl FromStr for CashPriceList {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "list1" | "list_1" => Ok(Self::List1),
            "2" | "list2" | "list_2" => Ok(Self::List2),
            "3" | "list3" | "list_3" => Ok(Self::List3),
            "4" | "list4" | "list_4" => Ok(Self::List4),
            other => Err(QuoteError::InvalidInput {
                field: "price_list".into(),
                reason: format!("unknown cash list '{other}' (expected 1 to 4)"),
            }),
        }
    }
}

/// Sub-branch of the legacy Crédito plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreditoOption {
    #[default]
    Plain,
    /// Inicial mayor
    LargerDownPayment { target_down_payment: Money },
    /// Retanqueo EdC a FS
    RefinanceOtherLender { outstanding_balance: Money },
    /// Retanqueo FS a FS
    RefinanceSameLender { outstanding_balance: Money },
}

/// Legacy flag set as captured by the quoting screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditoFlags {
    pub larger_down_payment: bool,
    pub larger_down_payment_amount: Money,
    pub refinance_other_lender: bool,
    pub other_lender_balance: Money,
    pub refinance_same_lender: bool,
    pub same_lender_balance: Money,
}

impl CreditoOption {
    /// Refinance from another lender wins over refinance from the same lender, which
    /// wins over a larger down payment.
    pub fn from_flags(flags: &CreditoFlags) -> Self {
        if flags.refinance_other_lender {
            Self::RefinanceOtherLender {
                outstanding_balance: flags.other_lender_balance,
            }
        } else if flags.refinance_same_lender {
            Self::RefinanceSameLender {
                outstanding_balance: flags.same_lender_balance,
            }
        } else if flags.larger_down_payment {
            Self::LargerDownPayment {
                target_down_payment: flags.larger_down_payment_amount,
            }
        } else {
            Self::Plain
        }
    }
}

/// Inicial mayor election on the Crédito FS long-term plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargerDownPayment {
    pub total_initial_payment: Money,
    #[serde(default)]
    pub rate_mode: RateMode,
}

/// One constructor per plan and sub-branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum PlanRequest {
    Cash {
        #[serde(default)]
        price_list: CashPriceList,
    },
    Convenio,
    CrediContado {
        term_months: u32,
        #[serde(default)]
        initial_payment: Option<Money>,
    },
    Credito {
        term_months: u32,
        #[serde(default)]
        option: CreditoOption,
    },
    CreditoFsShort {
        term_months: u32,
        client_tier: ClientTier,
        total_initial_payment: Money,
    },
    CreditoFsLong {
        term_months: u32,
        client_tier: ClientTier,
        #[serde(default)]
        larger_down_payment: Option<LargerDownPayment>,
    },
}

impl PlanRequest {
    pub fn plan_type(&self) -> PlanType {
        match self {
            Self::Cash { .. } => PlanType::Cash,
            Self::Convenio => PlanType::Convenio,
            Self::CrediContado { .. } => PlanType::CrediContado,
            Self::Credito { .. } => PlanType::Credito,
            Self::CreditoFsShort { .. } | Self::CreditoFsLong { .. } => PlanType::CreditoFs,
        }
    }

    fn methodology(&self) -> &'static str {
        match self {
            Self::Cash { .. } => "Contado: list price, single payment",
            Self::Convenio => "Convenio: negotiated price, single payment",
            Self::CrediContado { .. } => "CrediContado: flat 5% surcharge per installment",
            Self::Credito { .. } => "Crédito: French amortization with flat guarantee",
            Self::CreditoFsShort { .. } => {
                "Crédito FS corto plazo: discount tier, C.I. split, French amortization"
            }
            Self::CreditoFsLong { .. } => "Crédito FS largo plazo: French amortization",
        }
    }
}

/// Everything a calculation needs besides the configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuoteInputs {
    pub prices: PriceFields,
    pub request: PlanRequest,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Branch-specific figures reported next to the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum BranchMetadata {
    Cash {
        price_field: PriceField,
        used_fallback: bool,
    },
    Convenio {
        price_field: PriceField,
        used_fallback: bool,
    },
    CrediContado {
        remaining_balance: Money,
        surcharge_factor: Decimal,
    },
    CreditoPlain {
        guarantee_fee: Money,
    },
    CreditoLargerDownPayment {
        plain_rounded_payment: Money,
        excess: Money,
        guarantee_fee: Money,
    },
    CreditoRefinanceOtherLender {
        outstanding_balance: Money,
        current_rounded_payment: Money,
        target_total: Money,
        target_payment: Money,
        candidates_evaluated: u32,
    },
    CreditoRefinanceSameLender {
        outstanding_balance: Money,
        refinance_rate: Percent,
    },
    CreditoFsShort {
        client_tier: ClientTier,
        ci_percent: Percent,
        fga_percent: Percent,
        initial_percent: Percent,
        discount_percent: Percent,
        discounted_base: Money,
        down_payment: Money,
        fs_fee: Money,
    },
    CreditoFsLong {
        client_tier: ClientTier,
        ci_percent: Percent,
        fga_percent: Percent,
        /// Collected up front only with a larger down payment.
        fs_fee: Money,
        fs_fee_collected: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        down_payment: Option<Money>,
        rate_mode: RateMode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub plan: PlanType,
    pub base_price: Money,
    pub total_price: Money,
    pub initial_payment: Money,
    pub financed_amount: Money,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub schedule: Vec<AmortizationRow>,
    pub branch: BranchMetadata,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Computes a quote. A missing configuration falls back to the plan defaults and is
/// reported in `warnings`. Nothing partial is returned on error.
pub fn calculate_quote(
    inputs: &PriceQuoteInputs,
    configuration: Option<&PlanConfiguration>,
) -> QuoteEngineResult<ComputationOutput<QuoteResult>> {
    let start = Instant::now();
    let plan = inputs.request.plan_type();
    let (config, fallback_warning) = resolve_configuration(plan, configuration)?;
    let warnings: Vec<String> = fallback_warning.into_iter().collect();

    tracing::debug!(%plan, request = ?inputs.request, "calculating quote");

    let prices = &inputs.prices;
    let result = match &inputs.request {
        PlanRequest::Cash { price_list } => cash::quote_cash(prices, *price_list)?,
        PlanRequest::Convenio => cash::quote_convenio(prices)?,
        PlanRequest::CrediContado {
            term_months,
            initial_payment,
        } => credicontado::quote_credicontado(prices, *term_months, *initial_payment, &config)?,
        PlanRequest::Credito {
            term_months,
            option,
        } => credito::quote_credito(prices, *term_months, option, &config)?,
        PlanRequest::CreditoFsShort {
            term_months,
            client_tier,
            total_initial_payment,
        } => credito_fs::quote_short_term(
            prices,
            *term_months,
            *client_tier,
            *total_initial_payment,
            &config,
        )?,
        PlanRequest::CreditoFsLong {
            term_months,
            client_tier,
            larger_down_payment,
        } => credito_fs::quote_long_term(
            prices,
            *term_months,
            *client_tier,
            larger_down_payment.as_ref(),
            &config,
        )?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        inputs.request.methodology(),
        &config,
        warnings,
        elapsed,
        result,
    ))
}
