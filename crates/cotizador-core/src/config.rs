//! Plan configuration snapshots.
//!
//! A [`PlanConfiguration`] is read once by the caller and handed to the engine as an
//! immutable value. All fallback literals live in this module; calculators never carry
//! their own defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::types::{percent_to_rate, Percent, Rate};
use crate::QuoteEngineResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_MONTHLY_INTEREST_RATE: Percent = dec!(2.5);
pub const DEFAULT_REFINANCE_INTEREST_RATE: Percent = dec!(1.60);
pub const DEFAULT_ADMIN_FEE_PERCENT: Percent = dec!(5);
pub const DEFAULT_INSURANCE1_PERCENT: Percent = dec!(4);
/// Per-mille of the outstanding balance.
pub const DEFAULT_INSURANCE2_FACTOR: Decimal = dec!(0.17);
pub const DEFAULT_LEGACY_GUARANTEE_PERCENT: Percent = dec!(2);

/// Terms offered by the legacy Crédito plan when no configuration overrides them.
pub const LEGACY_CREDITO_TERMS: [u32; 4] = [9, 11, 14, 17];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Sale or financing plan family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Contado
    Cash,
    /// CrediContado: flat surcharge per installment
    #[serde(alias = "installment_surcharge")]
    CrediContado,
    /// Legacy amortized Crédito
    #[serde(alias = "amortized_credit")]
    Credito,
    Convenio,
    /// Crédito FS new model
    #[serde(alias = "fs_credit")]
    CreditoFs,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cash => "contado",
            Self::CrediContado => "credicontado",
            Self::Credito => "credito",
            Self::Convenio => "convenio",
            Self::CreditoFs => "credito_fs",
        };
        write!(f, "{s}")
    }
}

/// Client risk tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientTier {
    AAA,
    AA,
    A,
    BBB,
    BB,
    B,
}

impl fmt::Display for ClientTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AAA => "AAA",
            Self::AA => "AA",
            Self::A => "A",
            Self::BBB => "BBB",
            Self::BB => "BB",
            Self::B => "B",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ClientTier {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AAA" => Ok(Self::AAA),
            "AA" => Ok(Self::AA),
            "A" => Ok(Self::A),
            "BBB" => Ok(Self::BBB),
            "BB" => Ok(Self::BB),
            "B" => Ok(Self::B),
            other => Err(QuoteError::InvalidInput {
                field: "client_tier".into(),
                reason: format!("unknown tier '{other}' (expected AAA, AA, A, BBB, BB or B)"),
            }),
        }
    }
}

/// Which configured periodic rate a schedule is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateMode {
    #[default]
    Monthly,
    /// Retanqueo rate
    Refinance,
}

// ---------------------------------------------------------------------------
// Configuration records
// ---------------------------------------------------------------------------

/// Per-tier coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCoefficients {
    /// C.I.%
    #[serde(alias = "ci_percent")]
    pub down_payment_percent: Percent,
    /// FGA%
    #[serde(alias = "fga_percent")]
    pub guarantee_fee_percent: Percent,
}

/// One row of the discount table, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRange {
    pub min_percent: Percent,
    pub max_percent: Percent,
    pub discount_percent: Percent,
}

impl DiscountRange {
    pub fn contains(&self, percent: Percent) -> bool {
        self.min_percent <= percent && percent <= self.max_percent
    }
}

/// Ranges in ascending `min_percent` order; equal minimums keep their given order.
pub fn sort_discount_ranges(ranges: &[DiscountRange]) -> Vec<DiscountRange> {
    let mut ordered = ranges.to_vec();
    ordered.sort_by(|a, b| a.min_percent.cmp(&b.min_percent));
    ordered
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfiguration {
    pub monthly_interest_rate: Percent,
    pub refinance_interest_rate: Percent,
    pub admin_fee_percent: Percent,
    pub insurance1_percent: Percent,
    pub insurance2_factor: Decimal,
    /// Flat per-period guarantee of the legacy Crédito plan, as percent of its base.
    pub legacy_guarantee_percent: Percent,
    pub discount_ranges: Vec<DiscountRange>,
    pub client_tiers: BTreeMap<ClientTier, TierCoefficients>,
    /// Empty means any positive term.
    pub allowed_terms: Vec<u32>,
}

impl Default for PlanConfiguration {
    fn default() -> Self {
        Self {
            monthly_interest_rate: DEFAULT_MONTHLY_INTEREST_RATE,
            refinance_interest_rate: DEFAULT_REFINANCE_INTEREST_RATE,
            admin_fee_percent: DEFAULT_ADMIN_FEE_PERCENT,
            insurance1_percent: DEFAULT_INSURANCE1_PERCENT,
            insurance2_factor: DEFAULT_INSURANCE2_FACTOR,
            legacy_guarantee_percent: DEFAULT_LEGACY_GUARANTEE_PERCENT,
            discount_ranges: Vec::new(),
            client_tiers: BTreeMap::new(),
            allowed_terms: Vec::new(),
        }
    }
}

impl PlanConfiguration {
    /// Default configuration for a plan family.
    pub fn defaults_for(plan: PlanType) -> Self {
        let mut config = Self::default();
        if plan == PlanType::Credito {
            config.allowed_terms = LEGACY_CREDITO_TERMS.to_vec();
        }
        config
    }

    /// Fractional periodic rate for the requested mode.
    pub fn periodic_rate(&self, mode: RateMode) -> Rate {
        match mode {
            RateMode::Monthly => percent_to_rate(self.monthly_interest_rate),
            RateMode::Refinance => percent_to_rate(self.refinance_interest_rate),
        }
    }

    pub fn tier(&self, tier: ClientTier) -> QuoteEngineResult<TierCoefficients> {
        self.client_tiers
            .get(&tier)
            .copied()
            .ok_or_else(|| QuoteError::UnknownClientTier(tier.to_string()))
    }

    /// Discount ranges in ascending `min_percent` order. Equal minimums keep their
    /// configured order.
    pub fn sorted_discount_ranges(&self) -> Vec<DiscountRange> {
        sort_discount_ranges(&self.discount_ranges)
    }

    /// Checks a term against `allowed_terms`.
    pub fn check_term(&self, plan: PlanType, term_months: u32) -> QuoteEngineResult<()> {
        let allowed = term_months > 0
            && (self.allowed_terms.is_empty() || self.allowed_terms.contains(&term_months));
        if allowed {
            return Ok(());
        }
        let allowed = if self.allowed_terms.is_empty() {
            "any positive term".to_string()
        } else {
            self.allowed_terms
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(QuoteError::InvalidTerm {
            plan: plan.to_string(),
            term_months,
            allowed,
        })
    }

    /// Rejects malformed configuration shapes.
    pub fn validate(&self) -> QuoteEngineResult<()> {
        let non_negative = [
            ("monthly_interest_rate", self.monthly_interest_rate),
            ("refinance_interest_rate", self.refinance_interest_rate),
            ("admin_fee_percent", self.admin_fee_percent),
            ("insurance1_percent", self.insurance1_percent),
            ("insurance2_factor", self.insurance2_factor),
            ("legacy_guarantee_percent", self.legacy_guarantee_percent),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(QuoteError::InvalidInput {
                    field: field.into(),
                    reason: "must be non-negative".into(),
                });
            }
        }

        for (tier, coefficients) in &self.client_tiers {
            if coefficients.down_payment_percent < Decimal::ZERO
                || coefficients.down_payment_percent >= Decimal::ONE_HUNDRED
            {
                return Err(QuoteError::InvalidInput {
                    field: format!("client_tiers.{tier}.down_payment_percent"),
                    reason: "must be in [0, 100)".into(),
                });
            }
            if coefficients.guarantee_fee_percent < Decimal::ZERO {
                return Err(QuoteError::InvalidInput {
                    field: format!("client_tiers.{tier}.guarantee_fee_percent"),
                    reason: "must be non-negative".into(),
                });
            }
        }

        let ranges = self.sorted_discount_ranges();
        for range in &ranges {
            if range.min_percent > range.max_percent {
                return Err(QuoteError::InvalidInput {
                    field: "discount_ranges".into(),
                    reason: format!(
                        "range {}..{} has min above max",
                        range.min_percent, range.max_percent
                    ),
                });
            }
        }
        for pair in ranges.windows(2) {
            if pair[1].min_percent <= pair[0].max_percent {
                return Err(QuoteError::InvalidInput {
                    field: "discount_ranges".into(),
                    reason: format!(
                        "range {}..{} overlaps {}..{}",
                        pair[0].min_percent,
                        pair[0].max_percent,
                        pair[1].min_percent,
                        pair[1].max_percent
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Picks the caller's configuration or falls back to the plan defaults.
///
/// Returns the configuration plus a warning when defaults were substituted.
pub fn resolve_configuration(
    plan: PlanType,
    supplied: Option<&PlanConfiguration>,
) -> QuoteEngineResult<(PlanConfiguration, Option<String>)> {
    match supplied {
        Some(config) => {
            config.validate()?;
            Ok((config.clone(), None))
        }
        None => {
            tracing::warn!(%plan, "no active plan configuration, using defaults");
            Ok((
                PlanConfiguration::defaults_for(plan),
                Some(format!(
                    "No active configuration for {plan}; default rates were applied."
                )),
            ))
        }
    }
}
