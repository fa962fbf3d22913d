//! Named price fields of a price-list row and the fallback chain used to resolve them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::QuoteError;
use crate::types::Money;
use crate::QuoteEngineResult;

/// Price fields of a product on a given price list. Absent fields are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFields {
    #[serde(alias = "lista_1")]
    pub cash_list_1: Money,
    #[serde(alias = "lista_2")]
    pub cash_list_2: Money,
    #[serde(alias = "lista_3")]
    pub cash_list_3: Money,
    #[serde(alias = "lista_4")]
    pub cash_list_4: Money,
    pub credicontado: Money,
    /// FinanSueños base
    #[serde(alias = "base_finansuenos")]
    pub credit_base: Money,
    pub convenio: Money,
}

/// One named field of [`PriceFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    CashList1,
    CashList2,
    CashList3,
    CashList4,
    CrediContado,
    CreditBase,
    Convenio,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CashList1 => "cash_list_1",
            Self::CashList2 => "cash_list_2",
            Self::CashList3 => "cash_list_3",
            Self::CashList4 => "cash_list_4",
            Self::CrediContado => "credicontado",
            Self::CreditBase => "credit_base",
            Self::Convenio => "convenio",
        };
        write!(f, "{s}")
    }
}

impl PriceField {
    /// Field consulted when this one is zero.
    pub fn fallback(self) -> Option<PriceField> {
        match self {
            Self::CashList2 | Self::CashList3 | Self::CashList4 | Self::Convenio => {
                Some(Self::CashList1)
            }
            Self::CashList1 | Self::CrediContado | Self::CreditBase => None,
        }
    }
}

/// A price picked from a row, remembering whether a fallback field supplied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub field: PriceField,
    pub amount: Money,
    pub used_fallback: bool,
}

impl PriceFields {
    pub fn get(&self, field: PriceField) -> Money {
        match field {
            PriceField::CashList1 => self.cash_list_1,
            PriceField::CashList2 => self.cash_list_2,
            PriceField::CashList3 => self.cash_list_3,
            PriceField::CashList4 => self.cash_list_4,
            PriceField::CrediContado => self.credicontado,
            PriceField::CreditBase => self.credit_base,
            PriceField::Convenio => self.convenio,
        }
    }

    /// Resolves a field through its fallback chain. Zero or negative values count as
    /// absent.
    pub fn resolve(&self, requested: PriceField) -> QuoteEngineResult<ResolvedPrice> {
        let mut tried = Vec::new();
        let mut current = Some(requested);
        while let Some(field) = current {
            tried.push(field.to_string());
            let amount = self.get(field);
            if amount > Decimal::ZERO {
                return Ok(ResolvedPrice {
                    field,
                    amount,
                    used_fallback: field != requested,
                });
            }
            current = field.fallback();
        }
        Err(QuoteError::MissingPrice {
            field: requested.to_string(),
            tried: tried.join(" -> "),
        })
    }
}
