//! Read-side collaborators of the engine and an in-memory catalog implementing them.
//!
//! The engine never calls these itself: request handlers fetch a snapshot through them
//! and pass plain values to [`crate::calculate_quote`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{DiscountRange, PlanConfiguration, PlanType};
use crate::error::QuoteError;
use crate::prices::PriceFields;
use crate::record::QuoteRecord;
use crate::QuoteEngineResult;

pub trait ConfigurationProvider {
    fn plan_configuration(&self, plan: PlanType) -> QuoteEngineResult<PlanConfiguration>;

    /// Most recent discount table for the plan.
    fn discount_ranges(&self, plan: PlanType) -> QuoteEngineResult<Vec<DiscountRange>>;
}

pub trait PriceProvider {
    fn price_fields(&self, product_id: &str, price_list_id: &str) -> QuoteEngineResult<PriceFields>;
}

/// Consumer of finished quotes. Stores the record verbatim.
pub trait QuoteSink {
    fn store(&mut self, record: &QuoteRecord) -> QuoteEngineResult<()>;
}

/// One historical version of a plan's discount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRangeSet {
    pub version: u32,
    pub ranges: Vec<DiscountRange>,
}

/// Configuration and prices loaded from a single catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCatalog {
    pub plans: BTreeMap<PlanType, PlanConfiguration>,
    /// Versioned discount tables; the highest version overrides `discount_ranges` of the
    /// matching plan.
    pub discount_history: BTreeMap<PlanType, Vec<DiscountRangeSet>>,
    /// price list id → product id → price row
    pub price_lists: BTreeMap<String, BTreeMap<String, PriceFields>>,
}

impl PlanCatalog {
    /// Configuration for the plan, or `None` when the catalog has none.
    pub fn active_configuration(&self, plan: PlanType) -> QuoteEngineResult<Option<PlanConfiguration>> {
        match self.plan_configuration(plan) {
            Ok(config) => Ok(Some(config)),
            Err(QuoteError::NoActiveConfiguration { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ConfigurationProvider for PlanCatalog {
    fn plan_configuration(&self, plan: PlanType) -> QuoteEngineResult<PlanConfiguration> {
        let mut config = self
            .plans
            .get(&plan)
            .cloned()
            .ok_or_else(|| QuoteError::NoActiveConfiguration {
                plan: plan.to_string(),
                reason: "the catalog has no configuration for this plan".into(),
            })?;
        if self.discount_history.contains_key(&plan) {
            config.discount_ranges = self.discount_ranges(plan)?;
        }
        Ok(config)
    }

    fn discount_ranges(&self, plan: PlanType) -> QuoteEngineResult<Vec<DiscountRange>> {
        if let Some(latest) = self
            .discount_history
            .get(&plan)
            .and_then(|history| history.iter().max_by_key(|set| set.version))
        {
            return Ok(latest.ranges.clone());
        }
        self.plans
            .get(&plan)
            .map(|config| config.discount_ranges.clone())
            .ok_or_else(|| QuoteError::NoActiveConfiguration {
                plan: plan.to_string(),
                reason: "no discount ranges are configured".into(),
            })
    }
}

impl PriceProvider for PlanCatalog {
    fn price_fields(&self, product_id: &str, price_list_id: &str) -> QuoteEngineResult<PriceFields> {
        self.price_lists
            .get(price_list_id)
            .and_then(|list| list.get(product_id))
            .cloned()
            .ok_or_else(|| QuoteError::MissingPrice {
                field: format!("product {product_id} on price list {price_list_id}"),
                tried: price_list_id.to_string(),
            })
    }
}
