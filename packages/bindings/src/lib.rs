use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use cotizador_core::amortization::ScheduleInput;
use cotizador_core::config::{DiscountRange, PlanConfiguration};
use cotizador_core::provider::{ConfigurationProvider, PlanCatalog};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Quote a price row for one plan. `config_json` is the plan's active
/// configuration; without it the engine's defaults apply.
#[napi]
pub fn calculate_quote(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let inputs: cotizador_core::PriceQuoteInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: Option<PlanConfiguration> = config_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(to_napi_error)?;
    let output =
        cotizador_core::calculate_quote(&inputs, config.as_ref()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Quote against a full plan catalog, picking the active configuration for the
/// requested plan.
#[napi]
pub fn calculate_quote_with_catalog(input_json: String, catalog_json: String) -> NapiResult<String> {
    let inputs: cotizador_core::PriceQuoteInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog: PlanCatalog = serde_json::from_str(&catalog_json).map_err(to_napi_error)?;
    let config = catalog
        .active_configuration(inputs.request.plan_type())
        .map_err(to_napi_error)?;
    let output =
        cotizador_core::calculate_quote(&inputs, config.as_ref()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = cotizador_core::amortization::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct DiscountLookupInput {
    total_initial_payment: Decimal,
    base_price: Decimal,
    ranges: Vec<DiscountRange>,
}

#[napi]
pub fn lookup_discount(input_json: String) -> NapiResult<String> {
    let input: DiscountLookupInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let percent =
        cotizador_core::discount::initial_percent(input.total_initial_payment, input.base_price)
            .map_err(to_napi_error)?;
    let tier =
        cotizador_core::discount::lookup_discount(percent, &input.ranges).map_err(to_napi_error)?;
    serde_json::to_string(&tier).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct SplitInput {
    total_initial_payment: Decimal,
    reference_base: Decimal,
    down_payment_percent: Decimal,
}

#[napi]
pub fn split_initial_payment(input_json: String) -> NapiResult<String> {
    let input: SplitInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let split = cotizador_core::plans::credito_fs::split_initial_payment(
        input.total_initial_payment,
        input.reference_base,
        cotizador_core::types::percent_to_rate(input.down_payment_percent),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({
        "down_payment": split.down_payment,
        "fs_fee": split.fs_fee,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Validates a plan catalog and returns the configuration each plan would quote with.
#[napi]
pub fn validate_catalog(catalog_json: String) -> NapiResult<String> {
    let catalog: PlanCatalog = serde_json::from_str(&catalog_json).map_err(to_napi_error)?;
    let mut active = serde_json::Map::new();
    for plan in catalog.plans.keys() {
        let config = catalog.plan_configuration(*plan).map_err(to_napi_error)?;
        config.validate().map_err(to_napi_error)?;
        active.insert(
            plan.to_string(),
            serde_json::to_value(&config).map_err(to_napi_error)?,
        );
    }
    serde_json::to_string(&active).map_err(to_napi_error)
}
