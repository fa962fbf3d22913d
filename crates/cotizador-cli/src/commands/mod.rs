pub mod plans;
pub mod quote;
pub mod schedule;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cotizador_core::config::{PlanConfiguration, PlanType};
use cotizador_core::prices::{PriceField, PriceFields};
use cotizador_core::provider::{PlanCatalog, PriceProvider, QuoteSink};
use cotizador_core::record::{ClientIdentification, QuoteRecord};
use cotizador_core::{ComputationOutput, QuoteResult};

use crate::input;
use crate::sink::JsonLinesSink;

/// Snapshot shared by every command: the optional plan catalog.
pub struct RunContext {
    catalog: Option<PlanCatalog>,
}

impl RunContext {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let catalog = match path {
            Some(path) => Some(input::file::read_document::<PlanCatalog>(path)?),
            None => None,
        };
        Ok(Self { catalog })
    }

    /// Active configuration for the plan; `None` lets the engine apply its defaults.
    pub fn configuration(
        &self,
        plan: PlanType,
    ) -> Result<Option<PlanConfiguration>, Box<dyn std::error::Error>> {
        match &self.catalog {
            Some(catalog) => Ok(catalog.active_configuration(plan)?),
            None => Ok(None),
        }
    }

    pub fn catalog_prices(
        &self,
        product_id: &str,
        price_list_id: &str,
    ) -> Result<PriceFields, Box<dyn std::error::Error>> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or("--product requires a --config catalog with price lists")?;
        Ok(catalog.price_fields(product_id, price_list_id)?)
    }
}

/// Where the base price comes from: an explicit amount or a catalog price row.
#[derive(Args)]
pub struct PriceSourceArgs {
    /// Base price for the plan's price field
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Product id in the catalog's price list
    #[arg(long, requires = "price_list")]
    pub product: Option<String>,

    /// Price list id in the catalog
    #[arg(long)]
    pub price_list: Option<String>,
}

impl PriceSourceArgs {
    pub fn price_fields(
        &self,
        field: PriceField,
        context: &RunContext,
    ) -> Result<PriceFields, Box<dyn std::error::Error>> {
        if let (Some(product), Some(list)) = (&self.product, &self.price_list) {
            return context.catalog_prices(product, list);
        }
        let amount = self
            .price
            .ok_or("--price is required (or provide --product and --price-list)")?;
        let mut prices = PriceFields::default();
        match field {
            PriceField::CashList1 => prices.cash_list_1 = amount,
            PriceField::CashList2 => prices.cash_list_2 = amount,
            PriceField::CashList3 => prices.cash_list_3 = amount,
            PriceField::CashList4 => prices.cash_list_4 = amount,
            PriceField::CrediContado => prices.credicontado = amount,
            PriceField::CreditBase => prices.credit_base = amount,
            PriceField::Convenio => prices.convenio = amount,
        }
        Ok(prices)
    }
}

/// Optional persistence of the finished quote.
#[derive(Args)]
pub struct PersistArgs {
    /// Append the quote to this JSON-lines file
    #[arg(long)]
    pub save: Option<String>,

    /// Client full name (required with --save)
    #[arg(long, requires = "save")]
    pub client_name: Option<String>,

    /// Client document number (required with --save)
    #[arg(long, requires = "save")]
    pub client_document: Option<String>,

    #[arg(long, requires = "save")]
    pub client_phone: Option<String>,

    /// Advisor who prepared the quote
    #[arg(long, requires = "save")]
    pub advisor: Option<String>,
}

impl PersistArgs {
    fn persist(
        &self,
        quote: &QuoteResult,
        product_id: Option<&str>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.save else {
            return Ok(());
        };
        let client = ClientIdentification {
            name: self
                .client_name
                .clone()
                .ok_or("--client-name is required with --save")?,
            document_id: self
                .client_document
                .clone()
                .ok_or("--client-document is required with --save")?,
            phone: self.client_phone.clone(),
        };

        let mut record = QuoteRecord::new(client, quote.clone(), chrono::Utc::now());
        if let Some(product) = product_id {
            record = record.with_product(product);
        }
        if let Some(advisor) = &self.advisor {
            record = record.with_advisor(advisor.clone());
        }

        JsonLinesSink::new(path).store(&record)?;
        tracing::info!(path = %path, plan = %record.plan, "quote saved");
        Ok(())
    }
}

/// Persists the quote when requested and converts the envelope for output.
pub fn finish(
    output: ComputationOutput<QuoteResult>,
    persist: &PersistArgs,
    product_id: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    persist.persist(&output.result, product_id)?;
    Ok(serde_json::to_value(output)?)
}
