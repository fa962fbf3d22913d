use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use cotizador_core::config::PlanConfiguration;
use cotizador_core::{calculate_quote, PriceQuoteInputs};

use super::{finish, PersistArgs, RunContext};
use crate::input;

/// Full quote request. An embedded configuration overrides the catalog.
#[derive(Deserialize)]
struct QuoteDocument {
    #[serde(flatten)]
    inputs: PriceQuoteInputs,
    #[serde(default)]
    configuration: Option<PlanConfiguration>,
    #[serde(default)]
    product_id: Option<String>,
}

#[derive(Args)]
pub struct QuoteArgs {
    /// Path to a JSON or YAML request file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub persist: PersistArgs,
}

pub fn run_quote(args: QuoteArgs, context: &RunContext) -> Result<Value, Box<dyn std::error::Error>> {
    let document: QuoteDocument = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(document) = input::stdin::read_stdin()? {
        document
    } else {
        return Err("--input <file> or stdin required for a quote request".into());
    };

    let plan = document.inputs.request.plan_type();
    let configuration = match document.configuration {
        Some(config) => Some(config),
        None => context.configuration(plan)?,
    };

    let output = calculate_quote(&document.inputs, configuration.as_ref())?;
    finish(output, &args.persist, document.product_id.as_deref())
}
