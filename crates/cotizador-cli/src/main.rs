mod commands;
mod input;
mod output;
mod sink;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::plans::{CashArgs, ConvenioArgs, CrediContadoArgs, CreditoArgs, CreditoFsArgs};
use commands::quote::QuoteArgs;
use commands::schedule::ScheduleArgs;
use commands::RunContext;

/// EdC/FinanSueños sales quotes
#[derive(Parser)]
#[command(
    name = "cotizar",
    version,
    about = "EdC/FinanSueños sales quotes",
    long_about = "Computes contado, CrediContado, Crédito and Crédito FS quotes with \
                  decimal precision: discount tiers, down-payment split, French \
                  amortization schedules and rounded installments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Plan catalog (JSON or YAML) with plan configuration and price lists
    #[arg(long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote from a full JSON/YAML request (file or stdin)
    Quote(QuoteArgs),
    /// Contado: single payment from a cash price list
    Cash(CashArgs),
    /// Convenio: negotiated price, falling back to cash list 1
    Convenio(ConvenioArgs),
    /// CrediContado: flat 5% surcharge per installment
    Credicontado(CrediContadoArgs),
    /// Legacy Crédito with inicial mayor and retanqueo options
    Credito(CreditoArgs),
    /// Crédito FS new model (3-6 months short term, 9-18 months long term)
    CreditoFs(CreditoFsArgs),
    /// Bare French amortization schedule for a financed amount
    Schedule(ScheduleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "cotizador_core=info,cotizar=info",
        _ => "cotizador_core=debug,cotizar=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = match RunContext::load(cli.config.as_deref()) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::quote::run_quote(args, &context),
        Commands::Cash(args) => commands::plans::run_cash(args, &context),
        Commands::Convenio(args) => commands::plans::run_convenio(args, &context),
        Commands::Credicontado(args) => commands::plans::run_credicontado(args, &context),
        Commands::Credito(args) => commands::plans::run_credito(args, &context),
        Commands::CreditoFs(args) => commands::plans::run_credito_fs(args, &context),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &context),
        Commands::Version => {
            println!("cotizar {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
