//! Financing calculation engine for EdC/FinanSueños sales quotes.
//!
//! Every calculator is a pure function of a [`quote::PriceQuoteInputs`] value and a
//! [`config::PlanConfiguration`] snapshot. Money is carried as `rust_decimal::Decimal`
//! end to end; nothing in the engine performs I/O.

pub mod amortization;
pub mod config;
pub mod discount;
pub mod error;
pub mod plans;
pub mod prices;
pub mod provider;
pub mod quote;
pub mod record;
pub mod rounding;
pub mod search;
pub mod types;

pub use error::QuoteError;
pub use quote::{calculate_quote, PlanRequest, PriceQuoteInputs, QuoteResult};
pub use types::*;

/// Standard result type for all engine operations
pub type QuoteEngineResult<T> = Result<T, QuoteError>;
