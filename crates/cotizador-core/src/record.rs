//! Quote records handed to persistence. The quote is stored exactly as computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlanType;
use crate::quote::QuoteResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentification {
    pub name: String,
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub client: ClientIdentification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor: Option<String>,
    pub plan: PlanType,
    pub created_at: DateTime<Utc>,
    pub quote: QuoteResult,
}

impl QuoteRecord {
    pub fn new(client: ClientIdentification, quote: QuoteResult, created_at: DateTime<Utc>) -> Self {
        Self {
            client,
            product_id: None,
            advisor: None,
            plan: quote.plan,
            created_at,
            quote,
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_advisor(mut self, advisor: impl Into<String>) -> Self {
        self.advisor = Some(advisor.into());
        self
    }
}
