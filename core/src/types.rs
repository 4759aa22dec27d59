//! Domain DTOs for the discount-code resource.
//!
//! # Design
//! `DiscountCode` is the record the shop returns. Writes go through the
//! narrower `NewDiscountCode` and `DiscountCodeUpdate` payloads so callers can
//! never send server-owned fields (`usage_count`, timestamps) by accident.
//!
//! The Shopify API wraps every payload in a named envelope
//! (`{"discount_code": ...}` / `{"discount_codes": [...]}`). The envelope
//! types are crate-private: callers only ever see the unwrapped records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A discount code attached to a price rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountCode {
    pub id: u64,
    pub price_rule_id: u64,
    pub code: String,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Request payload for creating a discount code under a price rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewDiscountCode {
    pub code: String,
}

/// Request payload for updating a discount code. Omitted fields are left
/// untouched by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountCodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// `{"discount_code": {...}}`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DiscountCodeEnvelope<T> {
    pub(crate) discount_code: T,
}

/// `{"discount_codes": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct DiscountCodesEnvelope {
    pub(crate) discount_codes: Vec<DiscountCode>,
}

/// Update body: the path id is repeated inside the envelope.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateBody<'a> {
    pub(crate) id: u64,
    #[serde(flatten)]
    pub(crate) fields: &'a DiscountCodeUpdate,
}
