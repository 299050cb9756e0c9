//! Raw order payloads as captured from the storefront export

use serde::Deserialize;

use crate::utils::json::{
    lenient_f64, lenient_i64, lenient_id, lenient_opt_i64, lenient_string, null_as_default,
};

/// One order record from a batch file.
///
/// Deserialization is lenient: money and ids accept numbers or strings,
/// numeric text fields read as strings, `null` collections read as empty,
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub processed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cancelled_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub landing_site: Option<String>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    /// Pre-enriched geography (set by upstream extraction when available)
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub region: Option<String>,
    pub customer: Option<Customer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_codes: Vec<DiscountCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub refunds: Vec<Refund>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient_string")]
    pub province_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub orders_count: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Customer {
    /// An empty `{}` customer object counts as absent
    pub fn is_present(&self) -> bool {
        self.id.is_some() || self.orders_count.is_some() || !self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountCode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingLine {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Refund {
    #[serde(default, deserialize_with = "null_as_default")]
    pub transactions: Vec<Transaction>,
}

impl Refund {
    /// Amount of the first transaction only (0 when there is none)
    pub fn first_transaction_amount(&self) -> f64 {
        self.transactions.first().map_or(0.0, |t| t.amount)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub product_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub variant_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub variant_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_allocations: Vec<DiscountAllocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountAllocation {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
}
