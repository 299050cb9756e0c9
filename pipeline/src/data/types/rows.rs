//! Row types of the line-item snapshot and the sales fact table
//!
//! Field order of each struct matches the column contract in
//! [`crate::data::schema`], so `csv` serialization lines up with the header.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::CustomerType;

/// One purchased line item with its order-level attributes carried down
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemRow {
    pub order_id: u64,
    pub order_name: String,
    /// Creation time in the business timezone (RFC 3339)
    pub created_at: String,
    pub processed_at: String,
    pub cancelled_at: String,
    pub customer_id: Option<u64>,
    pub customer_type: CustomerType,
    pub source_name: String,
    pub landing_site: String,
    pub discount_codes: String,
    /// Order-level total, duplicated on every line item of the order
    pub shipping_charged: f64,
    /// Order-level total, duplicated on every line item of the order
    pub refunds_total: f64,
    pub line_item_id: Option<u64>,
    pub sku: String,
    pub product_id: Option<u64>,
    pub variant_id: Option<u64>,
    pub product_title: String,
    pub variant_title: String,
    pub quantity: i64,
    pub price: f64,
    pub discount_allocations: f64,
    pub subtotal: f64,
    pub region: String,
    pub country: String,
    pub state: String,
    pub source_key: String,
    pub channel: String,
    pub sub_channel: String,
    pub date: NaiveDate,
    pub week: String,
    pub month: String,
    pub quarter: String,
    pub year: i32,
    pub gross_revenue: f64,
    pub discounts: f64,
    pub net_revenue: f64,
    /// Pro-rated refund share of this row
    #[serde(skip)]
    pub refund_share: f64,
}

impl LineItemRow {
    pub fn fact_key(&self) -> FactKey {
        FactKey {
            date: self.date,
            channel: self.channel.clone(),
            order_id: self.order_id,
            sku: self.sku.clone(),
            product_title: self.product_title.clone(),
            variant_title: self.variant_title.clone(),
            week: self.week.clone(),
            month: self.month.clone(),
            quarter: self.quarter.clone(),
            year: self.year,
            region: self.region.clone(),
            country: self.country.clone(),
            state: self.state.clone(),
            sub_channel: self.sub_channel.clone(),
        }
    }
}

/// One row of the daily sales fact table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFact {
    pub date: NaiveDate,
    pub channel: String,
    pub order_id: u64,
    pub sku: String,
    pub product_title: String,
    pub variant_title: String,
    pub week: String,
    pub month: String,
    pub quarter: String,
    pub year: i32,
    pub units: i64,
    pub gross_revenue: f64,
    pub discounts: f64,
    pub shipping_charged: f64,
    pub refunds: f64,
    pub net_revenue: f64,
    pub region: String,
    pub customer_type: CustomerType,
    pub source: String,
    pub promo_code: String,
    pub promo_cost: f64,
    pub platform_fees: f64,
    #[serde(rename = "COGS")]
    pub cogs: f64,
    pub gross_margin: f64,
    pub country: String,
    pub state: String,
    pub sub_channel: String,
}

impl SalesFact {
    pub fn merge_key(&self) -> MergeKey {
        MergeKey {
            date: self.date,
            channel: self.channel.clone(),
            order_id: self.order_id,
            sku: self.sku.clone(),
            sub_channel: self.sub_channel.clone(),
        }
    }
}

/// Aggregation grouping key (14 fields)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactKey {
    pub date: NaiveDate,
    pub channel: String,
    pub order_id: u64,
    pub sku: String,
    pub product_title: String,
    pub variant_title: String,
    pub week: String,
    pub month: String,
    pub quarter: String,
    pub year: i32,
    pub region: String,
    pub country: String,
    pub state: String,
    pub sub_channel: String,
}

/// Dedup key used when merging into the persisted table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeKey {
    pub date: NaiveDate,
    pub channel: String,
    pub order_id: u64,
    pub sku: String,
    pub sub_channel: String,
}
