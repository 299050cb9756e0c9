//! Line items -> daily sales facts
//!
//! Rows are grouped by [`FactKey`]. Float metrics are summed in a canonical
//! order (sorted by value) so the same multiset of rows always produces
//! bit-identical facts, whatever order the rows arrive in.

use std::collections::{BTreeMap, BTreeSet};

use super::flatten::join_codes;
use crate::data::types::{CustomerType, FactKey, LineItemRow, SalesFact};

/// Suffix appended to the channel name for the `source` column
const SOURCE_SUFFIX: &str = " Direct";

#[derive(Default)]
struct FactGroup<'a> {
    units: i64,
    gross_revenue: Vec<f64>,
    discounts: Vec<f64>,
    shipping_charged: Vec<f64>,
    refunds: Vec<f64>,
    net_revenue: Vec<f64>,
    promo_codes: BTreeSet<&'a str>,
    customer_types: BTreeSet<CustomerType>,
}

impl<'a> FactGroup<'a> {
    fn add(&mut self, row: &'a LineItemRow) {
        self.units += row.quantity;
        self.gross_revenue.push(row.gross_revenue);
        self.discounts.push(row.discounts);
        self.shipping_charged.push(row.shipping_charged);
        self.refunds.push(row.refund_share);
        self.net_revenue.push(row.net_revenue);
        self.promo_codes.extend(row.discount_codes.split(';'));
        self.customer_types.insert(row.customer_type);
    }

    fn customer_type(&self) -> CustomerType {
        let mut types = self.customer_types.iter();
        match (types.next(), types.next()) {
            (None, _) => CustomerType::Unknown,
            (Some(only), None) => *only,
            (Some(_), Some(_)) => CustomerType::Mixed,
        }
    }

    fn into_fact(self, key: FactKey) -> SalesFact {
        let customer_type = self.customer_type();
        let promo_code = join_codes(self.promo_codes.iter().copied());
        let net_revenue = stable_sum(self.net_revenue);

        SalesFact {
            source: format!("{}{}", key.channel, SOURCE_SUFFIX),
            date: key.date,
            channel: key.channel,
            order_id: key.order_id,
            sku: key.sku,
            product_title: key.product_title,
            variant_title: key.variant_title,
            week: key.week,
            month: key.month,
            quarter: key.quarter,
            year: key.year,
            units: self.units,
            gross_revenue: stable_sum(self.gross_revenue),
            discounts: stable_sum(self.discounts),
            shipping_charged: stable_sum(self.shipping_charged),
            refunds: stable_sum(self.refunds),
            net_revenue,
            region: key.region,
            customer_type,
            promo_code,
            promo_cost: 0.0,
            platform_fees: 0.0,
            cogs: 0.0,
            gross_margin: net_revenue,
            country: key.country,
            state: key.state,
            sub_channel: key.sub_channel,
        }
    }
}

/// Order-independent float sum
fn stable_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    values.into_iter().sum()
}

/// Aggregate line items into one fact per key, sorted by key.
pub fn aggregate_facts(rows: &[LineItemRow]) -> Vec<SalesFact> {
    let mut groups: BTreeMap<FactKey, FactGroup<'_>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.fact_key()).or_default().add(row);
    }

    let facts: Vec<SalesFact> = groups
        .into_iter()
        .map(|(key, group)| group.into_fact(key))
        .collect();

    tracing::debug!(line_items = rows.len(), facts = facts.len(), "Aggregated sales facts");
    facts
}
