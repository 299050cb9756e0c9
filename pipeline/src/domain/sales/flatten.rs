//! Order -> line-item flattening
//!
//! Each order expands into one [`LineItemRow`] per line item. Order-level
//! values (shipping, refunds, discount codes, customer, geography, channel)
//! are resolved once and copied onto every row. Refunds are then spread as a
//! flat per-row share across the rows of the order.

use std::collections::{BTreeSet, HashMap};

use chrono_tz::Tz;

use super::channel::ChannelMap;
use super::geo::GeoResolver;
use crate::data::types::{CustomerType, LineItemRow, RawOrder};
use crate::utils::time::{CalendarBuckets, parse_order_timestamp};

pub struct Flattener<'a> {
    geo: GeoResolver<'a>,
    channels: &'a ChannelMap,
    tz: Tz,
}

impl<'a> Flattener<'a> {
    pub fn new(geo: GeoResolver<'a>, channels: &'a ChannelMap, tz: Tz) -> Self {
        Self { geo, channels, tz }
    }

    /// Flatten every valid order and apply refund pro-ration.
    ///
    /// Orders without a parseable `created_at` produce no rows.
    pub fn flatten_batch(&self, orders: &[RawOrder]) -> Vec<LineItemRow> {
        let mut rows = Vec::new();
        let mut missing_created = 0usize;
        let mut unparseable_created = 0usize;

        for order in orders {
            let Some(created_raw) = order.created_at.as_deref().filter(|s| !s.trim().is_empty())
            else {
                missing_created += 1;
                continue;
            };
            let Some(created) = parse_order_timestamp(created_raw) else {
                tracing::warn!(
                    order_id = ?order.id,
                    created_at = %created_raw,
                    "Unparseable order creation time; dropping order"
                );
                unparseable_created += 1;
                continue;
            };
            let (local, buckets) = CalendarBuckets::localized(created, self.tz);
            self.flatten_order(order, created_raw, &local.to_rfc3339(), &buckets, &mut rows);
        }

        apply_refund_shares(&mut rows);

        if missing_created > 0 {
            tracing::debug!(orders = missing_created, "Skipped orders without a creation time");
        }
        tracing::info!(
            orders = orders.len(),
            line_items = rows.len(),
            dropped = missing_created + unparseable_created,
            "Flattened orders to line items"
        );
        rows
    }

    fn flatten_order(
        &self,
        order: &RawOrder,
        created_raw: &str,
        created_local: &str,
        buckets: &CalendarBuckets,
        rows: &mut Vec<LineItemRow>,
    ) {
        let order_id = order.id.unwrap_or_default();
        let shipping_charged: f64 = order.shipping_lines.iter().map(|s| s.price).sum();
        let refunds_total: f64 = order
            .refunds
            .iter()
            .map(|r| r.first_transaction_amount())
            .sum();
        let discount_codes = join_codes(
            order
                .discount_codes
                .iter()
                .filter_map(|d| d.code.as_deref()),
        );

        let customer = order.customer.as_ref();
        let customer_type = CustomerType::classify(
            customer.is_some_and(|c| c.is_present()),
            customer.and_then(|c| c.orders_count),
        );

        let geo = self.geo.resolve(order);
        let source_name = order.source_name.clone().unwrap_or_default();
        let source_key = ChannelMap::source_key(&source_name);
        let assignment = self.channels.classify(&source_name);

        let processed_at = order
            .processed_at
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(created_raw)
            .to_string();

        for item in &order.line_items {
            let subtotal = item.price * item.quantity as f64;
            let discounts: f64 = item.discount_allocations.iter().map(|a| a.amount).sum();

            rows.push(LineItemRow {
                order_id,
                order_name: order.name.clone().unwrap_or_default(),
                created_at: created_local.to_string(),
                processed_at: processed_at.clone(),
                cancelled_at: order.cancelled_at.clone().unwrap_or_default(),
                customer_id: customer.and_then(|c| c.id),
                customer_type,
                source_name: source_name.clone(),
                landing_site: order.landing_site.clone().unwrap_or_default(),
                discount_codes: discount_codes.clone(),
                shipping_charged,
                refunds_total,
                line_item_id: item.id,
                sku: item.sku.clone().unwrap_or_default(),
                product_id: item.product_id,
                variant_id: item.variant_id,
                product_title: item.title.clone().unwrap_or_default(),
                variant_title: item.variant_title.clone().unwrap_or_default(),
                quantity: item.quantity,
                price: item.price,
                discount_allocations: discounts,
                subtotal,
                region: geo.region.clone(),
                country: geo.country.clone(),
                state: geo.state.clone(),
                source_key: source_key.clone(),
                channel: assignment.channel.clone(),
                sub_channel: assignment.sub_channel.clone(),
                date: buckets.date,
                week: buckets.week.clone(),
                month: buckets.month.clone(),
                quarter: buckets.quarter.clone(),
                year: buckets.year,
                gross_revenue: subtotal,
                discounts,
                net_revenue: subtotal - discounts,
                refund_share: 0.0,
            });
        }
    }
}

/// Sorted, deduplicated, `;`-joined codes. Empty codes are dropped.
pub fn join_codes<'s>(codes: impl IntoIterator<Item = &'s str>) -> String {
    codes
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(";")
}

/// Divide each order's refund total evenly over its rows and subtract the
/// share from net revenue.
pub fn apply_refund_shares(rows: &mut [LineItemRow]) {
    let mut per_order: HashMap<u64, usize> = HashMap::new();
    for row in rows.iter() {
        *per_order.entry(row.order_id).or_default() += 1;
    }

    for row in rows.iter_mut() {
        let count = per_order.get(&row.order_id).copied().unwrap_or(1).max(1);
        row.refund_share = row.refunds_total / count as f64;
        row.net_revenue = row.gross_revenue - row.discounts - row.refund_share;
    }
}

#[cfg(test)]
#[path = "flatten_tests.rs"]
mod tests;
