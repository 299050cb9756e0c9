//! Tests for line-item flattening

use super::*;
use chrono::NaiveDate;
use serde_json::json;

use crate::data::ChannelMapping;

fn orders(value: serde_json::Value) -> Vec<RawOrder> {
    serde_json::from_value(value).unwrap()
}

fn flatten_with(channels: &ChannelMap, value: serde_json::Value) -> Vec<LineItemRow> {
    let flattener = Flattener::new(
        GeoResolver::default(),
        channels,
        chrono_tz::America::New_York,
    );
    flattener.flatten_batch(&orders(value))
}

fn flatten(value: serde_json::Value) -> Vec<LineItemRow> {
    flatten_with(&ChannelMap::default(), value)
}

fn item(sku: &str, quantity: i64, price: &str) -> serde_json::Value {
    json!({ "id": 1, "sku": sku, "title": "Tee", "quantity": quantity, "price": price })
}

// === Refund Pro-ration ===

#[test]
fn test_refund_split_evenly_across_line_items() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T12:00:00Z",
        "refunds": [{ "transactions": [{ "amount": "30.00" }] }],
        "line_items": [item("A", 1, "10"), item("B", 2, "10"), item("C", 1, "40")]
    }]));

    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.refunds_total, 30.0);
        assert_eq!(row.refund_share, 10.0);
    }
    let nets: Vec<f64> = rows.iter().map(|r| r.net_revenue).collect();
    assert_eq!(nets, vec![0.0, 10.0, 30.0]);
}

#[test]
fn test_only_first_refund_transaction_counted() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T12:00:00Z",
        "refunds": [
            { "transactions": [{ "amount": 5 }, { "amount": 100 }] },
            { "transactions": [{ "amount": "2.5" }] },
            { "transactions": [] }
        ],
        "line_items": [item("A", 1, "50")]
    }]));
    assert_eq!(rows[0].refunds_total, 7.5);
    assert_eq!(rows[0].net_revenue, 42.5);
}

#[test]
fn test_refund_shares_are_per_order() {
    let rows = flatten(json!([
        {
            "id": 1,
            "created_at": "2024-01-15T12:00:00Z",
            "refunds": [{ "transactions": [{ "amount": 10 }] }],
            "line_items": [item("A", 1, "10"), item("B", 1, "10")]
        },
        {
            "id": 2,
            "created_at": "2024-01-15T12:00:00Z",
            "line_items": [item("A", 1, "10")]
        }
    ]));
    let shares: Vec<(u64, f64)> = rows.iter().map(|r| (r.order_id, r.refund_share)).collect();
    assert_eq!(shares, vec![(1, 5.0), (1, 5.0), (2, 0.0)]);
}

// === Metrics ===

#[test]
fn test_line_metrics() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T12:00:00Z",
        "shipping_lines": [{ "price": "4.00" }, { "price": 1.5 }],
        "line_items": [{
            "id": 11, "sku": "A", "quantity": 3, "price": "12.00",
            "discount_allocations": [{ "amount": "3.00" }, { "amount": "1.00" }]
        }, {
            "id": 12, "quantity": 1, "price": "8.00"
        }]
    }]));

    let first = &rows[0];
    assert_eq!(first.subtotal, 36.0);
    assert_eq!(first.gross_revenue, 36.0);
    assert_eq!(first.discount_allocations, 4.0);
    assert_eq!(first.discounts, 4.0);
    assert_eq!(first.net_revenue, 32.0);
    assert_eq!(first.shipping_charged, 5.5);
    assert_eq!(first.line_item_id, Some(11));

    // Shipping is duplicated, not split
    assert_eq!(rows[1].shipping_charged, 5.5);
    assert_eq!(rows[1].sku, "");
}

#[test]
fn test_discount_codes_sorted_and_unique() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T12:00:00Z",
        "discount_codes": [{ "code": "SPRING" }, { "code": "" }, { "code": "ALPHA" }, { "code": "SPRING" }],
        "line_items": [item("A", 1, "10")]
    }]));
    assert_eq!(rows[0].discount_codes, "ALPHA;SPRING");
}

#[test]
fn test_join_codes_empty() {
    assert_eq!(join_codes(Vec::<&str>::new()), "");
    assert_eq!(join_codes(["", " "]), "");
}

// === Customer ===

#[test]
fn test_customer_classification() {
    let rows = flatten(json!([
        { "id": 1, "created_at": "2024-01-15", "customer": { "id": 5, "orders_count": 4 }, "line_items": [item("A", 1, "1")] },
        { "id": 2, "created_at": "2024-01-15", "customer": { "id": 6, "orders_count": 1 }, "line_items": [item("A", 1, "1")] },
        { "id": 3, "created_at": "2024-01-15", "customer": null, "line_items": [item("A", 1, "1")] },
        { "id": 4, "created_at": "2024-01-15", "customer": {}, "line_items": [item("A", 1, "1")] }
    ]));
    let types: Vec<CustomerType> = rows.iter().map(|r| r.customer_type).collect();
    assert_eq!(
        types,
        vec![
            CustomerType::Repeat,
            CustomerType::New,
            CustomerType::Unknown,
            CustomerType::Unknown
        ]
    );
    assert_eq!(rows[0].customer_id, Some(5));
    assert_eq!(rows[2].customer_id, None);
}

// === Time ===

#[test]
fn test_calendar_buckets_use_business_timezone() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-04-01T02:30:00Z",
        "line_items": [item("A", 1, "10")]
    }]));
    let row = &rows[0];
    // 02:30 UTC is the previous evening in New York
    assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    assert_eq!(row.month, "2024-03");
    assert_eq!(row.quarter, "2024Q1");
    assert_eq!(row.week, "2024-03-25/2024-03-31");
    assert_eq!(row.year, 2024);
    assert_eq!(row.created_at, "2024-03-31T22:30:00-04:00");
}

#[test]
fn test_offset_timestamp_respected() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T23:30:00-05:00",
        "line_items": [item("A", 1, "10")]
    }]));
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
}

#[test]
fn test_processed_at_defaults_to_created_at() {
    let rows = flatten(json!([
        { "id": 1, "created_at": "2024-01-15T12:00:00Z", "line_items": [item("A", 1, "1")] },
        { "id": 2, "created_at": "2024-01-15T12:00:00Z", "processed_at": "2024-01-16T08:00:00Z",
          "cancelled_at": "2024-01-17T08:00:00Z", "line_items": [item("A", 1, "1")] }
    ]));
    assert_eq!(rows[0].processed_at, "2024-01-15T12:00:00Z");
    assert_eq!(rows[0].cancelled_at, "");
    assert_eq!(rows[1].processed_at, "2024-01-16T08:00:00Z");
    assert_eq!(rows[1].cancelled_at, "2024-01-17T08:00:00Z");
}

#[test]
fn test_orders_without_valid_created_at_dropped() {
    let rows = flatten(json!([
        { "id": 1, "line_items": [item("A", 1, "1")] },
        { "id": 2, "created_at": "", "line_items": [item("A", 1, "1")] },
        { "id": 3, "created_at": "not a date", "line_items": [item("A", 1, "1")] },
        { "id": 4, "created_at": "2024-01-15T12:00:00Z", "line_items": [item("A", 1, "1")] }
    ]));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].order_id, 4);
}

#[test]
fn test_order_without_line_items_emits_nothing() {
    let rows = flatten(json!([{ "id": 1, "created_at": "2024-01-15T12:00:00Z", "line_items": [] }]));
    assert!(rows.is_empty());
}

// === Channel & Geo ===

#[test]
fn test_channel_assignment() {
    let channels = ChannelMap::new(vec![ChannelMapping {
        source_key: "pos".to_string(),
        channel: "Retail".to_string(),
        sub_channel: "POS".to_string(),
    }]);
    let rows = flatten_with(
        &channels,
        json!([
            { "id": 1, "created_at": "2024-01-15", "source_name": "POS", "line_items": [item("A", 1, "1")] },
            { "id": 2, "created_at": "2024-01-15", "source_name": "web", "line_items": [item("A", 1, "1")] },
            { "id": 3, "created_at": "2024-01-15", "line_items": [item("A", 1, "1")] }
        ]),
    );

    assert_eq!(rows[0].source_key, "pos");
    assert_eq!((rows[0].channel.as_str(), rows[0].sub_channel.as_str()), ("Retail", "POS"));
    assert_eq!((rows[1].channel.as_str(), rows[1].sub_channel.as_str()), ("Shopify", "Online Store"));
    assert_eq!(rows[2].source_name, "");
    assert_eq!(rows[2].channel, "Shopify");
}

#[test]
fn test_geo_carried_to_rows() {
    let rows = flatten(json!([{
        "id": 1,
        "created_at": "2024-01-15T12:00:00Z",
        "shipping_address": { "province_code": "tx", "country": "US" },
        "line_items": [item("A", 1, "1"), item("B", 1, "1")]
    }]));
    for row in &rows {
        assert_eq!(row.state, "TX");
        assert_eq!(row.region, "South");
        assert_eq!(row.country, "US");
    }
}
