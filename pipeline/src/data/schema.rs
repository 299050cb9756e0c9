//! Column contracts for the persisted tables
//!
//! The sales fact table is merged across runs, so its header is validated
//! structurally before any persisted rows are reused. A table that drifted
//! from the contract is rebuilt from the current batch.

use thiserror::Error;

/// Sales fact table columns, in file order
pub const FACT_COLUMNS: [&str; 27] = [
    "date",
    "channel",
    "order_id",
    "sku",
    "product_title",
    "variant_title",
    "week",
    "month",
    "quarter",
    "year",
    "units",
    "gross_revenue",
    "discounts",
    "shipping_charged",
    "refunds",
    "net_revenue",
    "region",
    "customer_type",
    "source",
    "promo_code",
    "promo_cost",
    "platform_fees",
    "COGS",
    "gross_margin",
    "country",
    "state",
    "sub_channel",
];

/// Line-item snapshot columns, in file order
pub const LINE_ITEM_COLUMNS: [&str; 36] = [
    "order_id",
    "order_name",
    "created_at",
    "processed_at",
    "cancelled_at",
    "customer_id",
    "customer_type",
    "source_name",
    "landing_site",
    "discount_codes",
    "shipping_charged",
    "refunds_total",
    "line_item_id",
    "sku",
    "product_id",
    "variant_id",
    "product_title",
    "variant_title",
    "quantity",
    "price",
    "discount_allocations",
    "subtotal",
    "region",
    "country",
    "state",
    "source_key",
    "channel",
    "sub_channel",
    "date",
    "week",
    "month",
    "quarter",
    "year",
    "gross_revenue",
    "discounts",
    "net_revenue",
];

/// Columns written by older table layouts (per-SKU order counts)
pub const LEGACY_COLUMNS: [&str; 1] = ["orders"];

/// Why a persisted header is incompatible with [`FACT_COLUMNS`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDrift {
    #[error("legacy columns present: {}", .0.join(", "))]
    Legacy(Vec<String>),

    #[error("missing columns: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// Check a persisted header against the fact table contract.
///
/// Legacy columns are reported before missing ones. Extra unknown columns
/// and column order are tolerated since rows are read by name.
pub fn validate_header<S: AsRef<str>>(header: &[S]) -> Result<(), SchemaDrift> {
    let names: Vec<&str> = header.iter().map(|h| h.as_ref().trim()).collect();

    let legacy: Vec<String> = LEGACY_COLUMNS
        .iter()
        .filter(|c| names.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if !legacy.is_empty() {
        return Err(SchemaDrift::Legacy(legacy));
    }

    let missing: Vec<String> = FACT_COLUMNS
        .iter()
        .filter(|c| !names.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaDrift::Missing(missing));
    }

    Ok(())
}
