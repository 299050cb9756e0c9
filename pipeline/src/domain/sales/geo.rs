//! Geography resolution for orders

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::data::types::RawOrder;

/// Placeholder for any geography field that cannot be resolved
pub const UNKNOWN: &str = "Unknown";

/// US state code -> census region
pub static US_REGIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    const NORTHEAST: &[&str] = &["CT", "ME", "MA", "NH", "NJ", "NY", "PA", "RI", "VT"];
    const MIDWEST: &[&str] = &[
        "IL", "IN", "IA", "KS", "MI", "MN", "MO", "NE", "ND", "OH", "SD", "WI",
    ];
    const SOUTH: &[&str] = &[
        "AL", "AR", "DE", "FL", "GA", "KY", "LA", "MD", "MS", "NC", "OK", "SC", "TN", "TX", "VA",
        "WV",
    ];
    const WEST: &[&str] = &[
        "AK", "AZ", "CA", "CO", "HI", "ID", "MT", "NV", "NM", "OR", "UT", "WA", "WY",
    ];

    [
        (NORTHEAST, "Northeast"),
        (MIDWEST, "Midwest"),
        (SOUTH, "South"),
        (WEST, "West"),
    ]
    .into_iter()
    .flat_map(|(states, region)| states.iter().map(move |s| (*s, region)))
    .collect()
});

/// Resolved region/country/state of an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub region: String,
    pub country: String,
    pub state: String,
}

/// Resolves order geography against a state -> region table
#[derive(Debug, Clone, Copy)]
pub struct GeoResolver<'a> {
    regions: &'a HashMap<&'static str, &'static str>,
}

impl Default for GeoResolver<'static> {
    fn default() -> Self {
        Self::new(&US_REGIONS)
    }
}

impl<'a> GeoResolver<'a> {
    pub fn new(regions: &'a HashMap<&'static str, &'static str>) -> Self {
        Self { regions }
    }

    /// Region of a state code (case-insensitive), `Unknown` when unmapped
    pub fn region_for(&self, state: &str) -> &'a str {
        self.regions
            .get(state.trim().to_uppercase().as_str())
            .copied()
            .unwrap_or(UNKNOWN)
    }

    /// Pre-enriched fields win, then the shipping address, then billing.
    /// State codes are upper-cased; anything unresolved is `Unknown`.
    pub fn resolve(&self, order: &RawOrder) -> GeoLocation {
        let shipping = order.shipping_address.as_ref();
        let billing = order.billing_address.as_ref();

        let state = non_empty(order.state.as_deref())
            .or_else(|| non_empty(shipping.and_then(|a| a.province_code.as_deref())))
            .or_else(|| non_empty(billing.and_then(|a| a.province_code.as_deref())));
        let country = non_empty(order.country.as_deref())
            .or_else(|| non_empty(shipping.and_then(|a| a.country.as_deref())))
            .or_else(|| non_empty(billing.and_then(|a| a.country.as_deref())));

        let region = match (non_empty(order.region.as_deref()), state) {
            (Some(region), _) => region.to_string(),
            (None, Some(state)) => self.region_for(state).to_string(),
            (None, None) => UNKNOWN.to_string(),
        };

        GeoLocation {
            region,
            country: country.unwrap_or(UNKNOWN).to_string(),
            state: state.map_or_else(|| UNKNOWN.to_string(), str::to_uppercase),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
