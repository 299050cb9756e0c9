//! Enum types shared by the line-item and fact tables

use std::fmt;

use serde::{Deserialize, Serialize};

/// Customer classification of an order or fact group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    /// First order from a known customer
    New,
    /// Customer with more than one order on record
    Repeat,
    /// Fact group spanning more than one customer type
    Mixed,
    /// No customer record on the order
    Unknown,
}

impl CustomerType {
    /// Classify an order from its customer record
    pub fn classify(customer_present: bool, orders_count: Option<i64>) -> Self {
        if orders_count.unwrap_or(0) > 1 {
            Self::Repeat
        } else if customer_present {
            Self::New
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Repeat => "Repeat",
            Self::Mixed => "Mixed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(CustomerType::classify(true, Some(3)), CustomerType::Repeat);
        assert_eq!(CustomerType::classify(true, Some(1)), CustomerType::New);
        assert_eq!(CustomerType::classify(true, None), CustomerType::New);
        assert_eq!(CustomerType::classify(false, None), CustomerType::Unknown);
    }

    #[test]
    fn test_serde_uses_variant_names() {
        assert_eq!(
            serde_json::to_string(&CustomerType::Mixed).unwrap(),
            "\"Mixed\""
        );
        let parsed: CustomerType = serde_json::from_str("\"Repeat\"").unwrap();
        assert_eq!(parsed, CustomerType::Repeat);
        assert_eq!(CustomerType::Unknown.to_string(), "Unknown");
    }
}
