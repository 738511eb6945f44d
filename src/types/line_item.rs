//! Line-item domain types.
//!
//! `LineItem` is the normalized form produced by the validator. Totals are
//! always derived by the pricing engine and carried separately so they can
//! never be mistaken for authoritative input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of measure for a line item's quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Ea,
    Sqft,
    Lnft,
    Job,
    Hr,
    Ton,
    Gal,
}

impl Unit {
    /// Every accepted unit, in the order they are listed to the model
    pub const ALL: [Unit; 7] = [
        Unit::Ea,
        Unit::Sqft,
        Unit::Lnft,
        Unit::Job,
        Unit::Hr,
        Unit::Ton,
        Unit::Gal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Ea => "ea",
            Unit::Sqft => "sqft",
            Unit::Lnft => "lnft",
            Unit::Job => "job",
            Unit::Hr => "hr",
            Unit::Ton => "ton",
            Unit::Gal => "gal",
        }
    }

    /// Comma-separated list used in prompts and rejection messages
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|u| u.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    /// Exact, case-sensitive match: the model is told the literal values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| format!("Unknown unit: {}. Valid values: {}", s, Self::allowed_list()))
    }
}

/// A validated, normalized estimate line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub unit: Unit,
    pub qty: f64,
    pub unit_cost: f64,
    pub labor_hours: f64,
    pub labor_rate: f64,
    pub markup_pct: f64,
    /// Position within the estimate, assigned by the validator
    #[serde(default)]
    pub sort_order: usize,
}

/// Derived money figures for one line item, each rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemTotals {
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub subtotal: f64,
    pub markup_amount: f64,
    pub final_total: f64,
}

/// Line item with server-computed totals flattened into the same object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    #[serde(flatten)]
    pub totals: LineItemTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trips_through_str() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_str().parse::<Unit>().unwrap(), unit);
        }
        assert!("SQFT".parse::<Unit>().is_err());
        assert!("m2".parse::<Unit>().is_err());
    }

    #[test]
    fn test_allowed_list() {
        assert_eq!(Unit::allowed_list(), "ea, sqft, lnft, job, hr, ton, gal");
    }

    #[test]
    fn test_priced_item_serializes_flat_camel_case() {
        let priced = PricedLineItem {
            item: LineItem {
                name: "Drywall".to_string(),
                description: "Hang and finish".to_string(),
                unit: Unit::Sqft,
                qty: 120.0,
                unit_cost: 1.85,
                labor_hours: 6.0,
                labor_rate: 55.0,
                markup_pct: 15.0,
                sort_order: 2,
            },
            totals: LineItemTotals {
                materials_cost: 222.0,
                labor_cost: 330.0,
                subtotal: 552.0,
                markup_amount: 82.8,
                final_total: 634.8,
            },
        };

        let json = serde_json::to_value(&priced).unwrap();
        assert_eq!(json["unit"], "sqft");
        assert_eq!(json["unitCost"], 1.85);
        assert_eq!(json["sortOrder"], 2);
        assert_eq!(json["finalTotal"], 634.8);
        assert!(json.get("item").is_none());
    }
}
