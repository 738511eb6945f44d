//! Pricing Engine
//!
//! Deterministic money math for line items. Every figure is rounded to cents
//! from its own raw value; rounded components are never fed back into
//! further arithmetic.
//!
//! The engine only computes. It does not enforce validator bounds, so zero
//! quantities or hours simply yield zero components.

use serde::{Deserialize, Serialize};

use crate::types::{LineItem, LineItemTotals, PricedLineItem};

/// The five numeric inputs the engine prices
pub trait PricingInputs {
    fn qty(&self) -> f64;
    fn unit_cost(&self) -> f64;
    fn labor_hours(&self) -> f64;
    fn labor_rate(&self) -> f64;
    fn markup_pct(&self) -> f64;
}

impl PricingInputs for LineItem {
    fn qty(&self) -> f64 {
        self.qty
    }
    fn unit_cost(&self) -> f64 {
        self.unit_cost
    }
    fn labor_hours(&self) -> f64 {
        self.labor_hours
    }
    fn labor_rate(&self) -> f64 {
        self.labor_rate
    }
    fn markup_pct(&self) -> f64 {
        self.markup_pct
    }
}

impl PricingInputs for PricedLineItem {
    fn qty(&self) -> f64 {
        self.item.qty
    }
    fn unit_cost(&self) -> f64 {
        self.item.unit_cost
    }
    fn labor_hours(&self) -> f64 {
        self.item.labor_hours
    }
    fn labor_rate(&self) -> f64 {
        self.item.labor_rate
    }
    fn markup_pct(&self) -> f64 {
        self.item.markup_pct
    }
}

/// Round to 2 decimal places, half away from zero
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Unrounded component figures shared by line and estimate totals
#[derive(Debug, Clone, Copy)]
struct RawTotals {
    materials: f64,
    labor: f64,
    markup: f64,
}

impl RawTotals {
    fn of(item: &impl PricingInputs) -> Self {
        let materials = item.qty() * item.unit_cost();
        let labor = item.labor_hours() * item.labor_rate();
        let markup = (materials + labor) * item.markup_pct() / 100.0;
        Self {
            materials,
            labor,
            markup,
        }
    }
}

/// Compute line totals from the five numeric inputs
pub fn calculate_line_item_totals(item: &impl PricingInputs) -> LineItemTotals {
    let raw = RawTotals::of(item);
    let subtotal = raw.materials + raw.labor;

    LineItemTotals {
        materials_cost: round2(raw.materials),
        labor_cost: round2(raw.labor),
        subtotal: round2(subtotal),
        markup_amount: round2(raw.markup),
        final_total: round2(subtotal + raw.markup),
    }
}

/// Attach server-computed totals to a line item
pub fn price_line_item(item: LineItem) -> PricedLineItem {
    let totals = calculate_line_item_totals(&item);
    PricedLineItem { item, totals }
}

/// Estimate-level roll-up shown on share pages and PDFs
///
/// Sums raw component values across items and rounds once at the end.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub total_materials: f64,
    pub total_labor: f64,
    pub total_markup: f64,
    pub grand_total: f64,
}

impl EstimateSummary {
    pub fn from_items<T: PricingInputs>(items: &[T]) -> Self {
        let (materials, labor, markup) = items.iter().map(RawTotals::of).fold(
            (0.0, 0.0, 0.0),
            |(m, l, k), raw| (m + raw.materials, l + raw.labor, k + raw.markup),
        );

        Self {
            total_materials: round2(materials),
            total_labor: round2(labor),
            total_markup: round2(markup),
            grand_total: round2(materials + labor + markup),
        }
    }
}
