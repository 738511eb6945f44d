//! Line-Item Validation
//!
//! Enforces the line-item schema over untrusted model output and normalizes
//! numeric precision. Container checks run first; then each item is checked
//! field by field in a fixed order and the first failure rejects the whole
//! batch. A partially valid batch is never returned.

use serde_json::{Map, Value};

use crate::constants::line_item as bounds;
use crate::pricing::round2;
use crate::types::{LineItem, Unit, ValidationError, ValidationErrorKind};

/// Validate and normalize a parsed model response into ordered line items
pub fn validate_line_items(raw: &Value) -> Result<Vec<LineItem>, ValidationError> {
    let items = raw.as_array().ok_or_else(|| {
        ValidationError::new(ValidationErrorKind::NotArray, "AI response is not an array")
    })?;

    if !(bounds::MIN_ITEMS..=bounds::MAX_ITEMS).contains(&items.len()) {
        return Err(ValidationError::new(
            ValidationErrorKind::Length,
            format!(
                "Expected {}-{} line items, got {}",
                bounds::MIN_ITEMS,
                bounds::MAX_ITEMS,
                items.len()
            ),
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_line_item(item, index))
        .collect()
}

/// Validate a single item, returning the normalized form
pub fn validate_line_item(item: &Value, index: usize) -> Result<LineItem, ValidationError> {
    let obj = item.as_object().ok_or_else(|| {
        ValidationError::item(index, ValidationErrorKind::NotObject, "not an object")
    })?;

    let name = non_empty_string(obj, "name", index)?;
    let description = non_empty_string(obj, "description", index)?;

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Unit>().ok())
        .ok_or_else(|| {
            field_error(
                index,
                "unit",
                format!("unit must be one of {}", Unit::allowed_list()),
            )
        })?;

    // checked after rounding too, so a normalized item always re-validates
    let qty = number(
        obj,
        "qty",
        index,
        |n| n > 0.0 && round2(n) > 0.0,
        "qty must be a number > 0",
    )?;
    let unit_cost = number(
        obj,
        "unitCost",
        index,
        |n| n >= 0.0,
        "unitCost must be a number >= 0",
    )?;
    let labor_hours = number(
        obj,
        "laborHours",
        index,
        |n| n >= 0.0,
        "laborHours must be a number >= 0",
    )?;
    let labor_rate = number(
        obj,
        "laborRate",
        index,
        |n| (bounds::LABOR_RATE_MIN..=bounds::LABOR_RATE_MAX).contains(&n),
        &format!(
            "laborRate must be between {} and {}",
            bounds::LABOR_RATE_MIN,
            bounds::LABOR_RATE_MAX
        ),
    )?;
    let markup_pct = number(
        obj,
        "markupPct",
        index,
        |n| (bounds::MARKUP_PCT_MIN..=bounds::MARKUP_PCT_MAX).contains(&n),
        &format!(
            "markupPct must be between {} and {}",
            bounds::MARKUP_PCT_MIN,
            bounds::MARKUP_PCT_MAX
        ),
    )?;

    Ok(LineItem {
        name,
        description,
        unit,
        qty: round2(qty),
        unit_cost: round2(unit_cost),
        labor_hours: round2(labor_hours),
        labor_rate: round2(labor_rate),
        markup_pct: round2(markup_pct),
        sort_order: index,
    })
}

fn field_error(index: usize, field: &'static str, detail: impl AsRef<str>) -> ValidationError {
    ValidationError::item(index, ValidationErrorKind::Field, detail).with_field(field)
}

fn non_empty_string(
    obj: &Map<String, Value>,
    field: &'static str,
    index: usize,
) -> Result<String, ValidationError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| field_error(index, field, format!("{} must be a non-empty string", field)))
}

/// A JSON number that is finite and satisfies `accept`; strings never coerce
fn number(
    obj: &Map<String, Value>,
    field: &'static str,
    index: usize,
    accept: impl Fn(f64) -> bool,
    detail: &str,
) -> Result<f64, ValidationError> {
    obj.get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && accept(*n))
        .ok_or_else(|| field_error(index, field, detail))
}
