//! AI Response Validation
//!
//! Validation layer for model output ensuring:
//! - A JSON payload is recovered from prose or fenced text
//! - Every line item satisfies the schema and bounds
//! - Numeric fields are normalized to cents
//!
//! ## Design Philosophy
//! - Fail fast on any structural error; never repair or partially accept

mod extract;
mod line_items;

pub use extract::{extract_json_array, strip_code_fence};
pub use line_items::{validate_line_item, validate_line_items};

use crate::types::{LineItem, ValidationError};

/// Run raw model text through extraction and schema validation
pub fn parse_line_item_response(content: &str) -> Result<Vec<LineItem>, ValidationError> {
    let value = extract_json_array(content)?;
    validate_line_items(&value)
}
