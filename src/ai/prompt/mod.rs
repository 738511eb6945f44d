//! Prompt Builder
//!
//! Plain-text prompt construction for estimator calls.
//! Prompts are assembled from ordered sections so the structure stays
//! consistent across templates.
//!
//! ## Templates
//!
//! - `line_item_suggestion`: Job description → 4-8 priced line items (strict JSON array)
//! - `description_score`: Job description → `{score, tips}` JSON object

use crate::constants::line_item::{
    LABOR_RATE_MAX, LABOR_RATE_MIN, MARKUP_PCT_MAX, MARKUP_PCT_MIN, MAX_ITEMS, MIN_ITEMS,
};
use crate::types::Unit;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Free text paragraph
    Text(String),
    /// Header line followed by a body
    Section { header: String, body: String },
    /// Bullet list under a header
    Bullets { header: String, items: Vec<String> },
    /// Labeled user input, quoted
    Input { label: String, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text(content.to_string()));
        self
    }

    /// Add a text section with header
    pub fn section(mut self, header: &str, body: &str) -> Self {
        self.sections.push(PromptSection::Section {
            header: header.to_string(),
            body: body.to_string(),
        });
        self
    }

    pub fn bullets<S: AsRef<str>>(mut self, header: &str, items: &[S]) -> Self {
        self.sections.push(PromptSection::Bullets {
            header: header.to_string(),
            items: items.iter().map(|s| s.as_ref().to_string()).collect(),
        });
        self
    }

    /// Add a quoted input value
    pub fn input(mut self, label: &str, value: &str) -> Self {
        self.sections.push(PromptSection::Input {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Add a section only when `value` is present
    pub fn optional_text(self, value: Option<String>) -> Self {
        match value {
            Some(text) => self.text(&text),
            None => self,
        }
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let rendered: Vec<String> = self
            .sections
            .into_iter()
            .map(|section| match section {
                PromptSection::Text(content) => content,
                PromptSection::Section { header, body } => format!("{}\n\n{}", header, body),
                PromptSection::Bullets { header, items } => {
                    let list: Vec<String> = items.iter().map(|i| format!("- {}", i)).collect();
                    format!("{}\n\n{}", header, list.join("\n"))
                }
                PromptSection::Input { label, value } => format!("{}\n\"{}\"", label, value),
            })
            .collect();

        rendered.join("\n\n")
    }
}

/// Standard prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Prompt asking for a strict JSON array of line items
    pub fn line_item_suggestion(job_type: Option<&str>, description: &str) -> String {
        let units: Vec<String> = Unit::ALL.iter().map(|u| format!("\"{}\"", u)).collect();
        let fields = [
            "name (string)".to_string(),
            "description (string)".to_string(),
            format!("unit (string: one of {})", units.join(",")),
            "qty (number > 0)".to_string(),
            "unitCost (number >= 0)".to_string(),
            "laborHours (number >= 0)".to_string(),
            format!(
                "laborRate (number between {} and {})",
                LABOR_RATE_MIN, LABOR_RATE_MAX
            ),
            format!(
                "markupPct (number between {} and {})",
                MARKUP_PCT_MIN, MARKUP_PCT_MAX
            ),
        ];

        PromptBuilder::new()
            .text(
                "You are a senior U.S. construction cost estimator with 20+ years of field experience.",
            )
            .text(
                "Your job is to convert a short job description into a professional estimate breakdown.",
            )
            .text(
                "You MUST return STRICT JSON only.\nNo markdown.\nNo commentary.\nNo explanations.\nNo backticks.\nNo text before or after the JSON.",
            )
            .section(
                "OUTPUT REQUIREMENTS:",
                &format!(
                    "Return a JSON array of {} to {} line item objects.",
                    MIN_ITEMS, MAX_ITEMS
                ),
            )
            .bullets("Each object MUST contain exactly these fields:", &fields)
            .text("DO NOT include totalCost.\nTotals will be calculated server-side.")
            .bullets(
                "PRICING RULES:",
                &[
                    "Assume United States residential pricing.",
                    "Use realistic material pricing.",
                    "Use realistic labor hours for scope.",
                    "If dimensions are provided, calculate reasonable quantities.",
                    "Do NOT inflate pricing.",
                    "Do NOT use placeholder values.",
                    "Avoid round numbers when unrealistic (e.g., 1000, 5000).",
                    "Prefer practical field logic (waste factor, hardware, fasteners).",
                ],
            )
            .bullets(
                "STRUCTURE RULES:",
                &[
                    "Return valid JSON.",
                    "No trailing commas.",
                    "Use double quotes only.",
                    "Ensure all numbers are actual numbers (not strings).",
                ],
            )
            .text("If the job description is vague, make reasonable professional assumptions.")
            .optional_text(
                job_type
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| format!("Job Type: {}", t)),
            )
            .input("JOB DESCRIPTION:", description)
            .build()
    }

    /// Prompt asking for a completeness score and improvement tips
    pub fn description_score(description: &str) -> String {
        PromptBuilder::new()
            .text(
                "You are helping a contractor write a better project description for a construction/home improvement estimate. Evaluate the following description and return a JSON object with:\n- \"score\": a number from 0 to 10 rating how complete and detailed the description is for generating an accurate cost estimate\n- \"tips\": an array of 2-4 short, specific tips to improve the description (each tip should be a single sentence)",
            )
            .text(
                "Focus on: specificity of measurements, materials mentioned, scope clarity, and whether it has enough detail for accurate pricing.",
            )
            .text(&format!("Description: \"{}\"", description))
            .text("Return ONLY valid JSON, no other text.")
            .build()
    }
}
