//! Job Description Scoring
//!
//! Two scorers rate how well a description supports accurate pricing:
//!
//! - [`score_description`]: local keyword heuristic, no network
//! - [`DescriptionScorer`]: asks the first available provider for a score and tips

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ai::provider::ProviderGateway;
use crate::ai::{PromptTemplates, strip_code_fence};
use crate::constants::scoring::{MAX_SCORE, MAX_TIPS};
use crate::types::{EstimateError, Result};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(\.\d+)?\b").expect("number pattern is valid"));

static DIMENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d+\s*(sq\s*ft|sqft|square\s*feet|lnft|linear\s*feet|ft|feet|inches|in|yards|yd|meters|m|cm)\b",
    )
    .expect("dimension pattern is valid")
});

static MATERIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(wood|lumber|tile|ceramic|porcelain|granite|marble|quartz|laminate|vinyl|carpet|hardwood|concrete|drywall|plywood|shingles|metal|steel|aluminum|copper|pvc|pipe|wire|paint|stain|grout|mortar|insulation|fiberglass|foam)\b",
    )
    .expect("material pattern is valid")
});

static SCOPE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(install|replace|repair|remove|demolish|build|construct|remodel|renovate|upgrade|refinish|resurface|paint|tile|plumb|wire|frame|insulate|seal|waterproof|grade|excavate|pour)\b",
    )
    .expect("scope verb pattern is valid")
});

// =============================================================================
// Local Heuristic
// =============================================================================

/// Per-category points; the maximums sum to 10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0-2
    pub length: u8,
    /// 0-3
    pub specificity: u8,
    /// 0-2
    pub dimensions: u8,
    /// 0-2
    pub materials: u8,
    /// 0-1
    pub scope: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        self.length + self.specificity + self.dimensions + self.materials + self.scope
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub label: String,
    pub breakdown: ScoreBreakdown,
}

pub fn score_label(score: u8) -> &'static str {
    match score {
        0..=2 => "Needs more detail",
        3..=4 => "Basic",
        5..=6 => "Good",
        7..=8 => "Detailed",
        _ => "Excellent",
    }
}

/// Score a description locally from its length, numbers, and vocabulary
pub fn score_description(text: &str) -> ScoreResult {
    let trimmed = text.trim();
    let words = trimmed.split_whitespace().count();
    let numbers = NUMBER.find_iter(trimmed).count();
    let dimensions = DIMENSION.find_iter(trimmed).count();
    let materials: HashSet<String> = MATERIAL
        .find_iter(trimmed)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let breakdown = ScoreBreakdown {
        length: match words {
            0..=9 => 0,
            10..=29 => 1,
            _ => 2,
        },
        specificity: numbers.min(3) as u8,
        dimensions: dimensions.min(2) as u8,
        materials: materials.len().min(2) as u8,
        scope: u8::from(SCOPE_VERB.is_match(trimmed)),
    };

    let score = breakdown.total();
    ScoreResult {
        score,
        label: score_label(score).to_string(),
        breakdown,
    }
}

/// Fixed improvement tips for each deficient category
pub fn static_tips(breakdown: &ScoreBreakdown) -> Vec<String> {
    let checks = [
        (
            breakdown.length < 2,
            "Add more detail — aim for at least 30 words describing the scope of work",
        ),
        (
            breakdown.specificity < 2,
            "Include specific quantities (e.g. number of rooms, fixtures, or areas)",
        ),
        (
            breakdown.dimensions < 1,
            "Include measurements or dimensions (e.g. '200 sqft kitchen', '12ft ceiling')",
        ),
        (
            breakdown.materials < 1,
            "Mention specific materials (e.g. 'granite countertops', 'vinyl plank flooring')",
        ),
        (
            breakdown.scope < 1,
            "Use action verbs to describe the work (e.g. 'install', 'replace', 'remodel')",
        ),
    ];

    checks
        .into_iter()
        .filter(|(deficient, _)| *deficient)
        .map(|(_, tip)| tip.to_string())
        .collect()
}

// =============================================================================
// AI Scoring
// =============================================================================

/// Provider-assessed score, clamped to 0-10 with at most four tips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiScore {
    pub score: f64,
    pub tips: Vec<String>,
}

impl AiScore {
    /// Interpret a model answer, tolerating a markdown fence around the object
    pub fn parse(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(strip_code_fence(content).trim())?;

        let score = match value.get("score") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        let score = if score.is_finite() {
            score.clamp(0.0, f64::from(MAX_SCORE))
        } else {
            0.0
        };

        let tips = value
            .get("tips")
            .and_then(Value::as_array)
            .map(|tips| {
                tips.iter()
                    .filter_map(Value::as_str)
                    .take(MAX_TIPS)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { score, tips })
    }
}

pub struct DescriptionScorer {
    gateway: Arc<ProviderGateway>,
}

impl DescriptionScorer {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self { gateway }
    }

    /// Ask the first available provider to rate `description`
    pub async fn score(&self, description: &str) -> Result<AiScore> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EstimateError::input("Description is required"));
        }

        let prompt = PromptTemplates::description_score(description);
        let completion = self.gateway.call_provider("", &prompt).await?;
        let content = completion.content.ok_or_else(|| EstimateError::EmptyResponse {
            provider: completion.provider.clone(),
        })?;

        debug!(provider = %completion.provider, "Description score received");
        AiScore::parse(&content)
    }
}
