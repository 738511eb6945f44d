//! Score Command
//!
//! Rate how complete a job description is. Local scoring needs no provider.

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::estimate::{DescriptionScorer, score_description, static_tips};
use crate::types::{EstimateError, Result};

pub async fn run(description: &str, ai: bool, json: bool) -> Result<()> {
    let out = Output::new();

    if ai {
        let ctx = CommandContext::load()?;
        let scored = DescriptionScorer::new(ctx.gateway()?)
            .score(description)
            .await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&scored)?);
            return Ok(());
        }

        out.section("AI Description Score");
        out.score(scored.score.round() as u8);
        for tip in &scored.tips {
            out.bullet(tip);
        }
        return Ok(());
    }

    if description.trim().is_empty() {
        return Err(EstimateError::input("Description is required"));
    }

    let result = score_description(description);
    let tips = static_tips(&result.breakdown);

    if json {
        let body = serde_json::json!({
            "score": result.score,
            "label": result.label,
            "breakdown": result.breakdown,
            "tips": tips,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    out.section("Description Score");
    out.score(result.score);
    out.field("Length", result.breakdown.length);
    out.field("Specificity", result.breakdown.specificity);
    out.field("Dimensions", result.breakdown.dimensions);
    out.field("Materials", result.breakdown.materials);
    out.field("Scope", result.breakdown.scope);

    if !tips.is_empty() {
        println!();
        for tip in &tips {
            out.bullet(tip);
        }
    }
    Ok(())
}
