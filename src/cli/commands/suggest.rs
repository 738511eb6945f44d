//! Suggest Command
//!
//! Generate priced line items for a job description.
//!
//! Usage:
//!   jobquote suggest "Retile 120 sqft bathroom floor" [--job-type Bathroom] [--provider groq]

use console::style;

use crate::cli::CommandContext;
use crate::cli::ui::{Output, money};
use crate::estimate::{SuggestionOrchestrator, SuggestionRequest};
use crate::pricing::EstimateSummary;
use crate::types::Result;

pub struct SuggestOptions {
    pub description: String,
    pub job_type: Option<String>,
    pub provider: Option<String>,
    pub json: bool,
}

pub async fn run(options: SuggestOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let orchestrator = SuggestionOrchestrator::new(ctx.gateway()?);

    let request = SuggestionRequest {
        job_type: options.job_type,
        description: options.description,
        provider: options.provider,
    };
    let outcome = orchestrator.suggest(&request).await?;
    let summary = EstimateSummary::from_items(&outcome.line_items);

    if options.json {
        let body = serde_json::json!({
            "lineItems": outcome.line_items,
            "provider": outcome.provider,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let out = Output::new();
    out.header(&format!("Suggested line items ({})", outcome.provider));

    for line in &outcome.line_items {
        println!(
            "\n  {} {}",
            style(format!("{}.", line.item.sort_order + 1)).dim(),
            style(&line.item.name).bold()
        );
        println!("     {}", line.item.description);
        println!(
            "     {} {} × {}  +  {}h × {}  +  {}%",
            line.item.qty,
            line.item.unit,
            money(line.item.unit_cost),
            line.item.labor_hours,
            money(line.item.labor_rate),
            line.item.markup_pct
        );
        println!("     {}", style(money(line.totals.final_total)).green());
    }

    out.section("Summary");
    out.amount("Materials", summary.total_materials);
    out.amount("Labor", summary.total_labor);
    out.amount("Markup", summary.total_markup);
    out.amount("Total", summary.grand_total);
    Ok(())
}
