//! Providers Command
//!
//! List configured AI providers in fallback order.

use console::style;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::types::Result;

pub fn run(json: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let gateway = ctx.gateway()?;

    if json {
        let providers: Vec<_> = gateway
            .providers()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id(),
                    "name": p.name(),
                    "model": p.model(),
                    "available": p.is_available(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    let out = Output::new();
    out.section("AI Providers");
    for provider in gateway.providers() {
        let marker = if provider.is_available() {
            style("●").green()
        } else {
            style("○").dim()
        };
        println!(
            "  {} {:<10} {:<18} {}",
            marker,
            provider.id(),
            provider.name(),
            style(provider.model()).dim()
        );
    }

    if !gateway.has_available() {
        println!();
        let ids: Vec<&str> = gateway.providers().iter().map(|p| p.id()).collect();
        out.warning(&format!(
            "No provider has an API key. Configure one of: {}",
            ids.join(", ")
        ));
    }
    Ok(())
}
