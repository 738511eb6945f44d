use console::style;

use crate::estimate::score_label;

/// Styled terminal output for CLI commands
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` row
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", style(format!("{}:", label)).dim(), value);
    }

    /// Right-aligned money row
    pub fn amount(&self, label: &str, value: f64) {
        println!("  {:<14} {:>12}", style(format!("{}:", label)).dim(), money(value));
    }

    /// Score out of 10, colored by band
    pub fn score(&self, score: u8) {
        let label = score_label(score);
        let styled = match score {
            0..=2 => style(format!("{}/10", score)).red(),
            3..=6 => style(format!("{}/10", score)).yellow(),
            _ => style(format!("{}/10", score)).green(),
        };
        println!("  {} {}", styled.bold(), style(label).dim());
    }

    pub fn bullet(&self, message: &str) {
        println!("  {} {}", style("•").cyan(), message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// `$1,234.50` style formatting for already-rounded amounts
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
