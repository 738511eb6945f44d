//! Config Command
//!
//! Manage jobquote configuration.
//!
//! Usage:
//!   jobquote config show [-f json|yaml|toml]
//!   jobquote config path
//!   jobquote config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::{EstimateError, Result};

/// Print the merged effective configuration. API keys are omitted.
pub fn show(format: ConfigFormat) -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render(&config, format)?);
    Ok(())
}

/// Show configuration file locations and whether each exists
pub fn path() -> Result<()> {
    let out = Output::new();
    out.section("Configuration Files");

    match ConfigLoader::global_config_path() {
        Some(global) => out.field("Global", describe(&global)),
        None => out.field("Global", "(no home directory)"),
    }
    out.field("Project", describe(&ConfigLoader::project_config_path()));
    out.field("Environment", "JOBQUOTE_<SECTION>__<KEY>");
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    let state = if path.exists() { "" } else { " (not found)" };
    format!("{}{}", path.display(), state)
}

/// Write a starter config to the global or project location
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::global_config_path().ok_or_else(|| {
            EstimateError::Config("Cannot determine global config directory".to_string())
        })?
    } else {
        ConfigLoader::project_config_path()
    };

    let out = Output::new();
    if ConfigLoader::init_at(&path, force)? {
        out.success(&format!("Created {}", path.display()));
    } else {
        out.info(&format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    Ok(())
}
