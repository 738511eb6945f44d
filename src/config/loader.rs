//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/jobquote/config.toml)
//! 3. Project config (./jobquote.toml)
//! 4. Environment variables (JOBQUOTE_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{EstimateError, Result};

const ENV_PREFIX: &str = "JOBQUOTE_";

/// Output format for `config show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Self::base();

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. JOBQUOTE_LLM__TIMEOUT_SECS -> llm.timeout_secs
        figment = figment.merge(Self::env());

        Self::extract(figment)
    }

    /// Load configuration from a specific file only (plus defaults)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::extract(Self::base().merge(Toml::file(path)))
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| EstimateError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/jobquote/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("jobquote"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from("jobquote.toml")
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the effective configuration; API keys are never included
    pub fn render(config: &Config, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| EstimateError::Config(e.to_string()))
            }
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(config)?),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented starter config. Existing files are kept unless `force`.
    pub fn init_at(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    fn default_config() -> String {
        r#"# jobquote configuration
# Environment variables override this file, e.g. JOBQUOTE_SERVER__BIND=0.0.0.0:8080

[server]
bind = "127.0.0.1:3000"

[llm]
timeout_secs = 30
temperature = 0.2
top_p = 0.9
max_tokens = 4096
# Fallback order when the requested provider has no credential
priority = ["anthropic", "openai", "groq", "gemini"]

[rate_limit]
suggest_max_requests = 5
suggest_window_secs = 60
score_max_requests = 15
score_window_secs = 60

# Per-provider overrides. Keys default to ANTHROPIC_API_KEY, OPENAI_API_KEY,
# GROQ_API_KEY and GEMINI_API_KEY from the environment.
# [providers.groq]
# api_key = "gsk_..."
# model = "llama-3.3-70b-versatile"
# api_base = "https://api.groq.com/openai/v1"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_starter_config_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        assert!(ConfigLoader::init_at(&path, false).unwrap());
        assert!(!ConfigLoader::init_at(&path, false).unwrap());

        let config = ConfigLoader::load_from_file(&path).unwrap();
        let defaults = Config::default();
        assert_eq!(config.llm.priority, defaults.llm.priority);
        assert_eq!(config.rate_limit.score_max_requests, 15);
        assert_eq!(config.server.bind, defaults.server.bind);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobquote.toml");
        fs::write(
            &path,
            r#"
[llm]
timeout_secs = 10
priority = ["groq"]

[providers.groq]
model = "llama-3.1-8b-instant"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.timeout_secs, 10);
        assert_eq!(config.llm.temperature, 0.2);
        let providers = config.provider_configs().unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobquote.toml");
        fs::write(&path, "[llm]\ntimeout_secs = 0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, EstimateError::Config(_)));
    }

    #[test]
    fn test_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JOBQUOTE_SERVER__BIND", "0.0.0.0:8080");
            jail.set_env("JOBQUOTE_RATE_LIMIT__SUGGEST_MAX_REQUESTS", "9");

            let config: Config = ConfigLoader::base()
                .merge(ConfigLoader::env())
                .extract()?;
            assert_eq!(config.server.bind, "0.0.0.0:8080");
            assert_eq!(config.rate_limit.suggest_max_requests, 9);
            Ok(())
        });
    }

    #[test]
    fn test_render_hides_keys() {
        let mut config = Config::default();
        config.providers.insert(
            "gemini".to_string(),
            crate::config::ProviderOverride {
                api_key: Some("AIza-secret".to_string()),
                ..Default::default()
            },
        );

        for format in [ConfigFormat::Toml, ConfigFormat::Json, ConfigFormat::Yaml] {
            let rendered = ConfigLoader::render(&config, format).unwrap();
            assert!(!rendered.contains("AIza-secret"));
            assert!(rendered.contains("gemini"));
        }
        let toml = ConfigLoader::render(&config, ConfigFormat::Toml).unwrap();
        assert!(toml.contains("[server]"));
    }
}
