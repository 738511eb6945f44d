//! Shared command setup

use std::sync::Arc;

use crate::ai::{EnvCredentials, LayeredCredentials, ProviderGateway, SharedCredentials};
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Loaded configuration plus the credential chain derived from it
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub credentials: SharedCredentials,
}

impl CommandContext {
    /// Load merged configuration. Keys from config files win over the environment.
    pub fn load() -> Result<Self> {
        Self::from_config(ConfigLoader::load()?)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let file_credentials: SharedCredentials = Arc::new(config.file_credentials()?);
        let env_credentials: SharedCredentials = Arc::new(EnvCredentials);
        let credentials: SharedCredentials = Arc::new(LayeredCredentials::new(vec![
            file_credentials,
            env_credentials,
        ]));
        Ok(Self {
            config,
            credentials,
        })
    }

    pub fn gateway(&self) -> Result<Arc<ProviderGateway>> {
        Ok(Arc::new(ProviderGateway::from_config(
            &self.config,
            self.credentials.clone(),
        )?))
    }
}
