pub mod error;

use std::path::PathBuf;

use mcp360_core::DeckLayout;

use self::error::ConfigLoadError;
use super::{
    models::{DeckConfig, DeckConfigSource},
    validation::{self, ConfigWarnings},
};

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Fully resolved configuration, ready to build a deck from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: DeckConfig,
    pub source: DeckConfigSource,
    pub warnings: ConfigWarnings,
    pub layout: DeckLayout,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Resolve the deck configuration.
    ///
    /// An explicit config path wins and must exist; otherwise the lookup in
    /// [`DeckConfig::load_from_env`] applies. A missing `.env` file is not an
    /// error.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let (config, source) = match &self.options.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig {
                        path: path.clone(),
                    });
                }
                let config = DeckConfig::load_from_file(path)
                    .map_err(ConfigLoadError::Deck)?;
                (config, DeckConfigSource::File(path.clone()))
            }
            None => DeckConfig::load_from_env().map_err(ConfigLoadError::Deck)?,
        };

        let warnings = validation::apply_guard_rails(&config)?;
        let layout = config.to_layout()?;

        tracing::debug!(
            %source,
            env_file_loaded,
            slates = layout.slates.len(),
            warnings = warnings.len(),
            "deck configuration resolved"
        );

        Ok(ConfigLoad {
            config,
            source,
            warnings,
            layout,
        })
    }
}
