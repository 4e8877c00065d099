use super::super::validation::ConfigGuardRailError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file {path} does not exist")]
    MissingConfig { path: PathBuf },
    #[error("failed to load deck configuration: {0}")]
    Deck(#[source] anyhow::Error),
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    Layout(#[from] mcp360_core::DeckError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
