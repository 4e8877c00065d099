//! Configuration for the MCP360 slate deck.
//!
//! A [`DeckConfig`] describes the viewport the deck assumes at startup, how
//! navigation scrolls, and each slate's label and reveal timeline. It is read
//! from TOML or JSON, checked by [`apply_guard_rails`], and turned into a
//! [`mcp360_core::DeckLayout`] by [`ConfigLoader`].

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError,
};
pub use models::{
    CueConfig, DeckConfig, DeckConfigSource, ScrollConfig, SlateConfig,
};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
