//! Headless player for the MCP360 slate deck.
//!
//! [`runtime::DeckRuntime`] owns a [`mcp360_core::SlateDeck`] and feeds it
//! scroll updates from a [`runtime::ScrollEnvironment`] and cue timers from a
//! [`runtime::TimerDriver`], one event at a time. [`tour`] walks the deck the
//! way a visitor clicking through the side rail would.

pub mod error;
pub mod runtime;
pub mod tour;

pub use error::{RuntimeError, Result};
pub use runtime::{DeckEvent, DeckHandle, DeckRuntime};
