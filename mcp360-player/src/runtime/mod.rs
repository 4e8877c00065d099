//! Event loop plumbing for the deck.

mod deck_runtime;
pub mod timers;
pub mod viewport;

use mcp360_core::{ActivationEpoch, ScrollBehavior, SlateIndex};

pub use deck_runtime::{DeckHandle, DeckRuntime};
pub use timers::TimerDriver;
pub use viewport::{HeadlessViewport, ScrollEnvironment, ViewportMetrics};

/// Capacity of the runtime mailbox.
pub const EVENT_BUFFER: usize = 256;

/// Everything the runtime reacts to, processed strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
    /// The environment reports a new scroll offset.
    Scrolled { position: f64, viewport_height: f64 },
    /// A cue timer elapsed.
    CueFired {
        slate: SlateIndex,
        epoch: ActivationEpoch,
        step: u32,
    },
    /// Side-rail click.
    Navigate(SlateIndex),
    /// Direct scroll, e.g. the visitor dragging the page.
    ScrollTo {
        position: f64,
        behavior: ScrollBehavior,
    },
    /// The viewport changed height.
    Resize(f64),
}
