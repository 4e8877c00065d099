//! Choreography core for the MCP360 landing deck.
//!
//! The page is a vertical stack of full-viewport "slates". A
//! [`ScrollSlateController`] turns the scroll offset into the active slate,
//! and every slate owns a [`TimedAnimationSequencer`] that walks a fixed
//! [`StepSchedule`] while the slate is active. [`SlateDeck`] composes the two
//! the way the page does.
//!
//! Nothing here reads a clock. Every time-dependent call takes an explicit
//! [`std::time::Instant`], so the runtime decides whether that is wall-clock
//! or virtual time.

pub mod deck;
pub mod error;
pub mod navigation;
pub mod reveal;
pub mod schedule;
pub mod scroll;
pub mod sequencer;
pub mod slate;
pub mod transitions;

pub use deck::{
    DeckLayout, DeckSnapshot, DeckTransition, SlateDeck, SlateSnapshot,
    SlateSpec,
};
pub use error::{DeckError, Result, ScheduleError};
pub use navigation::NavIndicator;
pub use schedule::{StepCue, StepSchedule};
pub use scroll::{
    ScrollBehavior, ScrollRequest, ScrollSlateController, ScrollSnapshot,
};
pub use sequencer::{
    Activation, ActivationEpoch, FireOutcome, ScheduledCue, SequencerPhase,
    TimedAnimationSequencer,
};
pub use slate::{SlateId, SlateIndex};
pub use transitions::{EasingFunction, ScrollAnimator};
