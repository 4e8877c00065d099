//! Page composition: one scroll controller, one sequencer per slate.
//!
//! Data only flows one way. The deck derives the active slate from the
//! scroll offset and pushes an `is_active` flag into each sequencer; slates
//! can ask for navigation through [`SlateDeck::navigate_to`], which hands a
//! [`ScrollRequest`] back to the environment rather than moving anything.

use std::time::Instant;

use crate::error::{DeckError, Result};
use crate::navigation::{self, NavIndicator};
use crate::schedule::StepSchedule;
use crate::scroll::{ScrollRequest, ScrollSlateController, ScrollSnapshot};
use crate::sequencer::{
    Activation, ActivationEpoch, FireOutcome, SequencerPhase,
    TimedAnimationSequencer,
};
use crate::slate::{SlateId, SlateIndex};

/// Viewport height assumed until the environment reports a real one.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;

/// Static description of one slate.
#[derive(Debug, Clone, PartialEq)]
pub struct SlateSpec {
    /// Catalog entry this slate renders, if it is one of the built-ins.
    pub id: Option<SlateId>,
    pub label: String,
    pub schedule: StepSchedule,
}

impl From<SlateId> for SlateSpec {
    fn from(id: SlateId) -> Self {
        Self {
            id: Some(id),
            label: id.label().to_string(),
            schedule: id.schedule(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckLayout {
    pub viewport_height: f64,
    pub slates: Vec<SlateSpec>,
}

impl DeckLayout {
    /// The eight-slate MCP360 page.
    pub fn catalog(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            slates: SlateId::ALL.into_iter().map(SlateSpec::from).collect(),
        }
    }
}

impl Default for DeckLayout {
    fn default() -> Self {
        Self::catalog(DEFAULT_VIEWPORT_HEIGHT)
    }
}

/// Outcome of feeding a scroll or resize event to the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckTransition {
    pub previous: SlateIndex,
    pub current: SlateIndex,
    /// Cue timers to schedule for `current` when it was just activated.
    pub activation: Option<Activation>,
}

impl DeckTransition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlateSnapshot {
    pub index: SlateIndex,
    pub id: Option<SlateId>,
    pub label: String,
    pub is_active: bool,
    pub step: u32,
    pub phase: SequencerPhase,
    pub epoch: ActivationEpoch,
}

/// Read-only view of the whole deck.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckSnapshot {
    pub attached: bool,
    pub scroll: ScrollSnapshot,
    pub slates: Vec<SlateSnapshot>,
}

impl DeckSnapshot {
    pub fn active(&self) -> Option<&SlateSnapshot> {
        self.slates.get(self.scroll.active.value())
    }

    pub fn step_of(&self, index: SlateIndex) -> Option<u32> {
        self.slates.get(index.value()).map(|slate| slate.step)
    }
}

#[derive(Debug, Clone)]
struct SlateRuntime {
    spec: SlateSpec,
    sequencer: TimedAnimationSequencer,
}

impl SlateRuntime {
    fn cue_name(&self, step: u32) -> &'static str {
        self.spec
            .id
            .and_then(|id| id.cue_name(step))
            .unwrap_or("unnamed cue")
    }
}

#[derive(Debug, Clone)]
pub struct SlateDeck {
    controller: ScrollSlateController,
    slates: Vec<SlateRuntime>,
    labels: Vec<String>,
}

impl SlateDeck {
    pub fn new(layout: DeckLayout) -> Result<Self> {
        let controller = ScrollSlateController::new(
            layout.slates.len(),
            layout.viewport_height,
        )?;
        let labels = layout
            .slates
            .iter()
            .map(|slate| slate.label.clone())
            .collect();
        let slates = layout
            .slates
            .into_iter()
            .map(|spec| SlateRuntime {
                sequencer: TimedAnimationSequencer::new(spec.schedule.clone()),
                spec,
            })
            .collect();

        Ok(Self {
            controller,
            slates,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.slates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slates.is_empty()
    }

    pub fn is_attached(&self) -> bool {
        self.controller.is_attached()
    }

    pub fn active_slate(&self) -> SlateIndex {
        self.controller.active()
    }

    pub fn viewport_height(&self) -> f64 {
        self.controller.viewport_height()
    }

    pub fn position(&self) -> f64 {
        self.controller.position()
    }

    pub fn sequencer(
        &self,
        index: SlateIndex,
    ) -> Option<&TimedAnimationSequencer> {
        self.slates.get(index.value()).map(|slate| &slate.sequencer)
    }

    pub fn step_of(&self, index: SlateIndex) -> Option<u32> {
        self.sequencer(index).map(TimedAnimationSequencer::step)
    }

    /// Mount the page: start listening to scroll and activate the slate
    /// under the current offset.
    pub fn attach(&mut self, now: Instant) -> Option<Activation> {
        if self.controller.is_attached() {
            return None;
        }
        self.controller.attach();
        tracing::info!(slates = self.len(), "slate deck attached");
        self.sync_activity(now)
    }

    /// Unmount the page. Every slate resets and scroll updates are ignored
    /// until the next [`SlateDeck::attach`].
    pub fn detach(&mut self, now: Instant) {
        if !self.controller.is_attached() {
            return;
        }
        self.controller.detach();
        for (position, slate) in self.slates.iter_mut().enumerate() {
            if slate.sequencer.is_active() {
                slate.sequencer.set_active(false, now);
                tracing::info!(slate = position, "slate deactivated");
            }
        }
        tracing::info!("slate deck detached");
    }

    pub fn on_scroll(
        &mut self,
        position: f64,
        viewport_height: f64,
        now: Instant,
    ) -> DeckTransition {
        let previous = self.controller.active();
        let current = self
            .controller
            .on_scroll_position_changed(position, viewport_height);
        let activation = if current != previous {
            self.sync_activity(now)
        } else {
            None
        };

        DeckTransition {
            previous,
            current,
            activation,
        }
    }

    /// Re-derive the active slate after the viewport changed height. The
    /// pixel offset is kept as-is.
    pub fn on_viewport_resized(
        &mut self,
        viewport_height: f64,
        now: Instant,
    ) -> DeckTransition {
        let position = self.controller.position();
        self.on_scroll(position, viewport_height, now)
    }

    /// Ask the environment to bring `index` into view.
    pub fn navigate_to(&self, index: SlateIndex) -> Result<ScrollRequest> {
        let request = self
            .controller
            .navigate_to(index, self.controller.viewport_height())?;
        tracing::info!(
            slate = index.value(),
            label = %navigation::label_for(&self.labels, index),
            target = request.target,
            "navigation requested"
        );
        Ok(request)
    }

    /// Deliver a cue timer to the slate it was scheduled for.
    pub fn fire(
        &mut self,
        index: SlateIndex,
        epoch: ActivationEpoch,
        step: u32,
    ) -> FireOutcome {
        let Some(slate) = self.slates.get_mut(index.value()) else {
            return FireOutcome::Ignored;
        };

        let outcome = slate.sequencer.fire(epoch, step);
        if let FireOutcome::Applied { step } = outcome {
            tracing::debug!(
                slate = index.value(),
                step,
                cue = slate.cue_name(step),
                "step applied"
            );
        }
        outcome
    }

    /// Poll every active sequencer. Returns the slates whose step moved.
    pub fn tick(&mut self, now: Instant) -> Vec<(SlateIndex, u32)> {
        let mut moved = Vec::new();
        for (position, slate) in self.slates.iter_mut().enumerate() {
            if let Some(step) = slate.sequencer.tick(now) {
                tracing::debug!(
                    slate = position,
                    step,
                    cue = slate.cue_name(step),
                    "step applied"
                );
                moved.push((SlateIndex::new(position), step));
            }
        }
        moved
    }

    pub fn navigation(&self) -> Vec<NavIndicator> {
        navigation::indicators(
            self.len(),
            &self.labels,
            self.controller.active(),
        )
    }

    pub fn snapshot(&self) -> DeckSnapshot {
        let slates = self
            .slates
            .iter()
            .enumerate()
            .map(|(position, slate)| {
                let index = SlateIndex::new(position);
                SlateSnapshot {
                    index,
                    id: slate.spec.id,
                    label: navigation::label_for(&self.labels, index),
                    is_active: slate.sequencer.is_active(),
                    step: slate.sequencer.step(),
                    phase: slate.sequencer.phase(),
                    epoch: slate.sequencer.epoch(),
                }
            })
            .collect();

        DeckSnapshot {
            attached: self.controller.is_attached(),
            scroll: self.controller.snapshot(),
            slates,
        }
    }

    /// Push the current `is_active` flag into every sequencer. Deactivations
    /// run before the activation so two slates are never live at once.
    fn sync_activity(&mut self, now: Instant) -> Option<Activation> {
        let active = self.controller.active();

        for (position, slate) in self.slates.iter_mut().enumerate() {
            if position != active.value() && slate.sequencer.is_active() {
                slate.sequencer.set_active(false, now);
                tracing::info!(slate = position, "slate deactivated");
            }
        }

        let slate = self.slates.get_mut(active.value())?;
        let activation = slate.sequencer.set_active(true, now)?;
        tracing::info!(
            slate = active.value(),
            label = %slate.spec.label,
            epoch = %activation.epoch,
            cues = activation.cues.len(),
            "slate activated"
        );
        Some(activation)
    }
}

impl TryFrom<DeckLayout> for SlateDeck {
    type Error = DeckError;

    fn try_from(layout: DeckLayout) -> Result<Self> {
        SlateDeck::new(layout)
    }
}
