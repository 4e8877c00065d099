//! Per-slate reveal sequencer.
//!
//! The sequencer is driven by an `is_active` edge. Becoming active opens a new
//! [`ActivationEpoch`] and hands back one [`ScheduledCue`] per schedule entry,
//! each stamped with that epoch. Becoming inactive resets the step to 0 and
//! bumps the epoch again, so any cue still in flight from the old activation
//! arrives stale and is dropped by [`TimedAnimationSequencer::fire`].
//!
//! Advancement can be timer-driven ([`TimedAnimationSequencer::fire`]) or
//! poll-driven ([`TimedAnimationSequencer::tick`]). Both only ever move the
//! step forward.

use std::time::Instant;

use crate::schedule::StepSchedule;

/// Generation counter distinguishing one activation period from the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivationEpoch(u64);

impl ActivationEpoch {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        ActivationEpoch(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for ActivationEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequencerPhase {
    /// Inactive; the step is pinned to 0.
    Idle,
    /// Active with cues still pending. `step` is 0 until the first cue fires.
    Advancing { step: u32 },
    /// Active and past the final cue.
    Settled { step: u32 },
}

impl SequencerPhase {
    pub fn step(&self) -> u32 {
        match self {
            SequencerPhase::Idle => 0,
            SequencerPhase::Advancing { step }
            | SequencerPhase::Settled { step } => *step,
        }
    }
}

/// A cue timer requested by an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledCue {
    pub epoch: ActivationEpoch,
    pub step: u32,
    pub fire_at: Instant,
}

/// Everything a timer driver needs to run one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub epoch: ActivationEpoch,
    pub activated_at: Instant,
    /// Cue timers in firing order.
    pub cues: Vec<ScheduledCue>,
}

/// Result of delivering a cue timer to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The step moved forward.
    Applied { step: u32 },
    /// The timer belongs to an earlier activation.
    Stale,
    /// Right epoch, but the step is not ahead of the current one.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct TimedAnimationSequencer {
    schedule: StepSchedule,
    phase: SequencerPhase,
    epoch: ActivationEpoch,
    activated_at: Option<Instant>,
}

impl TimedAnimationSequencer {
    pub fn new(schedule: StepSchedule) -> Self {
        Self {
            schedule,
            phase: SequencerPhase::Idle,
            epoch: ActivationEpoch::default(),
            activated_at: None,
        }
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    pub fn phase(&self) -> SequencerPhase {
        self.phase
    }

    pub fn step(&self) -> u32 {
        self.phase.step()
    }

    pub fn epoch(&self) -> ActivationEpoch {
        self.epoch
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, SequencerPhase::Idle)
    }

    pub fn activated_at(&self) -> Option<Instant> {
        self.activated_at
    }

    /// Feed the owning slate's `is_active` flag.
    ///
    /// Only edges do anything: a rising edge returns the new [`Activation`],
    /// a falling edge resets to step 0 and returns `None`.
    pub fn set_active(
        &mut self,
        active: bool,
        now: Instant,
    ) -> Option<Activation> {
        match (active, self.is_active()) {
            (true, false) => Some(self.activate(now)),
            (false, true) => {
                self.deactivate();
                None
            }
            _ => None,
        }
    }

    fn activate(&mut self, now: Instant) -> Activation {
        self.epoch = self.epoch.next();
        self.activated_at = Some(now);
        self.phase = if self.schedule.is_empty() {
            SequencerPhase::Settled { step: 0 }
        } else {
            SequencerPhase::Advancing { step: 0 }
        };

        let epoch = self.epoch;
        let cues = self
            .schedule
            .cues()
            .iter()
            .map(|cue| ScheduledCue {
                epoch,
                step: cue.step,
                fire_at: now + cue.delay,
            })
            .collect();

        Activation {
            epoch,
            activated_at: now,
            cues,
        }
    }

    fn deactivate(&mut self) {
        // Bumping here, not only on the next activation, makes in-flight
        // timers stale immediately.
        self.epoch = self.epoch.next();
        self.activated_at = None;
        self.phase = SequencerPhase::Idle;
    }

    /// Deliver a cue timer.
    pub fn fire(&mut self, epoch: ActivationEpoch, step: u32) -> FireOutcome {
        if epoch != self.epoch {
            tracing::trace!(
                %epoch,
                current = %self.epoch,
                step,
                "dropping stale cue"
            );
            return FireOutcome::Stale;
        }
        if !self.is_active()
            || step <= self.step()
            || !self.schedule.contains_step(step)
        {
            return FireOutcome::Ignored;
        }

        self.advance_to(step);
        FireOutcome::Applied { step }
    }

    /// Catch the step up to wherever the timeline says it should be at `now`.
    /// Returns the new step if it moved.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let activated_at = self.activated_at?;
        let due = self
            .schedule
            .step_at(now.saturating_duration_since(activated_at));
        if due > self.step() {
            self.advance_to(due);
            Some(due)
        } else {
            None
        }
    }

    fn advance_to(&mut self, step: u32) {
        self.phase = if step >= self.schedule.final_step() {
            SequencerPhase::Settled { step }
        } else {
            SequencerPhase::Advancing { step }
        };
    }
}
