//! Static reveal timelines.
//!
//! A [`StepSchedule`] is the ordered list of `(step, delay)` cues a slate
//! walks through after it becomes active. Delays are absolute offsets from
//! the activation instant, not gaps between cues.

use std::time::Duration;

use crate::error::ScheduleError;

/// One entry of a reveal timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepCue {
    /// Step the sequencer reaches when this cue fires. Never 0.
    pub step: u32,
    /// Offset from activation.
    pub delay: Duration,
}

impl StepCue {
    pub fn new(step: u32, delay: Duration) -> Self {
        Self { step, delay }
    }

    pub fn from_millis(step: u32, delay_ms: u64) -> Self {
        Self::new(step, Duration::from_millis(delay_ms))
    }
}

/// Validated, strictly ascending list of cues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSchedule {
    cues: Vec<StepCue>,
}

impl StepSchedule {
    /// Build a schedule, rejecting step 0 and any cue that does not strictly
    /// follow its predecessor in both step and delay.
    pub fn new(cues: Vec<StepCue>) -> Result<Self, ScheduleError> {
        for (index, cue) in cues.iter().enumerate() {
            if cue.step == 0 {
                return Err(ScheduleError::ZeroStep { index });
            }
            if index == 0 {
                continue;
            }
            let previous = cues[index - 1];
            if cue.step <= previous.step {
                return Err(ScheduleError::StepsNotIncreasing {
                    index,
                    previous: previous.step,
                    step: cue.step,
                });
            }
            if cue.delay <= previous.delay {
                return Err(ScheduleError::DelaysNotIncreasing {
                    index,
                    previous: previous.delay,
                    delay: cue.delay,
                });
            }
        }

        Ok(Self { cues })
    }

    /// Shorthand for `(step, delay_ms)` literals.
    pub fn from_millis(pairs: &[(u32, u64)]) -> Result<Self, ScheduleError> {
        Self::new(
            pairs
                .iter()
                .map(|&(step, delay_ms)| StepCue::from_millis(step, delay_ms))
                .collect(),
        )
    }

    /// A schedule with no cues. Activation settles immediately at step 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> &[StepCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Step reached once the whole timeline has played, 0 when empty.
    pub fn final_step(&self) -> u32 {
        self.cues.last().map(|cue| cue.step).unwrap_or(0)
    }

    /// Offset of the last cue.
    pub fn total_duration(&self) -> Duration {
        self.cues.last().map(|cue| cue.delay).unwrap_or_default()
    }

    pub fn contains_step(&self, step: u32) -> bool {
        self.cues
            .binary_search_by_key(&step, |cue| cue.step)
            .is_ok()
    }

    /// Step visible `elapsed` after activation.
    pub fn step_at(&self, elapsed: Duration) -> u32 {
        let due = self.cues.partition_point(|cue| cue.delay <= elapsed);
        if due == 0 { 0 } else { self.cues[due - 1].step }
    }

    /// First cue that is still pending `elapsed` after activation.
    pub fn next_cue_after(&self, elapsed: Duration) -> Option<StepCue> {
        let due = self.cues.partition_point(|cue| cue.delay <= elapsed);
        self.cues.get(due).copied()
    }
}
