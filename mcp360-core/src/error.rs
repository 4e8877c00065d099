use std::time::Duration;

use thiserror::Error;

/// Rejections raised while building a [`crate::StepSchedule`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("cue {index} uses step 0, which is reserved for the idle state")]
    ZeroStep { index: usize },

    #[error(
        "cue {index} has step {step}, which does not follow step {previous}"
    )]
    StepsNotIncreasing { index: usize, previous: u32, step: u32 },

    #[error(
        "cue {index} at {delay:?} is not after the previous cue at {previous:?}"
    )]
    DelaysNotIncreasing {
        index: usize,
        previous: Duration,
        delay: Duration,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeckError {
    #[error("deck has no slates")]
    Empty,

    #[error("viewport height must be positive and finite, got {0}")]
    InvalidViewport(f64),

    #[error("slate {index} is out of range for a deck of {total} slates")]
    SlateOutOfRange { index: usize, total: usize },

    #[error("invalid schedule for slate {slate}: {source}")]
    Schedule {
        slate: usize,
        #[source]
        source: ScheduleError,
    },
}

pub type Result<T> = std::result::Result<T, DeckError>;
