//! Scroll spy for the slate deck.
//!
//! The controller never writes the scroll offset itself. It derives the
//! active slate from whatever offset the environment reports, and
//! [`ScrollSlateController::navigate_to`] only produces a [`ScrollRequest`]
//! for the environment to carry out.

use crate::error::{DeckError, Result};
use crate::slate::SlateIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ScrollBehavior {
    Instant,
    #[default]
    Smooth,
}

/// Instruction for the environment's scroll mechanism.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollRequest {
    pub slate: SlateIndex,
    /// Absolute vertical offset in pixels.
    pub target: f64,
    pub behavior: ScrollBehavior,
}

/// Read-only copy of the controller state handed to consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub position: f64,
    pub viewport_height: f64,
    pub active: SlateIndex,
    pub total_slates: usize,
}

/// Map a scroll offset to the nearest slate, clamped into the deck.
///
/// Offsets past the last slate (trailing content, overscroll) resolve to the
/// last slate; negative offsets resolve to the first.
pub fn slate_for_position(
    position: f64,
    viewport_height: f64,
    total_slates: usize,
) -> SlateIndex {
    let last = total_slates.saturating_sub(1);
    if !position.is_finite()
        || !viewport_height.is_finite()
        || viewport_height <= 0.0
    {
        return SlateIndex::new(0);
    }

    let nearest = (position.max(0.0) / viewport_height).round();
    if nearest >= last as f64 {
        SlateIndex::new(last)
    } else {
        SlateIndex::new(nearest as usize)
    }
}

fn valid_viewport(viewport_height: f64) -> bool {
    viewport_height.is_finite() && viewport_height > 0.0
}

#[derive(Debug, Clone)]
pub struct ScrollSlateController {
    total_slates: usize,
    position: f64,
    viewport_height: f64,
    active: SlateIndex,
    attached: bool,
}

impl ScrollSlateController {
    pub fn new(total_slates: usize, viewport_height: f64) -> Result<Self> {
        if total_slates == 0 {
            return Err(DeckError::Empty);
        }
        if !valid_viewport(viewport_height) {
            return Err(DeckError::InvalidViewport(viewport_height));
        }

        Ok(Self {
            total_slates,
            position: 0.0,
            viewport_height,
            active: SlateIndex::new(0),
            attached: false,
        })
    }

    pub fn total_slates(&self) -> usize {
        self.total_slates
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn active(&self) -> SlateIndex {
        self.active
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start listening to scroll updates (page mount).
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop listening to scroll updates (page unmount).
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Re-derive the active slate from a new scroll offset.
    ///
    /// Updates arriving while detached, or with an unusable viewport height,
    /// leave the state untouched and report the current slate.
    pub fn on_scroll_position_changed(
        &mut self,
        position: f64,
        viewport_height: f64,
    ) -> SlateIndex {
        if !self.attached {
            tracing::trace!(position, "scroll update while detached");
            return self.active;
        }
        if !valid_viewport(viewport_height) || !position.is_finite() {
            tracing::warn!(
                position,
                viewport_height,
                "ignoring unusable scroll update"
            );
            return self.active;
        }

        self.position = position.max(0.0);
        self.viewport_height = viewport_height;
        self.active =
            slate_for_position(position, viewport_height, self.total_slates);
        self.active
    }

    /// Request a smooth scroll to the top of `index`.
    ///
    /// The active slate is not touched here; it follows from the scroll
    /// updates the environment reports while it carries the request out.
    pub fn navigate_to(
        &self,
        index: SlateIndex,
        viewport_height: f64,
    ) -> Result<ScrollRequest> {
        if index.value() >= self.total_slates {
            return Err(DeckError::SlateOutOfRange {
                index: index.value(),
                total: self.total_slates,
            });
        }
        if !valid_viewport(viewport_height) {
            return Err(DeckError::InvalidViewport(viewport_height));
        }

        Ok(ScrollRequest {
            slate: index,
            target: index.value() as f64 * viewport_height,
            behavior: ScrollBehavior::Smooth,
        })
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            position: self.position,
            viewport_height: self.viewport_height,
            active: self.active,
            total_slates: self.total_slates,
        }
    }
}
