//! Easing curves and the smooth-scroll tween used by slate navigation.

use std::time::{Duration, Instant};

/// Default length of a navigation scroll.
pub const SCROLL_TRANSITION_DURATION: Duration = Duration::from_millis(600);

/// Easing function types for transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum EasingFunction {
    Linear,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
    EaseOutQuart,
    EaseOutExpo,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            EasingFunction::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f64,
    to: f64,
    started_at: Instant,
}

/// Time-based tween from the current scroll offset to a target offset.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    tween: Option<Tween>,
    last_sample: f64,
    duration: Duration,
    easing: EasingFunction,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(SCROLL_TRANSITION_DURATION, EasingFunction::default())
    }
}

impl ScrollAnimator {
    pub fn new(duration: Duration, easing: EasingFunction) -> Self {
        Self {
            tween: None,
            last_sample: 0.0,
            duration,
            easing,
        }
    }

    pub fn is_active(&self) -> bool {
        self.tween.is_some()
    }

    /// Begin scrolling from `current` to `target`. Starting while a tween is
    /// running retargets from the last sampled position instead of `current`.
    pub fn start(&mut self, current: f64, target: f64, now: Instant) {
        let from = if self.is_active() {
            self.last_sample
        } else {
            current
        };
        self.last_sample = from;
        self.tween = Some(Tween {
            from,
            to: target,
            started_at: now,
        });
    }

    /// Returns Some(next_offset) when animating, or None when finished or
    /// inactive.
    /// The final sample is exactly the target.
    pub fn sample(&mut self, now: Instant) -> Option<f64> {
        let tween = self.tween?;
        let elapsed = now.saturating_duration_since(tween.started_at);
        if elapsed >= self.duration {
            self.tween = None;
            self.last_sample = tween.to;
            return Some(tween.to);
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let next = tween.from + (tween.to - tween.from) * self.easing.apply(t);
        self.last_sample = next;
        Some(next)
    }

    /// Cancel the current animation immediately.
    pub fn cancel(&mut self) {
        self.tween = None;
    }
}
