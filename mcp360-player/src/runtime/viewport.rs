//! The environment's scroll mechanism.
//!
//! In a browser this is the window; here [`HeadlessViewport`] plays that
//! part by tweening the offset on a frame interval and reporting every frame
//! to the runtime as a [`DeckEvent::Scrolled`].

use std::{sync::Arc, time::Duration};

use mcp360_config::ScrollConfig;
use mcp360_core::{EasingFunction, ScrollAnimator, ScrollBehavior};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use super::DeckEvent;

/// Current scroll offset and viewport height, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub position: f64,
    pub viewport_height: f64,
}

/// Seam between the deck runtime and whatever actually scrolls the page.
pub trait ScrollEnvironment: Send {
    fn metrics(&self) -> ViewportMetrics;

    fn position(&self) -> f64 {
        self.metrics().position
    }

    fn viewport_height(&self) -> f64 {
        self.metrics().viewport_height
    }

    /// Move to `target`, reporting progress as scroll events. A request made
    /// while a smooth scroll is running replaces it.
    fn scroll_to(&mut self, target: f64, behavior: ScrollBehavior);

    /// Record a new viewport height. A scroll in flight keeps its pixel
    /// target; the runtime re-issues navigations that depend on the height.
    fn resize(&mut self, viewport_height: f64);

    /// Abandon any scroll in progress.
    fn stop(&mut self);
}

#[derive(Debug)]
pub struct HeadlessViewport {
    events: mpsc::Sender<DeckEvent>,
    metrics: Arc<watch::Sender<ViewportMetrics>>,
    duration: Duration,
    easing: EasingFunction,
    frame_interval: Duration,
    animation: Option<JoinHandle<()>>,
}

impl HeadlessViewport {
    pub fn new(
        events: mpsc::Sender<DeckEvent>,
        viewport_height: f64,
        scroll: &ScrollConfig,
    ) -> Self {
        let (metrics, _) = watch::channel(ViewportMetrics {
            position: 0.0,
            viewport_height,
        });
        Self {
            events,
            metrics: Arc::new(metrics),
            duration: scroll.duration(),
            easing: scroll.easing,
            frame_interval: scroll.frame_interval(),
            animation: None,
        }
    }
}

impl ScrollEnvironment for HeadlessViewport {
    fn metrics(&self) -> ViewportMetrics {
        *self.metrics.borrow()
    }

    fn scroll_to(&mut self, target: f64, behavior: ScrollBehavior) {
        self.stop();

        let duration = match behavior {
            ScrollBehavior::Smooth => self.duration,
            ScrollBehavior::Instant => Duration::ZERO,
        };
        let mut animator = ScrollAnimator::new(duration, self.easing);
        let events = self.events.clone();
        let metrics = Arc::clone(&self.metrics);
        let frame_interval = self.frame_interval.max(Duration::from_millis(1));

        self.animation = Some(tokio::spawn(async move {
            let from = metrics.borrow().position;
            animator.start(from, target, Instant::now().into_std());

            let mut frames = tokio::time::interval(frame_interval);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                frames.tick().await;
                let Some(position) = animator.sample(Instant::now().into_std())
                else {
                    break;
                };

                metrics.send_modify(|current| current.position = position);
                let viewport_height = metrics.borrow().viewport_height;
                let event = DeckEvent::Scrolled {
                    position,
                    viewport_height,
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn resize(&mut self, viewport_height: f64) {
        self.metrics
            .send_modify(|current| current.viewport_height = viewport_height);
    }

    fn stop(&mut self) {
        if let Some(handle) = self.animation.take() {
            handle.abort();
        }
    }
}

impl Drop for HeadlessViewport {
    fn drop(&mut self) {
        self.stop();
    }
}
