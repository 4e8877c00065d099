use std::fmt;

use mcp360_config::ScrollConfig;
use mcp360_core::{
    DeckError, DeckSnapshot, DeckTransition, FireOutcome, ScrollBehavior,
    ScrollRequest, SlateDeck, SlateIndex,
};
use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use super::{
    DeckEvent, EVENT_BUFFER, HeadlessViewport, ScrollEnvironment, TimerDriver,
};
use crate::error::{Result, RuntimeError};

/// Single-consumer event loop around a [`SlateDeck`].
///
/// Scroll frames, cue timers and commands all arrive through one mailbox and
/// are applied one at a time, so the deck never sees concurrent mutation.
pub struct DeckRuntime<E: ScrollEnvironment> {
    deck: SlateDeck,
    environment: E,
    /// Navigation the environment is still carrying out.
    navigation: Option<ScrollRequest>,
    timers: TimerDriver,
    mailbox: mpsc::Receiver<DeckEvent>,
    snapshots: watch::Sender<DeckSnapshot>,
    shutdown: CancellationToken,
}

impl<E: ScrollEnvironment + fmt::Debug> fmt::Debug for DeckRuntime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckRuntime")
            .field("slates", &self.deck.len())
            .field("active", &self.deck.active_slate())
            .field("environment", &self.environment)
            .field("pending_timers", &self.timers.pending())
            .field("shutdown_cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl DeckRuntime<HeadlessViewport> {
    /// Runtime backed by a [`HeadlessViewport`] sized to the deck.
    pub fn headless(
        deck: SlateDeck,
        scroll: &ScrollConfig,
    ) -> (Self, DeckHandle) {
        let viewport_height = deck.viewport_height();
        Self::with_environment(deck, |events| {
            HeadlessViewport::new(events, viewport_height, scroll)
        })
    }
}

impl<E: ScrollEnvironment> DeckRuntime<E> {
    /// Build a runtime around an environment that reports scroll frames to
    /// the sender it is given.
    pub fn with_environment<F>(
        deck: SlateDeck,
        make_environment: F,
    ) -> (Self, DeckHandle)
    where
        F: FnOnce(mpsc::Sender<DeckEvent>) -> E,
    {
        let (tx, mailbox) = mpsc::channel(EVENT_BUFFER);
        let (snapshots, snapshot_rx) = watch::channel(deck.snapshot());
        let shutdown = CancellationToken::new();

        let runtime = Self {
            environment: make_environment(tx.clone()),
            navigation: None,
            timers: TimerDriver::new(tx.clone()),
            deck,
            mailbox,
            snapshots,
            shutdown: shutdown.clone(),
        };
        let handle = DeckHandle {
            tx,
            snapshots: snapshot_rx,
            shutdown,
        };

        (runtime, handle)
    }

    /// Attach the deck and process events until shutdown. Returns the state
    /// after the deck has been detached.
    pub async fn run(mut self) -> DeckSnapshot {
        if let Some(activation) = self.deck.attach(now()) {
            self.timers.schedule(self.deck.active_slate(), activation);
        }
        self.publish();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = self.mailbox.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }

        self.environment.stop();
        self.timers.cancel_all();
        self.deck.detach(now());
        self.publish();
        self.deck.snapshot()
    }

    fn handle(&mut self, event: DeckEvent) {
        match event {
            DeckEvent::Scrolled {
                position,
                viewport_height,
            } => {
                let transition =
                    self.deck.on_scroll(position, viewport_height, now());
                self.apply_transition(transition);
                if self
                    .navigation
                    .is_some_and(|request| request.target == position)
                {
                    self.navigation = None;
                }
            }
            DeckEvent::CueFired { slate, epoch, step } => {
                match self.deck.fire(slate, epoch, step) {
                    FireOutcome::Applied { .. } => {}
                    FireOutcome::Stale => {
                        tracing::trace!(
                            slate = slate.value(),
                            step,
                            %epoch,
                            "stale cue dropped"
                        );
                        return;
                    }
                    FireOutcome::Ignored => return,
                }
            }
            DeckEvent::Navigate(index) => match self.deck.navigate_to(index) {
                Ok(request) => {
                    self.navigation = Some(request);
                    self.environment
                        .scroll_to(request.target, request.behavior);
                }
                Err(err) => {
                    tracing::warn!(%err, "navigation rejected");
                    return;
                }
            },
            DeckEvent::ScrollTo { position, behavior } => {
                self.navigation = None;
                self.environment.scroll_to(position, behavior);
                return;
            }
            DeckEvent::Resize(viewport_height) => {
                self.environment.resize(viewport_height);
                let transition =
                    self.deck.on_viewport_resized(viewport_height, now());
                self.apply_transition(transition);
                self.retarget_navigation();
            }
        }
        self.publish();
    }

    fn apply_transition(&mut self, transition: DeckTransition) {
        if transition.changed() {
            self.timers.cancel(transition.previous);
        }
        if let Some(activation) = transition.activation {
            self.timers.schedule(transition.current, activation);
        }
    }

    /// Slate tops move with the viewport height, so a navigation still in
    /// flight is re-issued against the new height.
    fn retarget_navigation(&mut self) {
        let Some(request) = self.navigation else {
            return;
        };
        match self.deck.navigate_to(request.slate) {
            Ok(retargeted) if retargeted.target != request.target => {
                tracing::debug!(
                    slate = request.slate.value(),
                    from = request.target,
                    to = retargeted.target,
                    "navigation retargeted after resize"
                );
                self.navigation = Some(retargeted);
                self.environment
                    .scroll_to(retargeted.target, retargeted.behavior);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "dropping navigation after resize");
                self.navigation = None;
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.deck.snapshot());
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// Cloneable front door to a running [`DeckRuntime`].
#[derive(Debug, Clone)]
pub struct DeckHandle {
    tx: mpsc::Sender<DeckEvent>,
    snapshots: watch::Receiver<DeckSnapshot>,
    shutdown: CancellationToken,
}

impl DeckHandle {
    /// Latest published deck state.
    pub fn snapshot(&self) -> DeckSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DeckSnapshot> {
        self.snapshots.clone()
    }

    /// Request a smooth scroll to `index`. Out-of-range indices are rejected
    /// here rather than inside the loop.
    pub async fn navigate(&self, index: SlateIndex) -> Result<()> {
        let total = self.snapshots.borrow().slates.len();
        if index.value() >= total {
            return Err(DeckError::SlateOutOfRange {
                index: index.value(),
                total,
            }
            .into());
        }
        self.send(DeckEvent::Navigate(index)).await
    }

    pub async fn scroll_to(
        &self,
        position: f64,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        self.send(DeckEvent::ScrollTo { position, behavior }).await
    }

    pub async fn resize(&self, viewport_height: f64) -> Result<()> {
        self.send(DeckEvent::Resize(viewport_height)).await
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn send(&self, event: DeckEvent) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(RuntimeError::Closed);
        }
        self.tx.send(event).await.map_err(|_| RuntimeError::Closed)
    }
}
