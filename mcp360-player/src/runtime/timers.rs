//! Cue timers backed by tokio tasks.
//!
//! Each activation gets a single task that sleeps through its cues in order
//! and posts [`DeckEvent::CueFired`] to the runtime mailbox. Deactivating the
//! slate aborts that task, so cues that have not fired yet never reach the
//! mailbox. A cue that was already queued when the abort happened still
//! carries its old epoch and is dropped by the sequencer.

use std::collections::HashMap;

use mcp360_core::{Activation, SlateIndex};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};

use super::DeckEvent;

#[derive(Debug)]
pub struct TimerDriver {
    events: mpsc::Sender<DeckEvent>,
    tasks: HashMap<SlateIndex, JoinHandle<()>>,
}

impl TimerDriver {
    pub fn new(events: mpsc::Sender<DeckEvent>) -> Self {
        Self {
            events,
            tasks: HashMap::new(),
        }
    }

    /// Start the cue timers of `activation`, replacing any earlier timers of
    /// the same slate.
    pub fn schedule(&mut self, slate: SlateIndex, activation: Activation) {
        self.cancel(slate);
        if activation.cues.is_empty() {
            return;
        }

        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            for cue in activation.cues {
                sleep_until(Instant::from_std(cue.fire_at)).await;
                let event = DeckEvent::CueFired {
                    slate,
                    epoch: cue.epoch,
                    step: cue.step,
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(slate, handle);
    }

    pub fn cancel(&mut self, slate: SlateIndex) {
        if let Some(handle) = self.tasks.remove(&slate) {
            if !handle.is_finished() {
                tracing::trace!(slate = slate.value(), "cancelling cue timers");
            }
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Slates that still have cues waiting to fire.
    pub fn pending(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp360_core::{StepSchedule, TimedAnimationSequencer};
    use std::time::Duration;

    fn activation() -> Activation {
        let mut sequencer = TimedAnimationSequencer::new(
            StepSchedule::from_millis(&[(1, 100), (2, 300)]).expect("valid"),
        );
        sequencer
            .set_active(true, Instant::now().into_std())
            .expect("rising edge")
    }

    #[tokio::test(start_paused = true)]
    async fn cues_arrive_in_order_at_their_offsets() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut driver = TimerDriver::new(tx);
        let start = Instant::now();
        driver.schedule(SlateIndex::new(2), activation());

        let mut arrivals = Vec::new();
        for _ in 0..2 {
            match rx.recv().await {
                Some(DeckEvent::CueFired { step, .. }) => {
                    arrivals.push((step, start.elapsed()));
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        let steps: Vec<_> = arrivals.iter().map(|(step, _)| *step).collect();
        assert_eq!(steps, vec![1, 2]);
        for ((_, elapsed), offset) in arrivals.iter().zip([100, 300]) {
            let offset = Duration::from_millis(offset);
            assert!(*elapsed >= offset, "{elapsed:?} < {offset:?}");
            assert!(*elapsed < offset + Duration::from_millis(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_pending_cues() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut driver = TimerDriver::new(tx);
        driver.schedule(SlateIndex::new(0), activation());
        assert_eq!(driver.pending(), 1);

        driver.cancel(SlateIndex::new(0));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(driver.pending(), 0);
    }
}
