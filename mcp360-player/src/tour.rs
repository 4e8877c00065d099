//! Guided walk through the deck.

use std::time::Duration;

use mcp360_core::{DeckSnapshot, SequencerPhase, SlateIndex};
use serde::Serialize;

use crate::{
    error::{Result, RuntimeError},
    runtime::DeckHandle,
};

/// Slack on top of the scroll duration before a navigation counts as stuck.
pub const SETTLE_MARGIN: Duration = Duration::from_secs(5);

const POSITION_TOLERANCE: f64 = 0.5;

/// How long to wait for a navigation that animates over `scroll_duration`.
pub fn settle_timeout(scroll_duration: Duration) -> Duration {
    scroll_duration.saturating_add(SETTLE_MARGIN)
}

/// What a slate looked like when the tour left it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourStop {
    pub index: SlateIndex,
    pub label: String,
    pub reached_step: u32,
    pub phase: SequencerPhase,
}

/// Navigate to every slate in order and stay `dwell` on each. A slate that
/// has not settled within `settle` fails the tour.
pub async fn tour(
    handle: &DeckHandle,
    dwell: Duration,
    settle: Duration,
) -> Result<Vec<TourStop>> {
    let total = handle.snapshot().slates.len();
    let mut stops = Vec::with_capacity(total);

    for position in 0..total {
        let index = SlateIndex::new(position);
        handle.navigate(index).await?;
        wait_for_slate(handle, index, settle).await?;
        tracing::info!(slate = position, dwell = ?dwell, "slate in view");

        tokio::time::sleep(dwell).await;

        let snapshot = handle.snapshot();
        let Some(slate) = snapshot.slates.get(position) else {
            return Err(RuntimeError::Closed);
        };
        tracing::info!(
            slate = position,
            label = %slate.label,
            step = slate.step,
            "leaving slate"
        );
        stops.push(TourStop {
            index,
            label: slate.label.clone(),
            reached_step: slate.step,
            phase: slate.phase,
        });
    }

    Ok(stops)
}

/// Resolve once `index` is active and the scroll has come to rest on it.
pub async fn wait_for_slate(
    handle: &DeckHandle,
    index: SlateIndex,
    timeout: Duration,
) -> Result<()> {
    let mut snapshots = handle.subscribe();
    let settled = tokio::time::timeout(
        timeout,
        snapshots.wait_for(|snapshot| is_settled_on(snapshot, index)),
    )
    .await;

    match settled {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) => Err(RuntimeError::Closed),
        Err(_) => Err(RuntimeError::NavigationTimeout {
            slate: index.value(),
        }),
    }
}

fn is_settled_on(snapshot: &DeckSnapshot, index: SlateIndex) -> bool {
    let target = index.value() as f64 * snapshot.scroll.viewport_height;
    snapshot.scroll.active == index
        && (snapshot.scroll.position - target).abs() < POSITION_TOLERANCE
}
