use std::time::Duration;

use mcp360_config::ScrollConfig;
use mcp360_core::{
    DeckError, DeckLayout, DeckSnapshot, EasingFunction, ScrollBehavior,
    SequencerPhase, SlateDeck, SlateIndex, SlateSpec, StepSchedule,
};
use mcp360_player::{
    DeckHandle, DeckRuntime, RuntimeError,
    tour::{settle_timeout, tour, wait_for_slate},
};
use tokio::{
    task::JoinHandle,
    time::{Instant, sleep_until},
};

const H: f64 = 1000.0;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn scroll_config() -> ScrollConfig {
    ScrollConfig {
        duration_ms: 600,
        easing: EasingFunction::EaseInOutCubic,
        frame_interval_ms: 16,
    }
}

fn three_step_layout() -> DeckLayout {
    let schedule = StepSchedule::from_millis(&[(1, 1000), (2, 2500), (3, 4000)])
        .expect("valid schedule");
    DeckLayout {
        viewport_height: H,
        slates: (0..8)
            .map(|position| SlateSpec {
                id: None,
                label: format!("Slate {position}"),
                schedule: schedule.clone(),
            })
            .collect(),
    }
}

fn settle() -> Duration {
    settle_timeout(scroll_config().duration())
}

async fn start(
    layout: DeckLayout,
) -> (JoinHandle<DeckSnapshot>, DeckHandle, Instant) {
    start_with(layout, scroll_config()).await
}

/// Spawn the runtime and wait until the deck has attached. Returns the
/// instant the first slate was activated.
async fn start_with(
    layout: DeckLayout,
    scroll: ScrollConfig,
) -> (JoinHandle<DeckSnapshot>, DeckHandle, Instant) {
    let deck = SlateDeck::new(layout).expect("deck");
    let (runtime, handle) = DeckRuntime::headless(deck, &scroll);
    let task = tokio::spawn(runtime.run());
    handle
        .subscribe()
        .wait_for(|snapshot| snapshot.attached)
        .await
        .expect("runtime alive");
    (task, handle, Instant::now())
}

async fn wait_until_active(handle: &DeckHandle, index: usize) {
    handle
        .subscribe()
        .wait_for(|snapshot| snapshot.scroll.active == SlateIndex::new(index))
        .await
        .expect("runtime alive");
}

fn step(handle: &DeckHandle, index: usize) -> u32 {
    handle
        .snapshot()
        .step_of(SlateIndex::new(index))
        .expect("slate exists")
}

#[tokio::test(start_paused = true)]
async fn steps_follow_the_schedule_while_active() {
    let (_task, handle, t0) = start(three_step_layout()).await;
    assert_eq!(step(&handle, 0), 0);

    let timeline = [
        (999, 0),
        (1001, 1),
        (2499, 1),
        (2501, 2),
        (3999, 2),
        (4001, 3),
        (10_000, 3),
    ];
    for (offset, expected) in timeline {
        sleep_until(t0 + ms(offset)).await;
        assert_eq!(step(&handle, 0), expected, "at {offset} ms");
    }

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.slates[0].phase, SequencerPhase::Settled { step: 3 });
    assert!(snapshot.slates[1..].iter().all(|slate| slate.step == 0));
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn rapid_toggle_discards_the_first_activation() {
    let (_task, handle, t0) = start(three_step_layout()).await;
    let first_epoch = handle.snapshot().slates[0].epoch;

    sleep_until(t0 + ms(500)).await;
    handle
        .scroll_to(H, ScrollBehavior::Instant)
        .await
        .expect("send");
    wait_until_active(&handle, 1).await;
    handle
        .scroll_to(0.0, ScrollBehavior::Instant)
        .await
        .expect("send");
    wait_until_active(&handle, 0).await;

    let snapshot = handle.snapshot();
    assert!(snapshot.slates[0].epoch > first_epoch);
    assert_eq!(snapshot.slates[1].phase, SequencerPhase::Idle);

    // The first activation would have fired step 1 at 1000 ms.
    sleep_until(t0 + ms(1400)).await;
    assert_eq!(step(&handle, 0), 0);
    assert_eq!(step(&handle, 1), 0);

    sleep_until(t0 + ms(1600)).await;
    assert_eq!(step(&handle, 0), 1);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn leaving_a_slate_resets_it_and_stops_its_timers() {
    let (_task, handle, t0) = start(three_step_layout()).await;

    sleep_until(t0 + ms(2600)).await;
    assert_eq!(step(&handle, 0), 2);

    handle
        .scroll_to(2.0 * H, ScrollBehavior::Instant)
        .await
        .expect("send");
    wait_until_active(&handle, 2).await;
    assert_eq!(step(&handle, 0), 0);

    sleep_until(t0 + ms(6000)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.slates[0].phase, SequencerPhase::Idle);
    assert_eq!(snapshot.slates[2].step, 2);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn navigation_scrolls_smoothly_onto_the_target() {
    let (_task, handle, t0) = start(three_step_layout()).await;

    let mut frames = handle.subscribe();
    handle.navigate(SlateIndex::new(6)).await.expect("navigate");

    let mut positions = Vec::new();
    while frames.changed().await.is_ok() {
        let position = frames.borrow_and_update().scroll.position;
        positions.push(position);
        if position == 6.0 * H {
            break;
        }
    }

    assert!(positions.len() > 2);
    assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(t0.elapsed() >= ms(600));

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.scroll.active, SlateIndex::new(6));
    for passed in 1..6 {
        assert_eq!(snapshot.slates[passed].phase, SequencerPhase::Idle);
    }
    assert!(snapshot.slates[6].is_active);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn navigating_out_of_range_is_rejected() {
    let (_task, handle, _) = start(three_step_layout()).await;

    let err = handle
        .navigate(SlateIndex::new(8))
        .await
        .expect_err("out of range");
    assert!(matches!(
        err,
        RuntimeError::Deck(DeckError::SlateOutOfRange { index: 8, total: 8 })
    ));
    assert_eq!(handle.snapshot().scroll.active, SlateIndex::new(0));
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn resize_rederives_the_active_slate() {
    let (_task, handle, _) = start(three_step_layout()).await;

    handle
        .scroll_to(2000.0, ScrollBehavior::Instant)
        .await
        .expect("send");
    wait_until_active(&handle, 2).await;

    handle.resize(500.0).await.expect("send");
    wait_until_active(&handle, 4).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.scroll.viewport_height, 500.0);
    assert_eq!(snapshot.scroll.position, 2000.0);
    assert_eq!(snapshot.slates[2].phase, SequencerPhase::Idle);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn overscroll_clamps_to_the_last_slate() {
    let (_task, handle, _) = start(three_step_layout()).await;

    handle
        .scroll_to(20.0 * H, ScrollBehavior::Instant)
        .await
        .expect("send");
    wait_until_active(&handle, 7).await;
    assert!(handle.snapshot().slates[7].is_active);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn shutdown_detaches_and_resets_every_slate() {
    let (task, handle, t0) = start(three_step_layout()).await;

    sleep_until(t0 + ms(1500)).await;
    assert_eq!(step(&handle, 0), 1);

    handle.shutdown();
    let last = task.await.expect("runtime task");
    assert!(!last.attached);
    assert!(
        last.slates
            .iter()
            .all(|slate| slate.phase == SequencerPhase::Idle)
    );
    assert_eq!(handle.snapshot(), last);

    let err = handle
        .navigate(SlateIndex::new(1))
        .await
        .expect_err("closed");
    assert!(matches!(err, RuntimeError::Closed));
}

#[tokio::test(start_paused = true)]
async fn tour_reaches_the_end_of_every_catalog_timeline() {
    let (_task, handle, _) = start(DeckLayout::catalog(900.0)).await;

    let stops = tour(&handle, Duration::from_secs(15), settle())
        .await
        .expect("tour");
    assert_eq!(stops.len(), 8);

    let reached: Vec<_> = stops.iter().map(|stop| stop.reached_step).collect();
    assert_eq!(reached, vec![0, 0, 0, 0, 0, 5, 9, 0]);
    assert_eq!(stops[5].label, "Playground");
    assert_eq!(stops[6].label, "Run Workflows");
    assert_eq!(stops[6].phase, SequencerPhase::Settled { step: 9 });
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn waiting_on_a_slate_that_never_settles_times_out() {
    let (_task, handle, _) = start(three_step_layout()).await;

    let err = wait_for_slate(&handle, SlateIndex::new(3), settle())
        .await
        .expect_err("nothing scrolls there");
    assert!(matches!(err, RuntimeError::NavigationTimeout { slate: 3 }));
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn tour_waits_out_scrolls_slower_than_the_margin() {
    let scroll = ScrollConfig {
        duration_ms: 6000,
        ..scroll_config()
    };
    let settle = settle_timeout(scroll.duration());
    let (_task, handle, _) = start_with(three_step_layout(), scroll).await;

    let stops = tour(&handle, Duration::from_secs(1), settle)
        .await
        .expect("tour");
    assert_eq!(stops.len(), 8);
    assert_eq!(handle.snapshot().scroll.position, 7.0 * H);
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn resize_mid_navigation_lands_on_the_new_slate_top() {
    let (_task, handle, t0) = start(three_step_layout()).await;

    handle.navigate(SlateIndex::new(6)).await.expect("navigate");
    sleep_until(t0 + ms(200)).await;
    handle.resize(500.0).await.expect("send");

    wait_for_slate(&handle, SlateIndex::new(6), settle())
        .await
        .expect("settles on the resized slate");
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.scroll.viewport_height, 500.0);
    assert_eq!(snapshot.scroll.position, 3000.0);
    assert!(snapshot.slates[6].is_active);
    handle.shutdown();
}
