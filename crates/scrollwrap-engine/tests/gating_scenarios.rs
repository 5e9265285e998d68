//! End-to-end gating scenarios, driven through the host-facing engine.
//!
//! Every test runs on a paused clock, so the safety timeout and the settle
//! and reveal delays elapse instantly instead of in real time.

use std::sync::Arc;
use std::time::Duration;

use scrollwrap_engine::{GateEngine, GateInputs, GateTuning, ScrollProbe};
use scrollwrap_store::{AcceptanceStore, InMemorySessionKv};
use scrollwrap_types::{
    AckSource, CompletionMethod, DocumentRef, GateEvent, GatePhase, InteractionId, RegionHandle,
    ScrollMetrics, SurfaceCapabilities, SurfaceEvent, TermsHandle,
};

fn inputs(kv: Arc<InMemorySessionKv>, version: &str) -> GateInputs {
    GateInputs {
        document: DocumentRef::new("quarterly-report", version),
        terms: TermsHandle::new("terms-of-service"),
        protected_region: RegionHandle::new("report-body"),
        branding: None,
        capabilities: SurfaceCapabilities::default(),
        tuning: GateTuning::default(),
        store: Arc::new(AcceptanceStore::new(kv)),
        probe: None,
        client_context: "portal/test".to_string(),
    }
}

fn layout(metrics: ScrollMetrics) -> SurfaceEvent {
    SurfaceEvent::Layout { metrics }
}

fn scroll(metrics: ScrollMetrics) -> SurfaceEvent {
    SurfaceEvent::Scroll { metrics }
}

fn check_box(raw: u64) -> SurfaceEvent {
    SurfaceEvent::AcknowledgmentToggled {
        source: AckSource::Control,
        interaction: InteractionId::new(raw),
    }
}

async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// Scenario 1: content shorter than the viewport needs no scrolling; the box
// is the only thing standing between the user and the action.
#[tokio::test(start_paused = true)]
async fn short_content_waits_only_for_the_checkbox() {
    let engine = GateEngine::mount(inputs(Arc::new(InMemorySessionKv::new()), "1.0"))
        .await
        .unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 480.0)));
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.completion_method, Some(CompletionMethod::ShortContent));
    assert!(!snapshot.action_enabled(), "box unchecked, action stays disabled");

    engine.handle_event(check_box(1));
    assert!(engine.snapshot().action_enabled(), "enabled immediately, no scroll required");
}

// Scenario 2: tall content with the box pre-checked enables the action at
// the tolerance boundary, not later.
#[tokio::test(start_paused = true)]
async fn pre_checked_box_enables_exactly_at_the_tolerance_band() {
    let engine = GateEngine::mount(inputs(Arc::new(InMemorySessionKv::new()), "1.0"))
        .await
        .unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(check_box(1));
    assert!(!engine.snapshot().action_enabled());

    // 49 units from the end: one unit outside the default 48.0 band.
    engine.handle_event(scroll(ScrollMetrics::new(1751.0, 600.0, 2400.0)));
    assert!(!engine.snapshot().action_enabled());

    // 48 units from the end: inside the band.
    engine.handle_event(scroll(ScrollMetrics::new(1752.0, 600.0, 2400.0)));
    let snapshot = engine.snapshot();
    assert!(snapshot.action_enabled());
    assert_eq!(snapshot.completion_method, Some(CompletionMethod::ScrollPosition));
}

// Scenario 3: with every real detection path unsupported and the content
// never scrolled, the safety timeout alone enables the action.
#[tokio::test(start_paused = true)]
async fn safety_timeout_is_the_floor_under_broken_detection() {
    let mut stubbed = inputs(Arc::new(InMemorySessionKv::new()), "1.0");
    stubbed.capabilities = SurfaceCapabilities {
        intersection_events: false,
        touch_input: false,
    };
    let timeout = stubbed.tuning.safety_timeout;
    let engine = GateEngine::mount(stubbed).await.unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(check_box(1));
    // An end-marker report from an unsupported surface must not count.
    engine.handle_event(SurfaceEvent::EndMarkerVisible);

    tokio::time::sleep(timeout - Duration::from_secs(1)).await;
    settle().await;
    assert!(!engine.snapshot().action_enabled(), "not before the timeout");

    tokio::time::sleep(Duration::from_secs(2)).await;
    settle().await;
    let snapshot = engine.snapshot();
    assert!(snapshot.action_enabled(), "enabled once the timeout elapses");
    assert_eq!(snapshot.completion_method, Some(CompletionMethod::SafetyTimeout));
}

// Scenario 4: two invocations within one frame commit exactly once.
#[tokio::test(start_paused = true)]
async fn double_invocation_produces_one_record_and_one_reveal() {
    let kv = Arc::new(InMemorySessionKv::new());
    let engine = GateEngine::mount(inputs(kv.clone(), "1.0")).await.unwrap();
    let mut events = engine.subscribe();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(scroll(ScrollMetrics::new(1800.0, 600.0, 2400.0)));
    engine.handle_event(check_box(1));
    assert!(engine.snapshot().action_enabled());

    let (first, second) = tokio::join!(engine.invoke_primary(), engine.invoke_primary());
    assert!(first ^ second, "exactly one invocation may commit");
    assert_eq!(engine.phase(), GatePhase::Released);

    let mut persisted = 0;
    let mut revealed = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            GateEvent::RecordPersisted => persisted += 1,
            GateEvent::Revealed => revealed += 1,
            _ => {}
        }
    }
    assert_eq!(persisted, 1);
    assert_eq!(revealed, 1);

    let store = AcceptanceStore::new(kv);
    let record = store.load("quarterly-report").await.unwrap().unwrap();
    assert_eq!(record.version, "1.0");
}

// Scenario 5: acceptance of v1 short-circuits a v1 re-mount in the same
// session, but a v2 mount blocks again; a fresh session always blocks.
#[tokio::test(start_paused = true)]
async fn version_change_re_prompts_within_the_same_session() {
    let kv = Arc::new(InMemorySessionKv::new());

    let first = GateEngine::mount(inputs(kv.clone(), "v1")).await.unwrap();
    assert_eq!(first.phase(), GatePhase::AwaitingConsent, "fresh session blocks");

    first.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    first.handle_event(scroll(ScrollMetrics::new(1800.0, 600.0, 2400.0)));
    first.handle_event(check_box(1));
    assert!(first.invoke_primary().await);
    drop(first);

    // Same session, same version: no re-prompt.
    let again = GateEngine::mount(inputs(kv.clone(), "v1")).await.unwrap();
    assert_eq!(again.phase(), GatePhase::Released);
    drop(again);

    // Same session, new terms revision: the gate blocks again.
    let v2 = GateEngine::mount(inputs(kv, "v2")).await.unwrap();
    assert_eq!(v2.phase(), GatePhase::AwaitingConsent);

    // Fresh session: the v1 acceptance is gone with its session.
    let fresh = GateEngine::mount(inputs(Arc::new(InMemorySessionKv::new()), "v1"))
        .await
        .unwrap();
    assert_eq!(fresh.phase(), GatePhase::AwaitingConsent);
}

struct EndOfContentProbe;

impl ScrollProbe for EndOfContentProbe {
    fn measure(&self) -> Option<ScrollMetrics> {
        Some(ScrollMetrics::new(1800.0, 600.0, 2400.0))
    }
}

// Momentum platforms: the release-time position is short of the end, but the
// settle re-check re-measures through the probe and finds it.
#[tokio::test(start_paused = true)]
async fn touch_settle_recheck_catches_momentum_scrolling() {
    let mut touch = inputs(Arc::new(InMemorySessionKv::new()), "1.0");
    let settle_delay = touch.tuning.settle_delay;
    touch.probe = Some(Arc::new(EndOfContentProbe));
    let engine = GateEngine::mount(touch).await.unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(SurfaceEvent::TouchReleased {
        metrics: ScrollMetrics::new(1200.0, 600.0, 2400.0),
    });
    assert!(!engine.snapshot().completion_satisfied, "release position is mid-content");

    tokio::time::sleep(settle_delay + Duration::from_millis(50)).await;
    settle().await;

    let snapshot = engine.snapshot();
    assert!(snapshot.completion_satisfied);
    assert_eq!(snapshot.completion_method, Some(CompletionMethod::ScrollPosition));
}

// Without a probe the settle re-check only replays metrics the scroll path
// already evaluated: a mid-content release stays unsatisfied, and the gate
// keeps working normally afterwards.
#[tokio::test(start_paused = true)]
async fn probe_less_settle_recheck_changes_nothing() {
    let no_probe = inputs(Arc::new(InMemorySessionKv::new()), "1.0");
    let settle_delay = no_probe.tuning.settle_delay;
    let engine = GateEngine::mount(no_probe).await.unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(SurfaceEvent::TouchReleased {
        metrics: ScrollMetrics::new(1200.0, 600.0, 2400.0),
    });

    tokio::time::sleep(settle_delay + Duration::from_millis(50)).await;
    settle().await;
    let snapshot = engine.snapshot();
    assert!(!snapshot.completion_satisfied);
    assert_eq!(engine.phase(), GatePhase::AwaitingConsent);

    // Later genuine movement still satisfies completion.
    engine.handle_event(scroll(ScrollMetrics::new(1800.0, 600.0, 2400.0)));
    assert!(engine.snapshot().completion_satisfied);
}

// The end-marker strategy on a surface that can observe intersections.
#[tokio::test(start_paused = true)]
async fn end_marker_sighting_satisfies_completion() {
    let engine = GateEngine::mount(inputs(Arc::new(InMemorySessionKv::new()), "1.0"))
        .await
        .unwrap();

    engine.handle_event(layout(ScrollMetrics::new(0.0, 600.0, 2400.0)));
    engine.handle_event(SurfaceEvent::EndMarkerVisible);

    let snapshot = engine.snapshot();
    assert!(snapshot.completion_satisfied);
    assert_eq!(snapshot.completion_method, Some(CompletionMethod::EndMarker));
    assert!(!snapshot.action_enabled(), "exposure alone never enables the action");
}
