//! The gate state machine: two racing conditions, one commit.
//!
//! The controller owns the phase cell and the two condition trackers. All
//! detector signals and tracker inputs funnel through it; every write is
//! idempotent, so the arbitrary interleaving of strategies never needs a
//! lock. The single mutual-exclusion point is the Ready -> Committing edge,
//! taken with one compare-exchange so two near-simultaneous invocations
//! (say, a pointer event and a touch event for the same physical tap) cannot
//! both commit.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use scrollwrap_store::AcceptanceStore;
use scrollwrap_types::{
    AcceptanceRecord, AckSource, CompletionMethod, DocumentRef, GateEvent, GatePhase,
    GateSnapshot, InteractionId, ScrollMetrics, SurfaceCapabilities,
};

use crate::acknowledge::AcknowledgmentTracker;
use crate::detect::CompletionDetector;
use crate::tuning::GateTuning;

/// Event stream depth; slow subscribers lag rather than block the gate.
const EVENT_CAPACITY: usize = 64;

/// Atomic cell holding the current [`GatePhase`].
struct PhaseCell(AtomicU8);

impl PhaseCell {
    fn new(phase: GatePhase) -> Self {
        Self(AtomicU8::new(encode(phase)))
    }

    fn load(&self) -> GatePhase {
        decode(self.0.load(Ordering::SeqCst))
    }

    /// Single transition primitive: succeeds only from the expected phase.
    fn transition(&self, from: GatePhase, to: GatePhase) -> bool {
        self.0
            .compare_exchange(encode(from), encode(to), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

fn encode(phase: GatePhase) -> u8 {
    match phase {
        GatePhase::Initializing => 0,
        GatePhase::AwaitingConsent => 1,
        GatePhase::Ready => 2,
        GatePhase::Committing => 3,
        GatePhase::Released => 4,
    }
}

fn decode(raw: u8) -> GatePhase {
    match raw {
        0 => GatePhase::Initializing,
        1 => GatePhase::AwaitingConsent,
        2 => GatePhase::Ready,
        3 => GatePhase::Committing,
        _ => GatePhase::Released,
    }
}

/// The state machine combining detector and tracker output into one
/// enabled/disabled action, and executing the commit-and-reveal transition
/// exactly once.
pub struct GateController {
    gate_id: Uuid,
    document: DocumentRef,
    tuning: GateTuning,
    client_context: String,

    phase: PhaseCell,
    detector: CompletionDetector,
    tracker: AcknowledgmentTracker,

    store: Arc<AcceptanceStore>,
    event_tx: broadcast::Sender<GateEvent>,
    torn_down_emitted: AtomicBool,
}

impl GateController {
    pub fn new(
        gate_id: Uuid,
        document: DocumentRef,
        capabilities: SurfaceCapabilities,
        tuning: GateTuning,
        store: Arc<AcceptanceStore>,
        client_context: String,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let detector = CompletionDetector::new(capabilities, tuning.bottom_tolerance);

        Self {
            gate_id,
            document,
            tuning,
            client_context,
            phase: PhaseCell::new(GatePhase::Initializing),
            detector,
            tracker: AcknowledgmentTracker::new(),
            store,
            event_tx,
            torn_down_emitted: AtomicBool::new(false),
        }
    }

    /// Consult the store and enter the awaiting region, or short-circuit
    /// straight to `Released` on a matching prior acceptance.
    ///
    /// Read errors read as "no record": a broken session store re-prompts,
    /// it never blocks.
    #[instrument(skip(self), fields(gate_id = %self.gate_id, document = %self.document))]
    pub async fn initialize(&self) {
        let prior = match self.store.load_matching(&self.document).await {
            Ok(prior) => prior,
            Err(error) => {
                warn!(%error, "acceptance store unreadable; treating as no prior acceptance");
                None
            }
        };

        if let Some(record) = prior {
            info!(
                accepted_at = %record.accepted_at,
                method = %record.method,
                "prior acceptance found; releasing without re-prompt"
            );
            self.phase.transition(GatePhase::Initializing, GatePhase::Released);
            self.emit(GateEvent::PhaseChanged {
                from: GatePhase::Initializing,
                to: GatePhase::Released,
            });
            self.emit(GateEvent::Revealed);
            return;
        }

        self.phase
            .transition(GatePhase::Initializing, GatePhase::AwaitingConsent);
        // Emitted before any strategy can fire, so subscribers always see a
        // well-ordered phase history.
        self.emit(GateEvent::PhaseChanged {
            from: GatePhase::Initializing,
            to: GatePhase::AwaitingConsent,
        });
    }

    pub fn gate_id(&self) -> Uuid {
        self.gate_id
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn phase(&self) -> GatePhase {
        self.phase.load()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.event_tx.subscribe()
    }

    /// Point-in-time view for hosts and the presentation shell.
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            document: self.document.clone(),
            phase: self.phase.load(),
            completion_satisfied: self.detector.is_satisfied(),
            acknowledgment_given: self.tracker.is_given(),
            progress: self.detector.progress(),
            completion_method: self.detector.method(),
        }
    }

    /// Geometry from the most recent metrics-bearing event, the fallback
    /// source for the post-touch settle re-check.
    pub fn last_metrics(&self) -> Option<ScrollMetrics> {
        self.detector.last_metrics()
    }

    pub fn on_layout(&self, metrics: ScrollMetrics) {
        if !self.accepts_input("layout") {
            return;
        }
        if let Some(method) = self.detector.evaluate_layout(metrics) {
            self.note_completion(method);
        }
    }

    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        if !self.accepts_input("scroll") {
            return;
        }
        if let Some(method) = self.detector.evaluate_scroll(metrics) {
            self.note_completion(method);
        }
    }

    pub fn on_end_marker(&self) {
        if !self.accepts_input("end-marker") {
            return;
        }
        if let Some(method) = self.detector.evaluate_end_marker() {
            self.note_completion(method);
        }
    }

    /// The unconditional liveness bound elapsed.
    pub fn on_safety_timeout(&self) {
        if !self.accepts_input("safety-timeout") {
            return;
        }
        self.note_completion(CompletionMethod::SafetyTimeout);
    }

    pub fn toggle_acknowledgment(&self, source: AckSource, interaction: InteractionId) {
        if !self.accepts_input("acknowledgment") {
            return;
        }
        if let Some(given) = self.tracker.toggle(source, interaction) {
            info!(gate_id = %self.gate_id, %source, given, "acknowledgment changed");
            self.emit(GateEvent::AcknowledgmentChanged { given });
            self.reevaluate();
        }
    }

    /// The primary action. A no-op unless both conditions hold and no commit
    /// has begun; the Ready -> Committing compare-exchange is the guard that
    /// makes rapid double invocation commit exactly once.
    #[instrument(skip(self), fields(gate_id = %self.gate_id, document = %self.document))]
    pub async fn invoke_primary(&self) -> bool {
        let snapshot = self.snapshot();
        if !snapshot.action_enabled() {
            debug!(phase = %snapshot.phase, "primary action invoked while disabled; ignoring");
            return false;
        }

        if !self.phase.transition(GatePhase::Ready, GatePhase::Committing) {
            debug!("commit already in flight; second invocation rejected");
            return false;
        }
        self.emit(GateEvent::PhaseChanged {
            from: GatePhase::Ready,
            to: GatePhase::Committing,
        });
        self.tracker.freeze();

        let method = self
            .detector
            .method()
            .unwrap_or(CompletionMethod::SafetyTimeout);
        let record = AcceptanceRecord::new(
            &self.document.version,
            &self.client_context,
            method.acceptance(),
            self.tuning.context_limit,
        );

        // Best effort: a failed write degrades to re-prompting next session,
        // never to blocking the reveal.
        match self.store.save(&self.document.id, &record).await {
            Ok(()) => {
                info!(method = %record.method, "acceptance record persisted");
                self.emit(GateEvent::RecordPersisted);
            }
            Err(error) => {
                warn!(%error, "acceptance record not persisted; revealing anyway");
                self.emit(GateEvent::PersistenceSkipped {
                    reason: error.to_string(),
                });
            }
        }

        info!(method = %method, "protected content revealed");
        self.emit(GateEvent::Revealed);

        // Cosmetic pause before the gating surface disappears.
        tokio::time::sleep(self.tuning.reveal_delay).await;

        // Surface removal is announced before the terminal phase change, so
        // subscribers always see TornDown and then Released.
        self.emit_torn_down();
        self.phase.transition(GatePhase::Committing, GatePhase::Released);
        self.emit(GateEvent::PhaseChanged {
            from: GatePhase::Committing,
            to: GatePhase::Released,
        });
        true
    }

    /// Emit on the broadcast stream; nobody listening is fine.
    pub(crate) fn emit(&self, event: GateEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Announce removal of the gating surface, at most once per gate. Both
    /// the commit path and an explicit host teardown route through here.
    pub(crate) fn emit_torn_down(&self) {
        if !self.torn_down_emitted.swap(true, Ordering::SeqCst) {
            self.emit(GateEvent::TornDown);
        }
    }

    fn accepts_input(&self, kind: &str) -> bool {
        let phase = self.phase.load();
        if phase.accepts_input() {
            return true;
        }
        debug!(gate_id = %self.gate_id, %phase, kind, "input ignored in this phase");
        false
    }

    fn note_completion(&self, method: CompletionMethod) {
        if self.detector.satisfy(method) {
            info!(gate_id = %self.gate_id, %method, "completion satisfied");
            self.emit(GateEvent::CompletionSatisfied { method });
        }
        self.reevaluate();
    }

    /// Re-derive the phase from the two condition booleans. Both directions
    /// are compare-exchanges, so a commit racing in is never overwritten.
    fn reevaluate(&self) {
        let ready = self.detector.is_satisfied() && self.tracker.is_given();
        if ready {
            if self
                .phase
                .transition(GatePhase::AwaitingConsent, GatePhase::Ready)
            {
                self.emit(GateEvent::PhaseChanged {
                    from: GatePhase::AwaitingConsent,
                    to: GatePhase::Ready,
                });
            }
        } else if self
            .phase
            .transition(GatePhase::Ready, GatePhase::AwaitingConsent)
        {
            self.emit(GateEvent::PhaseChanged {
                from: GatePhase::Ready,
                to: GatePhase::AwaitingConsent,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollwrap_store::mocks::FaultySessionKv;
    use scrollwrap_store::InMemorySessionKv;
    use scrollwrap_types::AcceptanceMethod;

    fn controller_with(kv: Arc<dyn scrollwrap_store::SessionKv>) -> GateController {
        GateController::new(
            Uuid::new_v4(),
            DocumentRef::new("report-1", "1.0"),
            SurfaceCapabilities::default(),
            GateTuning {
                reveal_delay: std::time::Duration::ZERO,
                ..GateTuning::default()
            },
            Arc::new(AcceptanceStore::new(kv)),
            "test/ctx".to_string(),
        )
    }

    fn controller() -> GateController {
        controller_with(Arc::new(InMemorySessionKv::new()))
    }

    async fn awaiting_controller() -> GateController {
        let controller = controller();
        controller.initialize().await;
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
        controller
    }

    fn tall() -> ScrollMetrics {
        ScrollMetrics::new(0.0, 600.0, 2400.0)
    }

    fn near_end() -> ScrollMetrics {
        ScrollMetrics::new(1790.0, 600.0, 2400.0)
    }

    #[tokio::test]
    async fn completion_alone_never_enables_the_action() {
        let controller = awaiting_controller().await;
        controller.on_layout(tall());
        controller.on_scroll(near_end());

        let snapshot = controller.snapshot();
        assert!(snapshot.completion_satisfied);
        assert!(!snapshot.action_enabled());
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
    }

    #[tokio::test]
    async fn acknowledgment_alone_never_enables_the_action() {
        let controller = awaiting_controller().await;
        controller.on_layout(tall());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));

        let snapshot = controller.snapshot();
        assert!(snapshot.acknowledgment_given);
        assert!(!snapshot.action_enabled());
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
    }

    #[tokio::test]
    async fn both_conditions_reach_ready_in_either_order() {
        let controller = awaiting_controller().await;
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        controller.on_layout(tall());
        controller.on_scroll(near_end());
        assert_eq!(controller.phase(), GatePhase::Ready);

        let controller = awaiting_controller().await;
        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert_eq!(controller.phase(), GatePhase::Ready);
        assert!(controller.snapshot().action_enabled());
    }

    #[tokio::test]
    async fn unchecking_the_box_leaves_ready() {
        let controller = awaiting_controller().await;
        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert_eq!(controller.phase(), GatePhase::Ready);

        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(2));
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
        assert!(!controller.snapshot().action_enabled());
    }

    #[tokio::test]
    async fn invoke_while_disabled_is_a_noop() {
        let controller = awaiting_controller().await;
        assert!(!controller.invoke_primary().await);
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
    }

    #[tokio::test]
    async fn commit_persists_once_and_releases() {
        let kv = Arc::new(InMemorySessionKv::new());
        let controller = controller_with(kv.clone());
        controller.initialize().await;

        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));

        assert!(controller.invoke_primary().await);
        assert_eq!(controller.phase(), GatePhase::Released);

        let store = AcceptanceStore::new(kv);
        let record = store.load("report-1").await.unwrap().unwrap();
        assert_eq!(record.version, "1.0");
        assert_eq!(record.method, AcceptanceMethod::Primary);
        assert_eq!(record.client_context, "test/ctx");

        // A second invocation after release changes nothing.
        assert!(!controller.invoke_primary().await);
    }

    #[tokio::test]
    async fn rapid_double_invocation_commits_exactly_once() {
        let kv = Arc::new(FaultySessionKv::healthy());
        let controller = Arc::new(controller_with(kv.clone()));
        controller.initialize().await;

        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));

        let first = controller.clone();
        let second = controller.clone();
        let (a, b) = tokio::join!(first.invoke_primary(), second.invoke_primary());
        assert!(a ^ b, "exactly one invocation must win");
        assert_eq!(kv.write_attempts(), 1);
        assert_eq!(controller.phase(), GatePhase::Released);
    }

    #[tokio::test]
    async fn commit_announces_teardown_before_release() {
        let controller = awaiting_controller().await;
        let mut events = controller.subscribe();

        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert!(controller.invoke_primary().await);

        let mut order = Vec::new();
        while let Ok(event) = events.try_recv() {
            match event {
                GateEvent::Revealed => order.push("revealed"),
                GateEvent::TornDown => order.push("torn-down"),
                GateEvent::PhaseChanged {
                    to: GatePhase::Released,
                    ..
                } => order.push("released"),
                _ => {}
            }
        }
        assert_eq!(order, vec!["revealed", "torn-down", "released"]);
    }

    #[tokio::test]
    async fn persistence_failure_still_reveals() {
        let kv = Arc::new(FaultySessionKv::unavailable());
        let controller = controller_with(kv.clone());
        controller.initialize().await;
        let mut events = controller.subscribe();

        controller.on_layout(tall());
        controller.on_scroll(near_end());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert!(controller.invoke_primary().await);
        assert_eq!(controller.phase(), GatePhase::Released);

        let mut skipped = false;
        let mut revealed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                GateEvent::PersistenceSkipped { .. } => skipped = true,
                GateEvent::Revealed => revealed = true,
                GateEvent::RecordPersisted => panic!("nothing can have been persisted"),
                _ => {}
            }
        }
        assert!(skipped && revealed);
    }

    #[tokio::test]
    async fn matching_prior_record_short_circuits_to_released() {
        let kv = Arc::new(InMemorySessionKv::new());
        let store = AcceptanceStore::new(kv.clone());
        store
            .save(
                "report-1",
                &AcceptanceRecord::new("1.0", "earlier", AcceptanceMethod::Primary, 64),
            )
            .await
            .unwrap();

        let controller = controller_with(kv);
        controller.initialize().await;
        assert_eq!(controller.phase(), GatePhase::Released);

        // Released is terminal: nothing re-opens the gate.
        controller.on_layout(tall());
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert_eq!(controller.phase(), GatePhase::Released);
    }

    #[tokio::test]
    async fn stale_version_record_re_prompts() {
        let kv = Arc::new(InMemorySessionKv::new());
        let store = AcceptanceStore::new(kv.clone());
        store
            .save(
                "report-1",
                &AcceptanceRecord::new("0.9", "earlier", AcceptanceMethod::Primary, 64),
            )
            .await
            .unwrap();

        let controller = controller_with(kv);
        controller.initialize().await;
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
    }

    #[tokio::test]
    async fn unreadable_store_re_prompts_instead_of_failing() {
        let controller = controller_with(Arc::new(FaultySessionKv::unavailable()));
        controller.initialize().await;
        assert_eq!(controller.phase(), GatePhase::AwaitingConsent);
    }

    #[tokio::test]
    async fn fallback_commit_records_the_fallback_method() {
        let kv = Arc::new(InMemorySessionKv::new());
        let controller = controller_with(kv.clone());
        controller.initialize().await;

        controller.on_layout(tall());
        controller.on_safety_timeout();
        controller.toggle_acknowledgment(AckSource::Control, InteractionId::new(1));
        assert!(controller.invoke_primary().await);

        let record = AcceptanceStore::new(kv)
            .load("report-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.method, AcceptanceMethod::Fallback);
    }
}
