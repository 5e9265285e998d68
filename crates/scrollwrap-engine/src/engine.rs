//! Engine assembly: mount validation, timer strategies, and teardown.
//!
//! [`GateEngine`] is the host-facing surface of the crate. It validates the
//! mount bindings, consults the store through the controller, arms the
//! timer-backed strategies, and owns every spawned task so a teardown (or a
//! drop) leaves nothing running behind. Repeated mounts leak nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use scrollwrap_store::AcceptanceStore;
use scrollwrap_types::{
    BrandingConfig, DocumentRef, GateEvent, GatePhase, GateSnapshot, RegionHandle,
    SurfaceCapabilities, SurfaceEvent, TermsHandle,
};

use crate::controller::GateController;
use crate::detect::ScrollProbe;
use crate::error::{GateError, GateResult};
use crate::tuning::GateTuning;

/// Everything a host supplies to mount one gate.
pub struct GateInputs {
    /// Identity of the gated document and its terms revision.
    pub document: DocumentRef,

    /// The rendered terms body. Opaque; only its binding is checked.
    pub terms: TermsHandle,

    /// The protected content region the host blurs and reveals.
    pub protected_region: RegionHandle,

    /// Brand colors for the shell; defaults apply when absent.
    pub branding: Option<BrandingConfig>,

    /// What the host surface can deliver.
    pub capabilities: SurfaceCapabilities,

    /// Timer and tolerance parameters.
    pub tuning: GateTuning,

    /// Session-scoped acceptance persistence.
    pub store: Arc<AcceptanceStore>,

    /// Optional host re-measurement for the post-touch settle re-check.
    pub probe: Option<Arc<dyn ScrollProbe>>,

    /// Diagnostic environment descriptor for the acceptance record.
    pub client_context: String,
}

/// One mounted consent gate.
pub struct GateEngine {
    controller: Arc<GateController>,
    branding: BrandingConfig,
    capabilities: SurfaceCapabilities,
    probe: Option<Arc<dyn ScrollProbe>>,
    settle_delay: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    torn_down: AtomicBool,
}

impl GateEngine {
    /// Validate bindings, consult the store, and arm the strategies.
    ///
    /// A missing binding is fatal to this component only: the caller gets an
    /// error and leaves the protected content in its default, non-gated
    /// state. A matching prior acceptance mounts the engine already
    /// `Released`, with no timers armed and no surface to render.
    #[instrument(skip(inputs), fields(document = %inputs.document))]
    pub async fn mount(inputs: GateInputs) -> GateResult<Self> {
        if !inputs.document.is_complete() {
            return Err(GateError::MissingBinding("document id and version"));
        }
        if !inputs.terms.is_bound() {
            return Err(GateError::MissingBinding("terms content"));
        }
        if !inputs.protected_region.is_bound() {
            return Err(GateError::MissingBinding("protected content region"));
        }

        let gate_id = Uuid::new_v4();
        let controller = Arc::new(GateController::new(
            gate_id,
            inputs.document,
            inputs.capabilities,
            inputs.tuning.clone(),
            inputs.store,
            inputs.client_context,
        ));
        controller.initialize().await;

        let engine = Self {
            controller,
            branding: inputs.branding.unwrap_or_default(),
            capabilities: inputs.capabilities,
            probe: inputs.probe,
            settle_delay: inputs.tuning.settle_delay,
            tasks: Mutex::new(Vec::new()),
            torn_down: AtomicBool::new(false),
        };

        if engine.controller.phase() == GatePhase::Released {
            // Short-circuit mount: nothing to detect, nothing to arm.
            engine.torn_down.store(true, Ordering::SeqCst);
            info!(gate_id = %gate_id, "mounted released; no gating surface");
        } else {
            engine.spawn_safety_timer(inputs.tuning.safety_timeout);
            info!(gate_id = %gate_id, "gate mounted and awaiting consent");
        }
        Ok(engine)
    }

    pub fn gate_id(&self) -> Uuid {
        self.controller.gate_id()
    }

    pub fn document(&self) -> &DocumentRef {
        self.controller.document()
    }

    pub fn branding(&self) -> &BrandingConfig {
        &self.branding
    }

    pub fn phase(&self) -> GatePhase {
        self.controller.phase()
    }

    /// Point-in-time view for the host and the presentation shell.
    pub fn snapshot(&self) -> GateSnapshot {
        self.controller.snapshot()
    }

    /// Subscribe to the gate's event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GateEvent> {
        self.controller.subscribe()
    }

    /// Feed one normalized host event into the gate.
    pub fn handle_event(&self, event: SurfaceEvent) {
        if self.torn_down.load(Ordering::SeqCst) {
            debug!("surface event after teardown; ignoring");
            return;
        }

        match event {
            SurfaceEvent::Layout { metrics } => self.controller.on_layout(metrics),
            SurfaceEvent::Scroll { metrics } => self.controller.on_scroll(metrics),
            SurfaceEvent::TouchReleased { metrics } => {
                // Check the released position immediately, then again once
                // momentum has settled; scroll events under-report during
                // momentum motion on some platforms.
                self.controller.on_scroll(metrics);
                if self.capabilities.touch_input {
                    self.spawn_settle_recheck();
                } else {
                    debug!("touch release from a surface without touch input; no settle re-check");
                }
            }
            SurfaceEvent::EndMarkerVisible => self.controller.on_end_marker(),
            SurfaceEvent::AcknowledgmentToggled {
                source,
                interaction,
            } => self.controller.toggle_acknowledgment(source, interaction),
        }
    }

    /// Invoke the primary action. Returns whether this call performed the
    /// commit; disabled and repeated invocations are no-ops.
    pub async fn invoke_primary(&self) -> bool {
        let committed = self.controller.invoke_primary().await;
        if committed {
            self.teardown();
        }
        committed
    }

    /// Remove the gating surface from further interaction and stop every
    /// timer. Idempotent; also the Drop backstop.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.abort_tasks();
        self.controller.emit_torn_down();
        debug!(gate_id = %self.controller.gate_id(), "gate torn down");
    }

    fn spawn_safety_timer(&self, timeout: Duration) {
        let controller = self.controller.clone();
        self.track(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            controller.on_safety_timeout();
        }));
    }

    // Without a probe the re-check replays the most recent cached metrics.
    // Every cached value was already evaluated when it arrived, so the
    // fallback can only confirm, never change, the outcome; a probe is what
    // lets the host report a position the event stream under-reported.
    fn spawn_settle_recheck(&self) {
        let controller = self.controller.clone();
        let probe = self.probe.clone();
        let delay = self.settle_delay;
        self.track(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let metrics = probe
                .as_ref()
                .and_then(|probe| probe.measure())
                .or_else(|| controller.last_metrics());
            if let Some(metrics) = metrics {
                controller.on_scroll(metrics);
            }
        }));
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }
    }

    fn abort_tasks(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

impl Drop for GateEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
