//! Completion detection: four racing strategies over one idempotent flag.
//!
//! No single signal is trustworthy across every device and content shape, so
//! the detector runs four independent strategies and lets the first one win:
//!
//! - **end marker**: the host saw the end-of-content marker enter the
//!   viewport (only armed when the surface can observe intersections)
//! - **scroll position**: a scroll or settle landed within the bottom
//!   tolerance band
//! - **short content**: layout showed the content never exceeds the
//!   viewport, so there is nothing to scroll
//! - **safety timeout**: the liveness bound elapsed (armed by the engine)
//!
//! Later signals are no-ops; the flag is never un-set. There is no failure
//! mode that leaves the output permanently false, because the safety timeout
//! depends on nothing but the clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use tracing::debug;

use scrollwrap_types::{CompletionMethod, ScrollMetrics, SurfaceCapabilities};

/// Host-side re-measurement of the terms region, used for the post-touch
/// settle re-check. `None` means the host cannot measure right now and the
/// detector falls back to the last metrics it observed.
pub trait ScrollProbe: Send + Sync {
    fn measure(&self) -> Option<ScrollMetrics>;
}

/// The shared completion flag and the strategy math that feeds it.
///
/// All writes are idempotent, so the arbitrary interleaving of strategy
/// signals never matters and nothing here needs a lock around the flag
/// itself.
pub struct CompletionDetector {
    capabilities: SurfaceCapabilities,
    bottom_tolerance: f64,

    /// First strategy to fire. First-wins is atomic: a lost race is a no-op.
    method: OnceLock<CompletionMethod>,

    /// Continuous viewed ratio, monotone non-decreasing, as f64 bits.
    progress: AtomicU64,

    /// Most recent geometry, the fallback source for settle re-checks.
    last_metrics: Mutex<Option<ScrollMetrics>>,
}

impl CompletionDetector {
    pub fn new(capabilities: SurfaceCapabilities, bottom_tolerance: f64) -> Self {
        Self {
            capabilities,
            bottom_tolerance,
            method: OnceLock::new(),
            progress: AtomicU64::new(0.0f64.to_bits()),
            last_metrics: Mutex::new(None),
        }
    }

    /// Whether any strategy has reported full exposure.
    pub fn is_satisfied(&self) -> bool {
        self.method.get().is_some()
    }

    /// The strategy that fired first, once satisfied.
    pub fn method(&self) -> Option<CompletionMethod> {
        self.method.get().copied()
    }

    /// Record that `method` observed full exposure. Returns `true` when this
    /// call won the race; a lost race is a no-op.
    pub fn satisfy(&self, method: CompletionMethod) -> bool {
        let won = self.method.set(method).is_ok();
        if !won {
            debug!(%method, "completion already satisfied; later signal ignored");
        }
        won
    }

    /// Continuous viewed ratio, 0.0-1.0, distinct from the boolean output.
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::SeqCst))
    }

    /// Geometry from the most recent metrics-bearing event.
    pub fn last_metrics(&self) -> Option<ScrollMetrics> {
        self.last_metrics.lock().ok().and_then(|guard| *guard)
    }

    /// Short-content strategy: content that fits the viewport is fully
    /// exposed the moment it is laid out.
    pub fn evaluate_layout(&self, metrics: ScrollMetrics) -> Option<CompletionMethod> {
        self.observe(metrics);
        if !metrics.requires_scrolling() {
            return Some(CompletionMethod::ShortContent);
        }
        None
    }

    /// Scroll-position strategy: within the tolerance band of the end counts
    /// as having reached it. The band absorbs momentum under-reporting.
    pub fn evaluate_scroll(&self, metrics: ScrollMetrics) -> Option<CompletionMethod> {
        self.observe(metrics);
        if metrics.distance_from_end() <= self.bottom_tolerance {
            return Some(CompletionMethod::ScrollPosition);
        }
        None
    }

    /// End-marker strategy, armed only when the surface can observe
    /// intersections. A report from an un-armed surface is dropped.
    pub fn evaluate_end_marker(&self) -> Option<CompletionMethod> {
        if !self.capabilities.intersection_events {
            debug!("end-marker report from a surface without intersection events; ignoring");
            return None;
        }
        Some(CompletionMethod::EndMarker)
    }

    fn observe(&self, metrics: ScrollMetrics) {
        if let Ok(mut guard) = self.last_metrics.lock() {
            *guard = Some(metrics);
        }

        // Monotone max; concurrent observers only ever raise the value.
        let seen = metrics.viewed_ratio();
        let mut current = self.progress.load(Ordering::SeqCst);
        while seen > f64::from_bits(current) {
            match self.progress.compare_exchange(
                current,
                seen.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }
}
