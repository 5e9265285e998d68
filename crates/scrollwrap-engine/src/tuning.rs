//! Tunable bounds for detection and commit pacing.
//!
//! The tolerance band and timer durations are empirical, surface-dependent
//! values. They are configuration, never inferred from behavior: hosts pick a
//! [`SurfaceProfile`] preset or set fields directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The kind of surface the gate is mounted on, selecting a tuning preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceProfile {
    /// Pointer input, precise scroll reporting.
    Desktop,
    /// Touch input with momentum scrolling that under-reports position.
    Touch,
    /// Unattended shared terminal; favors a shorter liveness bound.
    Kiosk,
}

/// Tunable parameters of one gate instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateTuning {
    /// Unconditional liveness bound: completion is granted after this long
    /// no matter what the other strategies observed. Keep within 10-20 s.
    pub safety_timeout: Duration,

    /// Distance from the content end (in host extent units) within which a
    /// scroll position counts as "reached the end".
    pub bottom_tolerance: f64,

    /// Wait after a touch release before re-measuring, so momentum motion
    /// has settled.
    pub settle_delay: Duration,

    /// Cosmetic pause between revealing the content and tearing the gating
    /// surface down.
    pub reveal_delay: Duration,

    /// Upper bound on the diagnostic client-context string, in chars.
    pub context_limit: usize,
}

impl Default for GateTuning {
    fn default() -> Self {
        Self::for_surface(SurfaceProfile::Desktop)
    }
}

impl GateTuning {
    /// Preset tuning for a surface kind.
    pub fn for_surface(profile: SurfaceProfile) -> Self {
        match profile {
            SurfaceProfile::Desktop => Self {
                safety_timeout: Duration::from_secs(15),
                bottom_tolerance: 48.0,
                settle_delay: Duration::from_millis(150),
                reveal_delay: Duration::from_millis(400),
                context_limit: 256,
            },
            // Momentum scrolling overshoots and under-reports; widen the
            // band and give the content longer to settle.
            SurfaceProfile::Touch => Self {
                bottom_tolerance: 96.0,
                settle_delay: Duration::from_millis(250),
                ..Self::for_surface(SurfaceProfile::Desktop)
            },
            // Shared terminals should not hold a queue of users hostage.
            SurfaceProfile::Kiosk => Self {
                safety_timeout: Duration::from_secs(10),
                bottom_tolerance: 64.0,
                ..Self::for_surface(SurfaceProfile::Desktop)
            },
        }
    }
}
