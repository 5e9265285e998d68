//! Host-surface inputs: the contract a UI adapter feeds into the engine.
//!
//! The engine is headless. A browser, WASM, or native host observes its own
//! scroll/pointer/touch machinery and normalizes what it sees into
//! [`SurfaceEvent`]s. Nothing here knows about DOM nodes or widgets.

use serde::{Deserialize, Serialize};

/// Identity of the gated document and the terms revision on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Stable identifier of the gated content; the storage key is derived
    /// from it. Entries are never read across different ids.
    pub id: String,

    /// Terms revision currently displayed. Stored acceptances for any other
    /// revision are stale.
    pub version: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Mount-time validation: both parts must be non-blank.
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty() && !self.version.trim().is_empty()
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// Opaque handle to the rendered terms body.
///
/// The engine never parses or validates the content; the token only proves
/// the host bound a real terms region at mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsHandle(String);

impl TermsHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mount-time validation: the token must be non-blank.
    pub fn is_bound(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to the protected content region the host blurs and reveals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionHandle(String);

impl RegionHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mount-time validation: the token must be non-blank.
    pub fn is_bound(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Scroll geometry of the terms region, in host extent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the content.
    pub offset: f64,

    /// Visible extent of the scroll viewport.
    pub viewport_extent: f64,

    /// Total extent of the terms content.
    pub content_extent: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, viewport_extent: f64, content_extent: f64) -> Self {
        Self {
            offset,
            viewport_extent,
            content_extent,
        }
    }

    /// Remaining distance between the viewport's bottom edge and the end of
    /// the content. Never negative; overscroll reports zero.
    pub fn distance_from_end(&self) -> f64 {
        (self.content_extent - (self.offset + self.viewport_extent)).max(0.0)
    }

    /// Fraction of the content that has been inside the viewport so far,
    /// clamped to 0.0-1.0. Content that fits entirely is fully viewed.
    pub fn viewed_ratio(&self) -> f64 {
        if !self.requires_scrolling() {
            return 1.0;
        }
        ((self.offset + self.viewport_extent) / self.content_extent).clamp(0.0, 1.0)
    }

    /// Whether the content extends beyond the viewport at all.
    pub fn requires_scrolling(&self) -> bool {
        self.content_extent > self.viewport_extent && self.content_extent > 0.0
    }
}

/// Token tying together the multiple reports of one physical gesture.
///
/// A tap on the acknowledgment checkbox is typically reported twice by a
/// host: once for the control and once for its enlarged hit-target
/// container. Both reports carry the same id, and the tracker toggles once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionId(u64);

impl InteractionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interaction-{}", self.0)
    }
}

/// Which path reported an acknowledgment gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckSource {
    /// The acknowledgment control itself.
    Control,
    /// A click anywhere in the enlarged hit-target container.
    Container,
    /// A completed touch gesture on either.
    Touch,
}

impl std::fmt::Display for AckSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AckSource::Control => write!(f, "control"),
            AckSource::Container => write!(f, "container"),
            AckSource::Touch => write!(f, "touch"),
        }
    }
}

/// What the host surface can deliver, declared once at mount.
///
/// Absent capabilities silently disable the corresponding strategies; the
/// safety timeout keeps the gate live regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceCapabilities {
    /// The host can observe the end-of-content marker entering the viewport.
    pub intersection_events: bool,

    /// The host delivers touch-release notifications (momentum platforms).
    pub touch_input: bool,
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self {
            intersection_events: true,
            touch_input: true,
        }
    }
}

/// Host UI activity, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// Initial or changed geometry of the terms region.
    Layout { metrics: ScrollMetrics },

    /// Any scroll or settle movement of the terms region.
    Scroll { metrics: ScrollMetrics },

    /// A touch gesture ended; momentum may still be moving the content, so
    /// the engine re-checks the position after a short settle delay.
    TouchReleased { metrics: ScrollMetrics },

    /// The invisible end-of-content marker entered the scroll viewport.
    EndMarkerVisible,

    /// The acknowledgment control (or its container) was actuated.
    AcknowledgmentToggled {
        source: AckSource,
        interaction: InteractionId,
    },
}
