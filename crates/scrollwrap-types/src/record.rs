//! Acceptance records and the detection-method tags that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default upper bound on the diagnostic client-context string, in chars.
pub const DEFAULT_CONTEXT_LIMIT: usize = 256;

/// Which detection path ultimately satisfied completion.
///
/// The persisted record only distinguishes primary detection from the
/// safety-timeout fallback; the fine-grained strategy lives in
/// [`CompletionMethod`] and is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptanceMethod {
    /// One of the real detection strategies observed full exposure.
    Primary,
    /// The safety timeout elapsed before any strategy fired.
    Fallback,
}

impl std::fmt::Display for AcceptanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptanceMethod::Primary => write!(f, "primary"),
            AcceptanceMethod::Fallback => write!(f, "fallback"),
        }
    }
}

/// The strategy that first reported completion, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionMethod {
    /// The end-of-content marker entered the scroll viewport.
    EndMarker,
    /// A scroll or settle event landed within the bottom tolerance band.
    ScrollPosition,
    /// The content never exceeded the viewport; nothing to scroll.
    ShortContent,
    /// The unconditional safety timeout elapsed.
    SafetyTimeout,
}

impl CompletionMethod {
    /// Collapse the fine-grained strategy into the persisted method tag.
    pub fn acceptance(self) -> AcceptanceMethod {
        match self {
            CompletionMethod::EndMarker
            | CompletionMethod::ScrollPosition
            | CompletionMethod::ShortContent => AcceptanceMethod::Primary,
            CompletionMethod::SafetyTimeout => AcceptanceMethod::Fallback,
        }
    }
}

impl std::fmt::Display for CompletionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionMethod::EndMarker => write!(f, "end-marker"),
            CompletionMethod::ScrollPosition => write!(f, "scroll-position"),
            CompletionMethod::ShortContent => write!(f, "short-content"),
            CompletionMethod::SafetyTimeout => write!(f, "safety-timeout"),
        }
    }
}

/// A completed consent event.
///
/// Created exactly once at commit time and never mutated afterwards. A new
/// record for a changed document version supersedes (but does not delete)
/// the previous one; the store keeps replaced records in a bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceRecord {
    /// Document version that was accepted. A stored record whose version
    /// does not match the currently displayed version is stale and ignored.
    pub version: String,

    /// Wall-clock time of the commit, ISO-8601 on the wire.
    pub accepted_at: DateTime<Utc>,

    /// Diagnostic environment descriptor, length-bounded, non-authoritative.
    pub client_context: String,

    /// Which detection path satisfied completion.
    pub method: AcceptanceMethod,
}

impl AcceptanceRecord {
    /// Build a record at commit time, truncating the client context to
    /// `context_limit` chars (at a char boundary).
    pub fn new(
        version: impl Into<String>,
        client_context: impl Into<String>,
        method: AcceptanceMethod,
        context_limit: usize,
    ) -> Self {
        let mut client_context: String = client_context.into();
        if client_context.chars().count() > context_limit {
            client_context = client_context.chars().take(context_limit).collect();
        }

        Self {
            version: version.into(),
            accepted_at: Utc::now(),
            client_context,
            method,
        }
    }

    /// Whether this record satisfies a gate displaying `version`.
    pub fn matches_version(&self, version: &str) -> bool {
        self.version == version
    }
}
