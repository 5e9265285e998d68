//! Acknowledgment tracking: one boolean behind three input paths.
//!
//! Hosts report the acknowledgment gesture from up to three places (the
//! control, its enlarged hit-target container, and touch completion), and a
//! single physical tap routinely arrives through two of them. Every report
//! carries an [`InteractionId`]; reports sharing an id collapse to one
//! toggle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::debug;

use scrollwrap_types::{AckSource, InteractionId};

/// Interaction ids remembered for duplicate suppression.
const RECENT_INTERACTIONS: usize = 16;

/// The explicit-acknowledgment state of one gate.
///
/// Two-way toggleable until the commit begins, then frozen: once the record
/// is being written, the box can no longer change under it.
pub struct AcknowledgmentTracker {
    given: AtomicBool,
    frozen: AtomicBool,
    recent: Mutex<VecDeque<InteractionId>>,
}

impl AcknowledgmentTracker {
    pub fn new() -> Self {
        Self {
            given: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
            recent: Mutex::new(VecDeque::with_capacity(RECENT_INTERACTIONS)),
        }
    }

    /// Whether the acknowledgment control is currently checked.
    pub fn is_given(&self) -> bool {
        self.given.load(Ordering::SeqCst)
    }

    /// Apply one gesture report. Returns the new state, or `None` when the
    /// report changed nothing (duplicate of a seen gesture, or frozen).
    pub fn toggle(&self, source: AckSource, interaction: InteractionId) -> Option<bool> {
        if self.frozen.load(Ordering::SeqCst) {
            debug!(%source, %interaction, "acknowledgment frozen; toggle ignored");
            return None;
        }

        {
            let Ok(mut recent) = self.recent.lock() else {
                return None;
            };
            if recent.contains(&interaction) {
                debug!(
                    %source,
                    %interaction,
                    "second report of one physical gesture; not toggling again"
                );
                return None;
            }
            recent.push_back(interaction);
            if recent.len() > RECENT_INTERACTIONS {
                recent.pop_front();
            }
        }

        let now = !self.given.fetch_xor(true, Ordering::SeqCst);
        debug!(%source, %interaction, given = now, "acknowledgment toggled");
        Some(now)
    }

    /// Stop accepting toggles; called when the commit begins.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }
}

impl Default for AcknowledgmentTracker {
    fn default() -> Self {
        Self::new()
    }
}
