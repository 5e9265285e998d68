//! Gate lifecycle phases and point-in-time snapshots.

use serde::{Deserialize, Serialize};

use crate::record::CompletionMethod;
use crate::surface::DocumentRef;

/// Where the gate is in its lifecycle.
///
/// Phase order is `Initializing -> AwaitingConsent -> Ready -> Committing ->
/// Released`, with one shortcut: a matching stored acceptance moves
/// `Initializing` straight to `Released`. `AwaitingConsent` is a joint
/// region over two independently tracked booleans (completion and
/// acknowledgment); they are parallel conditions, not sequential states.
/// `Released` is terminal — a released gate never re-enters any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePhase {
    /// Consulting the acceptance store; no UI rendered yet.
    Initializing,

    /// Gating surface is live; completion and acknowledgment are both open.
    AwaitingConsent,

    /// Both conditions met; the primary action is enabled.
    Ready,

    /// Commit in flight; further invocations and toggles are rejected.
    Committing,

    /// Protected content revealed and the gating surface torn down.
    Released,
}

impl GatePhase {
    /// Whether the gate still accepts detector and tracker input.
    pub fn accepts_input(self) -> bool {
        matches!(self, GatePhase::AwaitingConsent | GatePhase::Ready)
    }

    /// Whether the commit transition has begun (or finished).
    pub fn commit_started(self) -> bool {
        matches!(self, GatePhase::Committing | GatePhase::Released)
    }

    /// Whether this phase is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, GatePhase::Released)
    }
}

impl std::fmt::Display for GatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatePhase::Initializing => write!(f, "initializing"),
            GatePhase::AwaitingConsent => write!(f, "awaiting-consent"),
            GatePhase::Ready => write!(f, "ready"),
            GatePhase::Committing => write!(f, "committing"),
            GatePhase::Released => write!(f, "released"),
        }
    }
}

/// The pure enablement guard for the primary action.
///
/// This is the single place the rule lives: the action is enabled exactly
/// when both conditions hold and the commit has not begun. The controller
/// evaluates it on every input; the shell evaluates it on every projection.
pub fn action_enabled(completion_satisfied: bool, acknowledgment_given: bool, phase: GatePhase) -> bool {
    completion_satisfied && acknowledgment_given && !phase.commit_started()
}

/// Point-in-time view of a gate, for hosts and the presentation shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSnapshot {
    /// The gated document's identity.
    pub document: DocumentRef,

    /// Current lifecycle phase.
    pub phase: GatePhase,

    /// Whether any detection strategy has reported full exposure.
    pub completion_satisfied: bool,

    /// Whether the acknowledgment control is currently checked.
    pub acknowledgment_given: bool,

    /// Continuous scroll ratio (0.0-1.0), distinct from the boolean above.
    /// Monotone non-decreasing over the life of the gate.
    pub progress: f64,

    /// Which strategy fired first, once completion is satisfied.
    pub completion_method: Option<CompletionMethod>,
}

impl GateSnapshot {
    /// The pure enablement guard applied to this snapshot.
    pub fn action_enabled(&self) -> bool {
        action_enabled(
            self.completion_satisfied,
            self.acknowledgment_given,
            self.phase,
        )
    }
}
