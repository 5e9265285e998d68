//! Events emitted by a gate over its broadcast stream.

use crate::phase::GatePhase;
use crate::record::CompletionMethod;

/// Observable gate activity, broadcast to host subscribers.
///
/// The stream is diagnostic and presentational; the engine never depends on
/// anyone receiving it. Lagging or absent subscribers are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// The lifecycle phase changed.
    PhaseChanged { from: GatePhase, to: GatePhase },

    /// A detection strategy reported full exposure. Fires at most once.
    CompletionSatisfied { method: CompletionMethod },

    /// The acknowledgment control changed state.
    AcknowledgmentChanged { given: bool },

    /// The acceptance record reached session storage.
    RecordPersisted,

    /// Persistence failed; the reveal proceeded anyway and the user will be
    /// re-prompted next session.
    PersistenceSkipped { reason: String },

    /// The protected content was revealed.
    Revealed,

    /// The gating surface was removed from further interaction.
    TornDown,
}
