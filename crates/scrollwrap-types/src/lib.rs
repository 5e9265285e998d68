//! Scrollwrap Types - Core types for the scroll-gated consent engine
//!
//! Scrollwrap blocks a protected document behind legal terms until the user
//! has been shown the full terms body, demonstrably scrolled through it, and
//! affirmatively acknowledged it. This crate holds the data model shared by
//! the engine, store, and shell crates.
//!
//! ## Architectural Boundaries
//!
//! - **scrollwrap-engine** owns: detection strategies, the acknowledgment
//!   tracker, and the gate state machine
//! - **scrollwrap-store** owns: session-scoped persistence of acceptance
//!   records
//! - **scrollwrap-shell** owns: projection of gate state into presentable
//!   helper text, progress, and overlay treatment
//!
//! ## Key Concepts
//!
//! - **AcceptanceRecord**: The one immutable artifact of a completed consent
//! - **GatePhase**: Where the gate is in its lifecycle (terminal: Released)
//! - **GateSnapshot**: Point-in-time view of the gate for hosts and the shell
//! - **SurfaceEvent**: Host UI activity normalized into engine inputs

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod branding;
pub mod events;
pub mod phase;
pub mod record;
pub mod surface;

pub use branding::BrandingConfig;
pub use events::GateEvent;
pub use phase::{action_enabled, GatePhase, GateSnapshot};
pub use record::{AcceptanceMethod, AcceptanceRecord, CompletionMethod, DEFAULT_CONTEXT_LIMIT};
pub use surface::{
    AckSource, DocumentRef, InteractionId, RegionHandle, ScrollMetrics, SurfaceCapabilities,
    SurfaceEvent, TermsHandle,
};
