//! # Scrollwrap Engine - The Scroll-Gated Consent State Machine
//!
//! This crate is the headless core of scrollwrap: it decides when a user has
//! provably been exposed to the full terms body, tracks their explicit
//! acknowledgment, and executes the one-time commit that records acceptance
//! and reveals the protected content.
//!
//! ## Overview
//!
//! Four detection strategies race toward one idempotent completion flag:
//!
//! - **End marker**: the end-of-content marker entered the viewport
//! - **Scroll position**: a scroll settled within the bottom tolerance band
//! - **Short content**: the content never required scrolling at all
//! - **Safety timeout**: the unconditional liveness bound elapsed
//!
//! The first to fire wins; later signals are no-ops. Because the safety
//! timeout depends on nothing but the clock, no combination of unsupported
//! APIs, broken layout, or odd content shapes can leave the gate permanently
//! stuck.
//!
//! ## Key Components
//!
//! - [`GateEngine`]: host-facing assembly - mount, events, commit, teardown
//! - [`GateController`]: the phase state machine and commit guard
//! - [`CompletionDetector`]: the four racing strategies
//! - [`AcknowledgmentTracker`]: the checkbox behind three input paths
//! - [`GateTuning`]: timer and tolerance parameters, with surface presets
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scrollwrap_engine::{GateEngine, GateInputs, GateTuning};
//! use scrollwrap_store::{AcceptanceStore, InMemorySessionKv};
//! use scrollwrap_types::{
//!     DocumentRef, RegionHandle, SurfaceCapabilities, SurfaceEvent, ScrollMetrics, TermsHandle,
//! };
//!
//! # async fn example() {
//! let store = Arc::new(AcceptanceStore::new(Arc::new(InMemorySessionKv::new())));
//!
//! let engine = GateEngine::mount(GateInputs {
//!     document: DocumentRef::new("report-42", "3.1"),
//!     terms: TermsHandle::new("terms-of-service"),
//!     protected_region: RegionHandle::new("report-body"),
//!     branding: None,
//!     capabilities: SurfaceCapabilities::default(),
//!     tuning: GateTuning::default(),
//!     store,
//!     probe: None,
//!     client_context: "portal/desktop".to_string(),
//! })
//! .await
//! .unwrap();
//!
//! engine.handle_event(SurfaceEvent::Layout {
//!     metrics: ScrollMetrics::new(0.0, 600.0, 2400.0),
//! });
//! println!("enabled: {}", engine.snapshot().action_enabled());
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod acknowledge;
pub mod controller;
pub mod detect;
mod engine;
mod error;
pub mod tuning;

pub use acknowledge::AcknowledgmentTracker;
pub use controller::GateController;
pub use detect::{CompletionDetector, ScrollProbe};
pub use engine::{GateEngine, GateInputs};
pub use error::{GateError, GateResult};
pub use tuning::{GateTuning, SurfaceProfile};
