//! Scrollwrap session-scoped acceptance persistence.
//!
//! This crate holds the storage seam between the gate engine and whatever
//! session-scoped key/value facility the host provides:
//! - a [`SessionKv`] trait the host implements over its session store
//!   (browser sessionStorage, a test map, an app-session cache)
//! - an [`AcceptanceStore`] writing the acceptance record as a JSON envelope
//!   at a key derived deterministically from the document id
//!
//! Design stance:
//! - Storage here is best-effort by contract. Every error in this crate is
//!   recoverable: the engine maps read failures to "no prior acceptance" and
//!   write failures to "will re-prompt next session". Nothing in this crate
//!   may block the reveal of gated content.
//! - Records are superseded, never deleted: a version change appends the
//!   replaced record to a bounded history entry.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod mocks;
mod session;
mod store;

pub use error::{StoreError, StoreResult};
pub use session::{InMemorySessionKv, SessionKv};
pub use store::AcceptanceStore;
